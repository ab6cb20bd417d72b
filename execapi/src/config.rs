//! Startup configuration
//!
//! Built once from flags and environment variables, validated, then handed to
//! the router. Nothing reads the environment after startup.

use clap::Parser;

use crate::types::ConfigError;

pub const DEFAULT_ADDR: &str = ":8080";
pub const DEFAULT_ROUTE: &str = "/exec";
pub const DEFAULT_HEALTH: &str = "/health";

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "execapi")]
#[command(about = "Run a posted command line and return its combined output")]
#[command(disable_version_flag = true)]
pub struct Config {
    /// Listen address, `:port` listens on all interfaces
    #[arg(long, env = "ADDR", default_value = DEFAULT_ADDR)]
    pub addr: String,

    /// Path of the execution endpoint
    #[arg(long, env = "ROUTE", default_value = DEFAULT_ROUTE)]
    pub route: String,

    /// Path of the health endpoint
    #[arg(long, env = "HEALTH", default_value = DEFAULT_HEALTH)]
    pub health: String,

    /// Print version information and exit
    #[arg(long)]
    pub version: bool,
}

impl Config {
    /// Parse from the process arguments
    ///
    /// The single-dash `-version` spelling is accepted alongside `--version`.
    /// Variables that are set but empty (`ADDR=`) fall back to the defaults.
    pub fn load() -> Self {
        Self::parse_from(std::env::args().map(|arg| {
            if arg == "-version" {
                "--version".to_string()
            } else {
                arg
            }
        }))
        .with_empty_as_default()
    }

    /// Replace empty values with their defaults
    pub fn with_empty_as_default(mut self) -> Self {
        for (value, default) in [
            (&mut self.addr, DEFAULT_ADDR),
            (&mut self.route, DEFAULT_ROUTE),
            (&mut self.health, DEFAULT_HEALTH),
        ] {
            if value.is_empty() {
                *value = default.to_string();
            }
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [("route", &self.route), ("health", &self.health)] {
            if !value.starts_with('/') {
                return Err(ConfigError::RelativePath {
                    name,
                    value: value.clone(),
                });
            }
            if value == "/" {
                return Err(ConfigError::RootPath { name });
            }
            // The router reads `:name` and `*name` as captures
            if value.contains([':', '*']) {
                return Err(ConfigError::CapturePath {
                    name,
                    value: value.clone(),
                });
            }
        }

        if self.route == self.health {
            return Err(ConfigError::PathCollision(self.route.clone()));
        }

        Ok(())
    }

    /// Address in a form the listener can bind
    pub fn bind_addr(&self) -> String {
        if self.addr.starts_with(':') {
            format!("0.0.0.0{}", self.addr)
        } else {
            self.addr.clone()
        }
    }
}

/// One-line build description, printed by `-version` and logged at startup
pub fn version_string(program: &str) -> String {
    let parallelism = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);

    format!(
        "{} version={} os={} arch={} parallelism={}",
        program,
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH,
        parallelism
    )
}
