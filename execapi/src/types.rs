//! Type definitions for execapi

use thiserror::Error;

// ============================================================================
// Request Types
// ============================================================================

/// A validated command line: program followed by its arguments
///
/// Always holds at least one element. Arguments are kept verbatim, no
/// trimming, quoting or shell expansion is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDescriptor(Vec<String>);

impl CommandDescriptor {
    /// Build a descriptor, rejecting an empty argument vector
    pub fn new(argv: Vec<String>) -> Result<Self, DecodeFailure> {
        if argv.is_empty() {
            return Err(DecodeFailure::MissingCommand);
        }
        Ok(Self(argv))
    }

    /// The executable name or path (element 0)
    pub fn program(&self) -> &str {
        &self.0[0]
    }

    /// Everything after the program
    pub fn args(&self) -> &[String] {
        &self.0[1..]
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

// ============================================================================
// Response Types
// ============================================================================

/// Result of running one [`CommandDescriptor`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionOutcome {
    /// Stdout and stderr, interleaved in the order the OS delivered them
    pub combined_output: Vec<u8>,
    /// Exit code, absent when the process was killed by a signal or never ran
    pub exit_code: Option<i32>,
    /// Spawn, wait or abnormal termination description
    pub failure: Option<String>,
}

impl ExecutionOutcome {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Why a request body could not be turned into a [`CommandDescriptor`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeFailure {
    #[error("body read error: {0}")]
    Read(String),

    #[error("body yaml error: {0}")]
    Parse(String),

    #[error("missing command in request")]
    MissingCommand,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} path must start with '/': {value}")]
    RelativePath { name: &'static str, value: String },

    #[error("{name} path must not contain ':' or '*': {value}")]
    CapturePath { name: &'static str, value: String },

    #[error("{name} path must not be the root path")]
    RootPath { name: &'static str },

    #[error("route and health paths collide: {0}")]
    PathCollision(String),
}
