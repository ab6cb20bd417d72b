use anyhow::{Context, Result};
use tokio::net::TcpListener;

use execapi::config::{self, Config};
use execapi::init::{init_tracing, LogFormat};
use execapi::server;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load();

    let me = std::env::args()
        .next()
        .and_then(|arg0| {
            std::path::Path::new(&arg0)
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "execapi".to_string());
    let version = config::version_string(&me);

    if config.version {
        println!("{}", version);
        return Ok(());
    }

    init_tracing("execapi", LogFormat::from_env())?;
    tracing::info!("{}", version);

    config.validate()?;
    tracing::info!(
        addr = %config.addr,
        route = %config.route,
        health = %config.health,
        "configuration loaded"
    );

    let bind_addr = config.bind_addr();
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to listen on {}", bind_addr))?;

    server::serve(listener, &config, server::shutdown_signal()).await
}
