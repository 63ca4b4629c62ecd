//!
//! storefront server binary
//! -------------------------
//! Command-line entry point for the storefront HTTP server. Configuration comes from
//! environment variables, overridden by CLI flags. Missing identity-provider
//! credentials stop the process before it binds a port.

use anyhow::Result;
use std::env;

use storefront::config::{has_flag, AppConfig, USAGE};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber with env filter, defaulting to info
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new("info"))?;
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let args: Vec<String> = env::args().collect();

    if has_flag(&args, "--help") || has_flag(&args, "-h") {
        println!("{}", USAGE);
        return Ok(());
    }

    let cfg = match AppConfig::from_env_and_args(&args) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!(target: "startup", "configuration error: {}", e);
            return Err(e.into());
        }
    };
    tracing::info!("Using port: http={}, deployment={:?}", cfg.http_port, cfg.deployment);

    storefront::server::run_with_config(cfg).await
}
