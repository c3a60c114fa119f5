mod config;
mod error;
mod executor;
mod response;
mod server;

use clap::Parser;
use config::Config;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("vernemq_observer=info")),
        )
        .with_writer(std::io::stdout)
        .with_ansi(false)
        .init();

    tracing::debug!(?config, "configuration loaded");

    server::serve(&config).await
}
