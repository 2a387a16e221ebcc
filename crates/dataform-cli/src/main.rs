use anyhow::Result;
use clap::Parser as _;
use command::Cli;
use tracing_subscriber::EnvFilter;

mod command;
mod config;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let cli = Cli::parse();
    cli.run().await?;

    Ok(())
}
