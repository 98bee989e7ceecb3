//! `chq` entry point.

use clap::Parser;

use chq_cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    chq_cli::run(cli).await?;
    Ok(())
}
