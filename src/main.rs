use anyhow::Result;
use clap::Parser;
use env_logger::Env;

use compound::cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    match Cli::parse().command {
        Command::Serve { port } => compound::api::run_http_server(port).await?,
        command => compound::cli::run(command)?,
    }
    Ok(())
}
