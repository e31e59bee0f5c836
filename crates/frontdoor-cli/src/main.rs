mod cli;
mod commands;
mod output;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Validate { dir, output } => commands::validate(dir, output),
        Command::Render { kind, fixture, random_integer, location } => {
            commands::render(kind, &fixture, random_integer, location)
        }
        Command::Apply { dir, azure } => commands::apply(dir, azure).await,
        Command::Destroy { dir, azure } => commands::destroy(dir, azure).await,
        Command::Exists { kind, id, azure } => commands::exists(kind, &id, azure).await,
    }
}
