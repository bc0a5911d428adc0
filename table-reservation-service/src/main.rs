use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod demo;

#[derive(Parser)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run pending database migrations
    Migrate,
    /// Seed reference data and walk through the booking scenarios
    Demo,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match &cli.command {
        Commands::Migrate => demo::migrate(),
        Commands::Demo => demo::run(),
    }
}
