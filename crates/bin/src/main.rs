use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod output;

use cli::{Cli, Commands};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("idmap=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let format = cli.format.into();

    match &cli.command {
        Commands::Info => commands::info::run(&cli.store, format),
        Commands::List => commands::list::run(&cli.store, format),
        Commands::Show(args) => commands::show::run(&cli.store, args, format),
    }
}
