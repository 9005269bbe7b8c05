//! gradebook CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(
    name = "gradebook",
    version,
    about = "Semester grade tracker with weighted averages and PDF reports"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive session
    Session {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Directory for exported reports (overrides the config)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Create a starter gradebook.toml
    Init,
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("gradebook=info,gradebook_core=info,gradebook_report=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Session { config, output } => commands::session::execute(config, output),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
