//! mdtrack CLI
//!
//! Command-line interface for the master-dataset version tracker

use clap::{Parser, Subcommand};
use mdtrack_core::logging::{self, Profile};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "mdtrack")]
#[command(about = "mdtrack - master dataset version tracking", long_about = None)]
struct Cli {
    /// Emit JSON structured logs
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Record a new version of the source if it changed
    Run(commands::run::RunArgs),
    /// Print the version ledger
    History(commands::history::HistoryArgs),
    /// Show a recorded diff by short hash
    Show(commands::show::ShowArgs),
    /// Export fixed-query projections for downstream consumers
    Export(commands::export::ExportArgs),
    /// Asset packing and fetching
    Assets(commands::assets::AssetsArgs),
}

fn main() {
    let cli = Cli::parse();
    logging::init(if cli.log_json {
        Profile::Production
    } else {
        Profile::Development
    });

    let result = match cli.command {
        Commands::Run(args) => commands::run::execute(args),
        Commands::History(args) => commands::history::execute(args),
        Commands::Show(args) => commands::show::execute(args),
        Commands::Export(args) => commands::export::execute(args),
        Commands::Assets(args) => commands::assets::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
