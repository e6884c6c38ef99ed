//! CDUWind CLI - Command-line interface
//!
//! This binary provides a command-line interface to the CDUWind library.

mod commands;
mod error;
mod runner;

use clap::{Parser, Subcommand};

use commands::common::WindArgs;
use commands::config::ConfigCommands;
use commands::enter::EnterArgs;
use commands::run::RunArgs;

#[derive(Parser)]
#[command(name = "cduwind")]
#[command(version, about = "Enter briefing winds into the aircraft CDU", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Listen for weather briefings and enter winds on request
    Run {
        /// Map identifier or theatre name (overrides wind.map)
        #[arg(long)]
        map: Option<String>,

        /// Enable debug logging
        #[arg(long)]
        debug: bool,
    },

    /// Print the CDU wind table for a briefing
    Compute(WindArgs),

    /// Compute a briefing and enter it on the CDU once
    Enter {
        #[command(flatten)]
        wind: WindArgs,

        /// Print the command sequence instead of sending it
        #[arg(long)]
        dry_run: bool,

        /// Enable debug logging
        #[arg(long)]
        debug: bool,
    },

    /// View and modify configuration settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run { map, debug } => commands::run::run(RunArgs { map, debug }),
        Commands::Compute(args) => commands::compute::run(args),
        Commands::Enter {
            wind,
            dry_run,
            debug,
        } => commands::enter::run(EnterArgs {
            wind,
            dry_run,
            debug,
        }),
        Commands::Config { command } => commands::config::run(command),
    };

    if let Err(e) = result {
        e.exit();
    }
}
