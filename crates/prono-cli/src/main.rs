//! prono - Sales prediction operations CLI
//!
//! Usage:
//!   prono predict                          # Predict with the stock form values
//!   prono predict --item-mrp 249.81        # Override individual fields
//!   prono predict --interactive            # Prompt for each field
//!   prono inspect bmsp.prn                 # Inspect artifact metadata
//!   prono validate bmsp.prn                # Validate artifact integrity

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;
mod error;
mod output;

use commands::{inspect, predict, validate};

/// prono - Sales Prediction Tool
///
/// Encode product/outlet records, score them against a .prn model
/// artifact, and inspect the artifact itself.
#[derive(Parser)]
#[command(name = "prono")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Quiet mode (result value only)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict sales for one product/outlet record
    Predict {
        /// Path to the .prn model artifact
        #[arg(long, value_name = "FILE", default_value = "bmsp.prn")]
        model: PathBuf,

        /// Prompt for each field, with the flag values as defaults
        #[arg(short, long)]
        interactive: bool,

        #[command(flatten)]
        record: predict::RecordArgs,
    },

    /// Inspect artifact metadata and tensors
    Inspect {
        /// Path to the .prn model artifact
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Validate artifact integrity and schema
    Validate {
        /// Path to the .prn model artifact
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Predict {
            model,
            interactive,
            record,
        } => predict::run(&model, interactive, &record, cli.quiet),

        Commands::Inspect { file } => inspect::run(&file),

        Commands::Validate { file } => validate::run(&file),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            e.exit_code()
        }
    }
}
