use anyhow::Result;
use clap::{Parser, Subcommand};
use simplelog::LevelFilter;

use crate::logging;

mod extract;
mod logevents;
mod matchfields;
mod text;

/// Extracts labelled fields from a folder of PDF documents into a CSV file.
#[derive(Parser)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Logging level.
    #[arg(long, default_value = "Info")]
    log_level: LevelFilter,
}

#[derive(Subcommand)]
enum Command {
    Extract(extract::Command),
    Match(matchfields::Command),
    Text(text::Command),
}

pub fn run() -> Result<()> {
    let args = Args::parse();

    use Command::*;
    match &args.command {
        // Also logs to a file in the output folder, so sets up its own logging.
        Extract(cmd) => extract::run(cmd, args.log_level),
        Match(cmd) => {
            logging::init(args.log_level, None)?;
            matchfields::run(cmd)
        }
        Text(cmd) => {
            logging::init(args.log_level, None)?;
            text::run(cmd)
        }
    }
}
