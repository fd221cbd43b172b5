//! educhunk command-line entry point

use clap::Parser;
use educhunk_cli::commands::Commands;
use std::process::ExitCode;

/// Chunk NCERT textbook chapters into scored learning units
#[derive(Debug, Parser)]
#[command(name = "educhunk", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.command.execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
