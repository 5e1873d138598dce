//! protodeps CLI entry point
//!
//! Parses the command line, runs the extraction, and prints the generated
//! tables on stdout. On failure the error is shown on stderr with context and
//! a suggestion, and the process exits with status 1.

use anyhow::Result;
use clap::Parser;
use protodeps_cli::cli;
use protodeps_cli::core::user_friendly_error;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute() {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
