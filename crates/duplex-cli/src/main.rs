//! duplex CLI - one shared source, two deployment artifacts.
//!
//! This is the main entry point for the duplex CLI. It handles
//! command-line argument parsing, logging initialization, and command
//! dispatch.

use clap::Parser;
use duplex_cli::{cli, commands, error, logger};
use miette::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);

    let result = match args.command {
        cli::Command::Build(build_args) => commands::build_execute(build_args).await,
        cli::Command::Check(check_args) => commands::check_execute(check_args).await,
    };

    // Convert CLI errors to miette diagnostics for readable reporting
    result.map_err(error::cli_error_to_miette)
}
