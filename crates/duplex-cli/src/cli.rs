//! Command-line interface definition.
//!
//! Defines the CLI structure using clap v4's derive macros.
//!
//! # Command Structure
//!
//! - `duplex build` - Build one or both deployment artifacts
//! - `duplex check` - Validate configuration and type-check both targets
//!   without emitting anything

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use duplex_profile::TargetKind;

/// duplex - one shared TypeScript source, two deployment artifacts
#[derive(Parser, Debug)]
#[command(
    name = "duplex",
    version,
    about = "Builds one shared source into a browser UMD bundle and a host-script file",
    long_about = "Duplex compiles a single TypeScript entry point through two divergent\n\
                  pipelines: a minified UMD library bundle for the browser, and a flat\n\
                  bare-global script for a sandboxed scripting host that calls entry\n\
                  points by fixed name."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build deployment artifacts
    Build(BuildArgs),
    /// Validate configuration and type-check both targets
    Check(CheckArgs),
}

#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Path to the configuration file (defaults to ./duplex.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Project root all relative paths resolve against
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Build a single target instead of both
    #[arg(short, long, value_parser = parse_target)]
    pub target: Option<TargetKind>,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Path to the configuration file (defaults to ./duplex.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Project root all relative paths resolve against
    #[arg(long)]
    pub root: Option<PathBuf>,
}

fn parse_target(value: &str) -> Result<TargetKind, String> {
    value.parse()
}
