//! Error handling for the duplex CLI.
//!
//! Domain errors convert into [`CliError`] automatically via `#[from]`;
//! the main entry point renders the result through miette.

use thiserror::Error;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration loading or validation errors
    #[error("Configuration error: {0}")]
    Config(#[from] duplex_config::ConfigError),

    /// Errors from a single target pipeline
    #[error("Build error: {0}")]
    Bundler(#[from] duplex_bundler::Error),

    /// Graph walking errors surfaced by `check`
    #[error("Resolution error: {0}")]
    Graph(#[from] duplex_graph::WalkerError),

    /// Invalid command-line arguments or options
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// One or more target builds failed; details were already reported
    /// per target.
    #[error("{failed} of {total} target build(s) failed")]
    TargetsFailed { failed: usize, total: usize },

    /// I/O errors from file system operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// Flatten a [`CliError`] and its source chain into a miette report.
pub fn cli_error_to_miette(err: CliError) -> miette::Report {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(&err);
    while let Some(cause) = source {
        message.push_str(&format!("\n  caused by: {cause}"));
        source = cause.source();
    }
    miette::Report::msg(message)
}
