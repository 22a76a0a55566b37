//! Logging infrastructure for the duplex CLI.
//!
//! Structured logging via the `tracing` ecosystem. The library crates only
//! emit events; this is the one place a subscriber is installed.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber with the specified options.
///
/// Call once at program start, before any logging occurs.
///
/// # Verbosity Levels
///
/// 1. `--verbose` flag: DEBUG for duplex crates
/// 2. `--quiet` flag: errors only
/// 3. `RUST_LOG` environment variable: custom filter
/// 4. Default: INFO for duplex crates
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let filter = if verbose {
        EnvFilter::new("duplex_bundler=debug,duplex_graph=debug,duplex_config=debug,duplex_cli=debug")
    } else if quiet {
        EnvFilter::new("duplex_bundler=error,duplex_graph=error,duplex_config=error,duplex_cli=error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("duplex_bundler=info,duplex_graph=info,duplex_config=info,duplex_cli=info")
        })
    };

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}
