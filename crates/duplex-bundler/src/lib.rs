//! # duplex-bundler
//!
//! The dual-target build pipeline: one shared TypeScript entry point in,
//! two deployment artifacts out.
//!
//! Each [`TargetProfile`] runs the same synchronous pipeline:
//!
//! ```text
//! resolve (graph walk) -> compile (TS -> JS) -> package (UMD | flat)
//!                      -> minify (policy)    -> validate -> write
//! ```
//!
//! The stages share nothing mutable across profiles; the browser and
//! host-script builds can run sequentially or on separate workers with
//! identical results. A failure in any stage aborts that profile's build
//! before anything is written, so a failed build never leaves a stale or
//! half-written artifact.
//!
//! ## Quick start
//!
//! ```no_run
//! use duplex_bundler::build_profile;
//! use duplex_profile::{ReservedSymbols, TargetProfile};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let profile = TargetProfile::host_script(
//!     "src/main.ts",
//!     "dist/host",
//!     "main.gs",
//!     ReservedSymbols::new(["doGet"]),
//! );
//! let artifact = build_profile(&profile, ".")?;
//! println!("wrote {}", artifact.path.display());
//! # Ok(()) }
//! ```
//!
//! [`TargetProfile`]: duplex_profile::TargetProfile

pub mod ambient;
pub mod compile;
pub mod link;
pub mod minify;
pub mod pipeline;
pub mod rewrite;
pub mod validate;
pub mod writer;

pub use pipeline::{BuildArtifact, build_profile};

use duplex_graph::WalkerError;

/// Error types for duplex-bundler operations.
///
/// All failures are local to the single target pipeline that encountered
/// them. The taxonomy mirrors the pipeline stages: resolution, the
/// per-target type/environment check, packaging, and output writing.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Module resolution or graph traversal failed. Carries the exact
    /// specifier and importing file.
    #[error(transparent)]
    Resolution(#[from] WalkerError),

    /// Shared source failed the active target's compile profile: a parse
    /// or transform error, or a reference to a global the target's
    /// environment does not provide.
    #[error("type check failed in '{module}': {message}")]
    TypeCheck { module: String, message: String },

    /// Source uses a module shape the packager cannot express.
    #[error("unsupported syntax in '{module}': {detail}")]
    Unsupported { module: String, detail: String },

    /// A reserved symbol was not found where the packaging contract
    /// requires it: either no static global binding exists in the
    /// compiled graph, or the name did not survive minification.
    #[error("packaging violation for '{symbol}': {detail}")]
    PackagingViolation { symbol: String, detail: String },

    /// The assembled bundle failed to re-parse before minification. This
    /// indicates a linker bug, not a user error.
    #[error("internal: linked bundle failed to parse: {0}")]
    Link(String),

    /// Invalid output path (e.g., directory traversal attempt).
    #[error("invalid output path: {0}")]
    InvalidOutputPath(String),

    /// File write operation failed.
    #[error("write failure: {0}")]
    WriteFailure(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for duplex-bundler operations.
pub type Result<T> = std::result::Result<T, Error>;
