//! # duplex-config
//!
//! Static configuration surface for the duplex build pipeline.
//!
//! Configuration is a single `duplex.toml` file read once per build
//! invocation and converted into two immutable [`TargetProfile`]s. There
//! is no runtime configuration API and no process-wide mutable state;
//! builds do not interleave with configuration changes.
//!
//! ```toml
//! [shared]
//! entry = "src/main.ts"
//!
//! [browser]
//! out_dir = "dist/browser"
//! filename = "app.min.js"
//! library = "MyPackage"
//!
//! [browser.fallback]
//! path = { polyfill = "polyfills/path.ts" }
//! crypto = { polyfill = "polyfills/crypto.ts" }
//! fs = "off"
//!
//! [host]
//! out_dir = "dist/host"
//! filename = "main.gs"
//! reserved = ["doGet", "doPost", "onOpen"]
//! globals = ["SpreadsheetApp"]
//! ```
//!
//! [`TargetProfile`]: duplex_profile::TargetProfile

pub mod config;
pub mod error;
pub mod validation;

pub use config::{BrowserConfig, DuplexConfig, FallbackSpec, HostConfig, SharedConfig};
pub use error::{ConfigError, Result};

/// Default configuration filename looked up in the project root.
pub const CONFIG_FILE_NAME: &str = "duplex.toml";
