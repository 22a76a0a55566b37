//! Library surface of the duplex CLI.
//!
//! Kept as a library so integration tests can exercise argument parsing
//! and command plumbing without spawning the binary.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logger;
pub mod ui;
