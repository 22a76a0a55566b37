//! # duplex-graph
//!
//! Module resolution and import graph walking for the duplex build
//! pipeline.
//!
//! Given a shared entry point and a [`TargetProfile`], this crate walks the
//! static import graph breadth-first, resolving every specifier through the
//! profile's platform module fallback table, and produces a [`ModuleGraph`]
//! in deterministic discovery order. An unresolved or disabled reference
//! fails the walk naming the exact specifier and the importing file; the
//! other target's walk is unaffected, since each profile carries its own
//! table.
//!
//! [`TargetProfile`]: duplex_profile::TargetProfile

pub mod module;
pub mod parse;
pub mod resolve;
pub mod walker;

pub use module::{Module, ModuleGraph, ModuleId};
pub use parse::{ImportRecord, ModuleSummary};
pub use resolve::{ResolveError, resolve_specifier};
pub use walker::{GraphWalker, WalkerError};
