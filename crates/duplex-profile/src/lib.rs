//! # duplex-profile
//!
//! Target profile value objects for the duplex build pipeline.
//!
//! A [`TargetProfile`] describes everything that differs between the two
//! deployment artifacts built from the shared source tree: where the output
//! goes, how the compiled module graph is packaged, how platform modules
//! resolve, and which exported names must survive minification. Profiles are
//! immutable; each build invocation constructs them once and reads them
//! everywhere else.
//!
//! Nothing in this crate touches the filesystem. The bundler consumes
//! profiles, this crate only defines them.

pub mod policy;
pub mod profile;
pub mod resolution;

pub use policy::{CommentPolicy, MinifyPolicy, ReservedSymbols};
pub use profile::{EnvironmentTag, PackagingMode, SourceMapMode, TargetKind, TargetProfile};
pub use resolution::{FallbackMap, ModuleFallback};
