//! The per-target build pipeline.
//!
//! A pure function from (source module graph, target profile) to one
//! build artifact. All target divergence lives in the profile; the shared
//! source is never branched on. Everything is produced in memory first and
//! only then written, so a failure at any stage leaves the previous
//! artifact's directory untouched until a complete replacement exists.

use std::path::{Path, PathBuf};

use duplex_graph::GraphWalker;
use duplex_profile::{PackagingMode, SourceMapMode, TargetKind, TargetProfile};
use tracing::{debug, info};

use crate::compile::compile_module;
use crate::link::link_bundle;
use crate::minify::minify_bundle;
use crate::rewrite::rewrite_module;
use crate::{Result, validate, writer};

/// Metadata for one written artifact.
#[derive(Debug, Clone)]
pub struct BuildArtifact {
    pub kind: TargetKind,
    /// Absolute path of the bundle file.
    pub path: PathBuf,
    /// Absolute path of the external source map, when one was written.
    pub map_path: Option<PathBuf>,
    /// Size of the bundle file in bytes.
    pub bytes: u64,
    /// Number of modules bundled.
    pub module_count: usize,
}

/// Run the full pipeline for one target profile.
///
/// `root` is the project root: entry point, fallback substitute paths and
/// relative output directories all resolve against it.
///
/// # Errors
///
/// Any stage failure aborts this profile's build immediately; see
/// [`crate::Error`] for the taxonomy. Nothing is written on failure.
pub fn build_profile(profile: &TargetProfile, root: impl AsRef<Path>) -> Result<BuildArtifact> {
    let root = root.as_ref();
    info!(
        profile = %profile.kind,
        entry = %profile.entry.display(),
        packaging = profile.packaging.label(),
        "starting build"
    );

    writer::validate_output_filename(&profile.filename)?;

    // Resolve: walk the import graph through this profile's table.
    let graph = GraphWalker::new(profile, root).walk()?;
    debug!(profile = %profile.kind, modules = graph.len(), "graph resolved");

    // Compile: shared TS -> JS, then splice ESM into registry form.
    let mut bodies = Vec::with_capacity(graph.len());
    for module in graph.modules() {
        let compiled = compile_module(module, profile)?;
        bodies.push(rewrite_module(&compiled, module)?);
    }

    // Package.
    let bundle = link_bundle(&graph, &bodies, &profile.packaging)?;
    debug!(profile = %profile.kind, bytes = bundle.len(), "bundle linked");

    // The global-binding contract only applies to the flat script: the
    // UMD wrapper constructs its single global itself.
    if matches!(profile.packaging, PackagingMode::BareGlobal) {
        validate::check_global_bindings(&bundle, &profile.minify.reserved)?;
    }

    // Minify under the profile's policy, then re-check the reserved set
    // against the bytes that will actually ship.
    let outcome = minify_bundle(&bundle, &profile.filename, &profile.minify)?;
    validate::verify_reserved(&outcome.code, &profile.minify.reserved)?;

    // Attach the source map and lay out the output files.
    let out_dir = if profile.out_dir.is_absolute() {
        profile.out_dir.clone()
    } else {
        root.join(&profile.out_dir)
    };
    let artifact_path = out_dir.join(&profile.filename);

    let mut code = outcome.code;
    if !code.ends_with('\n') {
        code.push('\n');
    }

    let mut files: Vec<(PathBuf, Vec<u8>)> = Vec::new();
    let mut map_path = None;
    match (profile.source_map, outcome.map) {
        (SourceMapMode::External, Some(map)) => {
            let map_file = out_dir.join(format!("{}.map", profile.filename));
            code.push_str(&format!("//# sourceMappingURL={}.map\n", profile.filename));
            files.push((map_file.clone(), map.to_json_string().into_bytes()));
            map_path = Some(map_file);
        }
        (SourceMapMode::Inline, Some(map)) => {
            code.push_str(&format!("//# sourceMappingURL={}\n", map.to_data_url()));
        }
        (_, None) => {}
    }
    let bytes = code.len() as u64;
    files.insert(0, (artifact_path.clone(), code.into_bytes()));

    // Clean, then write: the previous artifact disappears only once a
    // complete replacement exists in memory.
    writer::clean_output_dir(&out_dir)?;
    writer::write_files_atomic(&files)?;

    info!(
        profile = %profile.kind,
        path = %artifact_path.display(),
        bytes,
        modules = graph.len(),
        "build complete"
    );

    Ok(BuildArtifact {
        kind: profile.kind,
        path: artifact_path,
        map_path,
        bytes,
        module_count: graph.len(),
    })
}
