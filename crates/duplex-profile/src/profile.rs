//! Target profile definition.
//!
//! The two deployment targets share one entry point and one compiler stage;
//! everything that diverges between them lives here.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::policy::{CommentPolicy, MinifyPolicy, ReservedSymbols};
use crate::resolution::FallbackMap;

/// Which of the two deployment targets a profile describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetKind {
    /// Browser-loadable UMD library bundle.
    Browser,
    /// Single-file script for the sandboxed, Node-incompatible host.
    HostScript,
}

impl TargetKind {
    /// Stable identifier used in logs, CLI flags and output summaries.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Browser => "browser",
            Self::HostScript => "host-script",
        }
    }
}

impl std::fmt::Display for TargetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for TargetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "browser" => Ok(Self::Browser),
            "host" | "host-script" | "hostscript" => Ok(Self::HostScript),
            other => Err(format!(
                "Invalid target: '{other}'. Expected: browser, host-script"
            )),
        }
    }
}

/// How the compiled module graph is wrapped for deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PackagingMode {
    /// UMD library wrapper: consumable via AMD, CommonJS, or a single
    /// global binding under `global_name`. Nothing else leaks to the
    /// enclosing scope.
    UmdLibrary { global_name: String },
    /// Flat script of top-level statements with no module wrapper. The
    /// host loads the file as ambient global code and the entry module
    /// executes at load time, so its own `globalThis` assignments run.
    BareGlobal,
}

impl PackagingMode {
    pub fn label(&self) -> &'static str {
        match self {
            Self::UmdLibrary { .. } => "umd-library",
            Self::BareGlobal => "bare-global",
        }
    }
}

/// Where the source map for an artifact goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceMapMode {
    /// Sibling `<filename>.map` file, referenced by a trailing comment.
    External,
    /// Embedded `data:` URL comment. The host has no file system to serve
    /// a sibling map from, so the map travels inside the artifact.
    Inline,
}

/// Execution environment tag, selecting the ambient globals the compiler
/// stage accepts. Mirrors the original ambient type declaration split:
/// the browser build type-checks against DOM, the host build against
/// nothing beyond the language itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EnvironmentTag {
    /// DOM globals available (window, document, fetch, ...).
    Dom,
    /// No ambient environment. Only language builtins, plus whatever the
    /// profile lists in `ambient_globals` (host-provided services).
    None,
}

/// Immutable build configuration for one deployment target.
///
/// Constructed once per build invocation, read everywhere else. The two
/// profiles of a build share no mutable state and their pipelines may run
/// concurrently; each owns a distinct output directory and its own
/// resolution table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetProfile {
    pub kind: TargetKind,
    /// Shared entry point, identical across profiles.
    pub entry: PathBuf,
    /// Output directory, owned exclusively by this profile.
    pub out_dir: PathBuf,
    /// Output filename within `out_dir`.
    pub filename: String,
    pub packaging: PackagingMode,
    /// Platform module resolution table specific to this profile.
    pub fallbacks: FallbackMap,
    pub minify: MinifyPolicy,
    pub source_map: SourceMapMode,
    pub environment: EnvironmentTag,
    /// Host-provided service globals the ambient check accepts on top of
    /// the environment tag (empty for browser).
    pub ambient_globals: Vec<String>,
}

impl TargetProfile {
    /// Browser profile: UMD packaging, DOM environment, external source
    /// map, comments stripped. The library's global name is the one
    /// reserved symbol; the wrapper binds it as a property so it survives
    /// mangling by construction, and the validate stage re-checks it.
    pub fn browser(
        entry: impl Into<PathBuf>,
        out_dir: impl Into<PathBuf>,
        filename: impl Into<String>,
        global_name: impl Into<String>,
    ) -> Self {
        let global_name = global_name.into();
        Self {
            kind: TargetKind::Browser,
            entry: entry.into(),
            out_dir: out_dir.into(),
            filename: filename.into(),
            packaging: PackagingMode::UmdLibrary {
                global_name: global_name.clone(),
            },
            fallbacks: FallbackMap::empty(),
            minify: MinifyPolicy {
                reserved: ReservedSymbols::new([global_name]),
                comments: CommentPolicy::Strip,
                mangle_top_level: true,
            },
            source_map: SourceMapMode::External,
            environment: EnvironmentTag::Dom,
            ambient_globals: Vec::new(),
        }
    }

    /// HostScript profile: bare-global packaging, no ambient environment,
    /// inline source map, annotated comments kept, top level unmangled.
    /// `reserved` lists the entry-point functions the host invokes by
    /// fixed literal name.
    pub fn host_script(
        entry: impl Into<PathBuf>,
        out_dir: impl Into<PathBuf>,
        filename: impl Into<String>,
        reserved: ReservedSymbols,
    ) -> Self {
        Self {
            kind: TargetKind::HostScript,
            entry: entry.into(),
            out_dir: out_dir.into(),
            filename: filename.into(),
            packaging: PackagingMode::BareGlobal,
            fallbacks: FallbackMap::empty(),
            minify: MinifyPolicy {
                reserved,
                comments: CommentPolicy::KeepAnnotated,
                mangle_top_level: false,
            },
            source_map: SourceMapMode::Inline,
            environment: EnvironmentTag::None,
            ambient_globals: Vec::new(),
        }
    }

    /// Replace the fallback table.
    pub fn with_fallbacks(mut self, fallbacks: FallbackMap) -> Self {
        self.fallbacks = fallbacks;
        self
    }

    /// Replace the source map mode.
    pub fn with_source_map(mut self, mode: SourceMapMode) -> Self {
        self.source_map = mode;
        self
    }

    /// Extend the ambient globals accepted by the compiler stage.
    pub fn with_ambient_globals<I, S>(mut self, globals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ambient_globals.extend(globals.into_iter().map(Into::into));
        self
    }

    /// Full path of the primary artifact.
    pub fn artifact_path(&self) -> PathBuf {
        self.out_dir.join(&self.filename)
    }

    /// Full path of the external source map, if this profile emits one.
    pub fn map_path(&self) -> Option<PathBuf> {
        match self.source_map {
            SourceMapMode::External => Some(self.out_dir.join(format!("{}.map", self.filename))),
            SourceMapMode::Inline => None,
        }
    }

    /// The UMD global name, for browser profiles.
    pub fn library_name(&self) -> Option<&str> {
        match &self.packaging {
            PackagingMode::UmdLibrary { global_name } => Some(global_name),
            PackagingMode::BareGlobal => None,
        }
    }

    /// Directory that relative specifiers in the entry resolve against.
    pub fn entry_dir(&self) -> &Path {
        self.entry.parent().unwrap_or(Path::new(""))
    }
}
