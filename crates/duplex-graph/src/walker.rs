//! Graph walker for dependency traversal.
//!
//! Performs BFS traversal of the static import graph, parsing modules and
//! resolving specifiers through the active profile's fallback table. The
//! resulting module order is the discovery order, which is deterministic
//! for unchanged inputs.

use std::fs;
use std::path::{Path, PathBuf};

use duplex_profile::TargetProfile;
use rustc_hash::FxHashSet;
use tracing::debug;

use crate::module::{Module, ModuleGraph, ModuleId};
use crate::parse::extract_imports;
use crate::resolve::{ResolveError, resolve_specifier};

/// Upper bound on a single module file. Anything larger is almost
/// certainly not hand-written shared source.
pub const MAX_FILE_SIZE: u64 = 8 * 1024 * 1024;

/// Upper bound on graph size, a guard against pathological cycles of
/// generated files rather than a real capacity limit.
pub const MAX_MODULES: usize = 4096;

/// Error that can occur during graph walking. Failures are local to the
/// target profile being walked; the other profile's walk is independent.
#[derive(Debug, thiserror::Error)]
pub enum WalkerError {
    #[error("failed to read '{}': {source}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("file too large: '{}' is {size} bytes (max {max})", path.display())]
    FileTooLarge { path: PathBuf, size: u64, max: u64 },

    #[error("failed to parse '{}': {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("dynamic import() in '{}' cannot be bundled for either target", path.display())]
    DynamicImport { path: PathBuf },

    #[error("failed to resolve '{specifier}' from '{}': {source}", from.display())]
    Resolution {
        specifier: String,
        from: PathBuf,
        #[source]
        source: ResolveError,
    },

    #[error("too many modules: {count} (max {max})")]
    TooManyModules { count: usize, max: usize },
}

/// Graph walker bound to one target profile.
pub struct GraphWalker<'a> {
    profile: &'a TargetProfile,
    root: PathBuf,
}

impl<'a> GraphWalker<'a> {
    /// Create a walker. `root` is the project root all module identifiers
    /// and fallback substitute paths are relative to.
    pub fn new(profile: &'a TargetProfile, root: impl Into<PathBuf>) -> Self {
        Self {
            profile,
            root: root.into(),
        }
    }

    /// Walk the import graph from the profile's entry point.
    pub fn walk(&self) -> Result<ModuleGraph, WalkerError> {
        let entry_path = self.absolute(&self.profile.entry);
        let entry_id = ModuleId::from_path(&entry_path, &self.root);

        let mut modules = Vec::new();
        let mut seen: FxHashSet<PathBuf> = FxHashSet::default();
        let mut queue: Vec<PathBuf> = vec![entry_path];
        seen.insert(queue[0].clone());

        let mut cursor = 0;
        while cursor < queue.len() {
            let path = queue[cursor].clone();
            cursor += 1;

            if queue.len() > MAX_MODULES {
                return Err(WalkerError::TooManyModules {
                    count: queue.len(),
                    max: MAX_MODULES,
                });
            }

            let module = self.load_module(&path)?;
            debug!(
                profile = %self.profile.kind,
                module = %module.id,
                imports = module.imports.len(),
                "walked module"
            );

            for (_, resolved_path) in &module.resolved_paths {
                if seen.insert(resolved_path.clone()) {
                    queue.push(resolved_path.clone());
                }
            }

            modules.push(Module {
                id: module.id,
                path: module.path,
                source: module.source,
                imports: module.imports,
                resolved: module.resolved_ids,
            });
        }

        Ok(ModuleGraph::new(entry_id, modules))
    }

    fn load_module(&self, path: &Path) -> Result<LoadedModule, WalkerError> {
        let source = self.read_file(path)?;

        let summary = extract_imports(&source, &path.to_string_lossy()).map_err(|failure| {
            WalkerError::Parse {
                path: path.to_path_buf(),
                message: failure.message,
            }
        })?;

        if summary.dynamic_import.is_some() {
            return Err(WalkerError::DynamicImport {
                path: path.to_path_buf(),
            });
        }

        let mut resolved_paths = Vec::with_capacity(summary.imports.len());
        let mut resolved_ids = Vec::with_capacity(summary.imports.len());
        for record in &summary.imports {
            let resolved = resolve_specifier(
                &record.specifier,
                path,
                &self.root,
                &self.profile.fallbacks,
            )
            .map_err(|source| WalkerError::Resolution {
                specifier: record.specifier.clone(),
                from: path.to_path_buf(),
                source,
            })?;
            resolved_ids.push((
                record.specifier.clone(),
                ModuleId::from_path(&resolved, &self.root),
            ));
            resolved_paths.push((record.specifier.clone(), resolved));
        }

        Ok(LoadedModule {
            id: ModuleId::from_path(path, &self.root),
            path: path.to_path_buf(),
            source,
            imports: summary.imports,
            resolved_paths,
            resolved_ids,
        })
    }

    fn read_file(&self, path: &Path) -> Result<String, WalkerError> {
        if let Ok(metadata) = fs::metadata(path) {
            if metadata.len() > MAX_FILE_SIZE {
                return Err(WalkerError::FileTooLarge {
                    path: path.to_path_buf(),
                    size: metadata.len(),
                    max: MAX_FILE_SIZE,
                });
            }
        }

        fs::read_to_string(path).map_err(|source| WalkerError::ReadFile {
            path: path.to_path_buf(),
            source,
        })
    }

    fn absolute(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

struct LoadedModule {
    id: ModuleId,
    path: PathBuf,
    source: String,
    imports: Vec<crate::parse::ImportRecord>,
    resolved_paths: Vec<(String, PathBuf)>,
    resolved_ids: Vec<(String, ModuleId)>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use duplex_profile::{FallbackMap, ModuleFallback, ReservedSymbols};
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn host_profile() -> TargetProfile {
        TargetProfile::host_script(
            "src/main.ts",
            "dist/host",
            "main.gs",
            ReservedSymbols::default(),
        )
    }

    #[test]
    fn walks_in_discovery_order() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "src/main.ts", "import './a';\nimport './b';\n");
        write(root, "src/a.ts", "import './b';\nexport const a = 1;\n");
        write(root, "src/b.ts", "export const b = 2;\n");

        let profile = host_profile();
        let graph = GraphWalker::new(&profile, root).walk().unwrap();

        let order: Vec<&str> = graph.modules().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(order, vec!["src/main.ts", "src/a.ts", "src/b.ts"]);
        assert_eq!(graph.entry().as_str(), "src/main.ts");
    }

    #[test]
    fn unresolved_platform_module_names_the_identifier() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "src/main.ts", "import { join } from 'path';\n");

        let profile = host_profile();
        let err = GraphWalker::new(&profile, root).walk().unwrap_err();
        match err {
            WalkerError::Resolution {
                specifier, source, ..
            } => {
                assert_eq!(specifier, "path");
                assert!(matches!(source, ResolveError::NotFound { .. }));
            }
            other => panic!("expected Resolution error, got {other:?}"),
        }
    }

    #[test]
    fn same_input_fails_at_the_same_identifier_every_run() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(
            root,
            "src/main.ts",
            "import './ok';\nimport 'crypto';\nimport 'path';\n",
        );
        write(root, "src/ok.ts", "export const ok = true;\n");

        let profile = host_profile();
        for _ in 0..3 {
            let err = GraphWalker::new(&profile, root).walk().unwrap_err();
            match err {
                WalkerError::Resolution { specifier, .. } => assert_eq!(specifier, "crypto"),
                other => panic!("expected Resolution error, got {other:?}"),
            }
        }
    }

    #[test]
    fn polyfilled_module_joins_the_graph() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "src/main.ts", "import { join } from 'path';\n");
        write(root, "polyfills/path.ts", "export function join() {}\n");

        let mut profile = host_profile();
        profile.fallbacks = FallbackMap::empty().with(
            "path",
            ModuleFallback::Polyfill("polyfills/path.ts".into()),
        );

        let graph = GraphWalker::new(&profile, root).walk().unwrap();
        let order: Vec<&str> = graph.modules().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(order, vec!["src/main.ts", "polyfills/path.ts"]);
    }

    #[test]
    fn disabled_module_reference_fails_the_walk() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "src/main.ts", "import './deep';\n");
        write(root, "src/deep.ts", "import * as fs from 'fs';\n");

        let mut profile = host_profile();
        profile.fallbacks = FallbackMap::empty().with("fs", ModuleFallback::Disabled);

        let err = GraphWalker::new(&profile, root).walk().unwrap_err();
        match err {
            WalkerError::Resolution {
                specifier,
                from,
                source,
            } => {
                assert_eq!(specifier, "fs");
                assert!(from.ends_with("deep.ts"));
                assert!(matches!(source, ResolveError::Disabled { .. }));
            }
            other => panic!("expected Resolution error, got {other:?}"),
        }
    }

    #[test]
    fn dynamic_import_is_rejected() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "src/main.ts", "const f = () => import('./x');\n");
        write(root, "src/x.ts", "export {};\n");

        let profile = host_profile();
        let err = GraphWalker::new(&profile, root).walk().unwrap_err();
        assert!(matches!(err, WalkerError::DynamicImport { .. }));
    }
}
