//! Specifier resolution.
//!
//! Relative specifiers resolve against the importing file with extension
//! and index-file probing. Bare specifiers name abstract platform modules
//! and consult the profile's fallback table; they never reach the
//! filesystem on their own.

use std::path::{Path, PathBuf};

use duplex_profile::{FallbackMap, ModuleFallback};
use path_clean::PathClean;

/// Supported file extensions for module resolution.
pub const EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx", "mjs"];

/// Resolution failure for a single specifier. The walker attaches the
/// importing file before surfacing it.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ResolveError {
    /// No mapping for a platform module identifier under the active
    /// target, or a relative path with no matching file. The identifier
    /// is the user-facing signal: for the browser profile the remedy is a
    /// fallback entry, for the host profile it is removing the dependency
    /// from shared code.
    #[error("module not found: '{specifier}'")]
    NotFound { specifier: String },

    /// Static reference to an identifier mapped as Disabled.
    #[error("module '{specifier}' is disabled for this target")]
    Disabled { specifier: String },

    /// The fallback table maps the identifier to a file that does not
    /// exist on disk.
    #[error(
        "{kind} implementation for '{specifier}' not found at '{}'", path.display()
    )]
    SubstituteMissing {
        specifier: String,
        kind: &'static str,
        path: PathBuf,
    },
}

/// Resolve one specifier appearing in `importer` to an absolute file path.
///
/// `root` anchors absolute (`/x`) specifiers and the fallback table's
/// substitute paths.
pub fn resolve_specifier(
    specifier: &str,
    importer: &Path,
    root: &Path,
    fallbacks: &FallbackMap,
) -> Result<PathBuf, ResolveError> {
    if specifier.starts_with("./") || specifier.starts_with("../") {
        let base = importer.parent().unwrap_or(Path::new(""));
        let candidate = base.join(specifier).clean();
        return probe(&candidate).ok_or_else(|| ResolveError::NotFound {
            specifier: specifier.to_string(),
        });
    }

    if let Some(stripped) = specifier.strip_prefix('/') {
        let candidate = root.join(stripped).clean();
        return probe(&candidate).ok_or_else(|| ResolveError::NotFound {
            specifier: specifier.to_string(),
        });
    }

    // Bare specifier: a platform module identifier.
    match fallbacks.get(specifier) {
        Some(ModuleFallback::Disabled) => Err(ResolveError::Disabled {
            specifier: specifier.to_string(),
        }),
        Some(fallback) => {
            let mapped = fallback.substitute_path().expect("non-disabled fallback");
            let candidate = if mapped.is_absolute() {
                mapped.to_path_buf()
            } else {
                root.join(mapped).clean()
            };
            probe(&candidate).ok_or_else(|| ResolveError::SubstituteMissing {
                specifier: specifier.to_string(),
                kind: fallback.label(),
                path: candidate,
            })
        }
        None => Err(ResolveError::NotFound {
            specifier: specifier.to_string(),
        }),
    }
}

/// Try a candidate as-is, with each known extension, then as a directory
/// with index files.
fn probe(candidate: &Path) -> Option<PathBuf> {
    if candidate.is_file() {
        return Some(candidate.to_path_buf());
    }

    for ext in EXTENSIONS {
        let with_ext = candidate.with_extension(ext);
        if with_ext.is_file() {
            return Some(with_ext);
        }
    }

    if candidate.is_dir() {
        for ext in EXTENSIONS {
            let index = candidate.join(format!("index.{ext}"));
            if index.is_file() {
                return Some(index);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "export {};\n").unwrap();
    }

    #[test]
    fn relative_specifier_probes_extensions() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(&root.join("src/util.ts"));
        touch(&root.join("src/main.ts"));

        let resolved = resolve_specifier(
            "./util",
            &root.join("src/main.ts"),
            root,
            &FallbackMap::empty(),
        )
        .unwrap();
        assert_eq!(resolved, root.join("src/util.ts"));
    }

    #[test]
    fn relative_specifier_probes_index_files() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(&root.join("src/lib/index.ts"));
        touch(&root.join("src/main.ts"));

        let resolved = resolve_specifier(
            "./lib",
            &root.join("src/main.ts"),
            root,
            &FallbackMap::empty(),
        )
        .unwrap();
        assert_eq!(resolved, root.join("src/lib/index.ts"));
    }

    #[test]
    fn bare_specifier_without_mapping_is_not_found() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(&root.join("src/main.ts"));

        let err = resolve_specifier(
            "crypto",
            &root.join("src/main.ts"),
            root,
            &FallbackMap::empty(),
        )
        .unwrap_err();
        match err {
            ResolveError::NotFound { specifier } => assert_eq!(specifier, "crypto"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn polyfill_mapping_resolves_to_substitute() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(&root.join("polyfills/path.ts"));
        touch(&root.join("src/main.ts"));

        let fallbacks = FallbackMap::empty().with(
            "path",
            ModuleFallback::Polyfill(PathBuf::from("polyfills/path.ts")),
        );
        let resolved =
            resolve_specifier("path", &root.join("src/main.ts"), root, &fallbacks).unwrap();
        assert_eq!(resolved, root.join("polyfills/path.ts"));
    }

    #[test]
    fn disabled_mapping_is_a_hard_failure() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(&root.join("src/main.ts"));

        let fallbacks = FallbackMap::empty().with("fs", ModuleFallback::Disabled);
        let err =
            resolve_specifier("fs", &root.join("src/main.ts"), root, &fallbacks).unwrap_err();
        assert!(matches!(err, ResolveError::Disabled { .. }));
    }

    #[test]
    fn missing_substitute_names_both_sides() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(&root.join("src/main.ts"));

        let fallbacks = FallbackMap::empty().with(
            "crypto",
            ModuleFallback::Polyfill(PathBuf::from("polyfills/crypto.ts")),
        );
        let err =
            resolve_specifier("crypto", &root.join("src/main.ts"), root, &fallbacks).unwrap_err();
        match err {
            ResolveError::SubstituteMissing {
                specifier, kind, ..
            } => {
                assert_eq!(specifier, "crypto");
                assert_eq!(kind, "polyfill");
            }
            other => panic!("expected SubstituteMissing, got {other:?}"),
        }
    }
}
