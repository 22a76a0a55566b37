//! Module and graph types.

use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

use crate::parse::ImportRecord;

/// Stable module identifier: the path relative to the project root with
/// forward slashes, e.g. `src/util.ts`. Identifiers are what the linked
/// registry keys modules by, so they must be identical across builds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(String);

impl ModuleId {
    /// Derive an identifier from an absolute path and the project root.
    /// Paths outside the root keep their full form rather than failing;
    /// they still identify the module uniquely and deterministically.
    pub fn from_path(path: &Path, root: &Path) -> Self {
        let relative = path.strip_prefix(root).unwrap_or(path);
        let mut id = String::new();
        for component in relative.components() {
            if !id.is_empty() {
                id.push('/');
            }
            id.push_str(&component.as_os_str().to_string_lossy());
        }
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ModuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One source module discovered by the walker.
#[derive(Debug, Clone)]
pub struct Module {
    pub id: ModuleId,
    /// Absolute path on disk.
    pub path: PathBuf,
    /// Raw source text as read.
    pub source: String,
    /// Static imports in source order.
    pub imports: Vec<ImportRecord>,
    /// Specifier -> resolved module id, in import order.
    pub resolved: Vec<(String, ModuleId)>,
}

impl Module {
    /// Resolved id for a specifier appearing in this module.
    pub fn resolved_id(&self, specifier: &str) -> Option<&ModuleId> {
        self.resolved
            .iter()
            .find(|(spec, _)| spec == specifier)
            .map(|(_, id)| id)
    }
}

/// The walked import graph in deterministic discovery order (entry first).
#[derive(Debug, Clone)]
pub struct ModuleGraph {
    modules: Vec<Module>,
    index: FxHashMap<ModuleId, usize>,
    entry: ModuleId,
}

impl ModuleGraph {
    pub(crate) fn new(entry: ModuleId, modules: Vec<Module>) -> Self {
        let index = modules
            .iter()
            .enumerate()
            .map(|(slot, module)| (module.id.clone(), slot))
            .collect();
        Self {
            modules,
            index,
            entry,
        }
    }

    /// Entry module identifier.
    pub fn entry(&self) -> &ModuleId {
        &self.entry
    }

    pub fn get(&self, id: &ModuleId) -> Option<&Module> {
        self.index.get(id).map(|&slot| &self.modules[slot])
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Modules in discovery order. The linker emits registry entries in
    /// exactly this order, which is what makes rebuilds byte-identical.
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_id_is_root_relative_with_forward_slashes() {
        let root = Path::new("/project");
        let id = ModuleId::from_path(Path::new("/project/src/util.ts"), root);
        assert_eq!(id.as_str(), "src/util.ts");
    }

    #[test]
    fn module_id_outside_root_keeps_full_path() {
        let root = Path::new("/project");
        let id = ModuleId::from_path(Path::new("/elsewhere/x.ts"), root);
        assert_eq!(id.as_str(), "/elsewhere/x.ts");
    }
}
