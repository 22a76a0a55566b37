//! Platform module fallback table.
//!
//! Shared source may import abstract platform modules ("path", "crypto")
//! that only exist natively in one environment. Each target profile carries
//! a [`FallbackMap`] deciding, per identifier, whether the reference is
//! satisfied by a native implementation, substituted with a polyfill, or
//! deliberately disabled.

use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Resolution outcome for one platform module identifier.
///
/// Every identifier referenced by reachable shared source must resolve to
/// exactly one outcome per target. An identifier missing from the map is not
/// an outcome: it fails the build for that target with an unresolved-module
/// error naming the identifier, which is the intended signal to add an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModuleFallback {
    /// Use the platform's own implementation, rooted at the given path.
    Native(PathBuf),
    /// Substitute a browser-safe (or host-safe) implementation.
    Polyfill(PathBuf),
    /// Never bundle this module. Any static reference to it anywhere in the
    /// reachable source graph is a hard build failure, not a silent no-op.
    Disabled,
}

impl ModuleFallback {
    /// The substitute file to bundle, if this outcome provides one.
    pub fn substitute_path(&self) -> Option<&Path> {
        match self {
            Self::Native(path) | Self::Polyfill(path) => Some(path),
            Self::Disabled => None,
        }
    }

    /// Short label used in logs and error messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Native(_) => "native",
            Self::Polyfill(_) => "polyfill",
            Self::Disabled => "disabled",
        }
    }
}

/// Ordered platform-module fallback table for one target profile.
///
/// Lookup is by identifier; iteration order is insertion order so that
/// error reporting and logging are deterministic across builds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FallbackMap {
    entries: Vec<(String, ModuleFallback)>,
    #[serde(skip)]
    index: FxHashMap<String, usize>,
}

impl PartialEq for FallbackMap {
    fn eq(&self, other: &Self) -> bool {
        // The index is derived state; equality is the entry list.
        self.entries == other.entries
    }
}

impl Eq for FallbackMap {}

impl FallbackMap {
    /// Create an empty table. The HostScript profile uses this: shared
    /// source is expected to avoid platform modules entirely on that path.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Insert or replace the outcome for an identifier.
    pub fn insert(&mut self, specifier: impl Into<String>, fallback: ModuleFallback) {
        let specifier = specifier.into();
        if let Some(&slot) = self.index.get(&specifier) {
            self.entries[slot].1 = fallback;
        } else {
            self.index.insert(specifier.clone(), self.entries.len());
            self.entries.push((specifier, fallback));
        }
    }

    /// Builder-style insert for static profile construction.
    pub fn with(mut self, specifier: impl Into<String>, fallback: ModuleFallback) -> Self {
        self.insert(specifier, fallback);
        self
    }

    /// Look up the outcome for a platform module identifier.
    pub fn get(&self, specifier: &str) -> Option<&ModuleFallback> {
        self.index.get(specifier).map(|&slot| &self.entries[slot].1)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ModuleFallback)> {
        self.entries.iter().map(|(name, fb)| (name.as_str(), fb))
    }

    /// Rebuild the lookup index after deserialization.
    ///
    /// Serde skips the index field, so a table read from configuration has
    /// an empty one until this runs.
    pub fn reindex(&mut self) {
        self.index = self
            .entries
            .iter()
            .enumerate()
            .map(|(slot, (name, _))| (name.clone(), slot))
            .collect();
    }
}

impl FromIterator<(String, ModuleFallback)> for FallbackMap {
    fn from_iter<T: IntoIterator<Item = (String, ModuleFallback)>>(iter: T) -> Self {
        let mut map = Self::default();
        for (name, fb) in iter {
            map.insert(name, fb);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_lookup() {
        let map = FallbackMap::empty()
            .with("path", ModuleFallback::Polyfill("polyfills/path.ts".into()))
            .with("fs", ModuleFallback::Disabled);

        assert_eq!(map.len(), 2);
        assert!(matches!(map.get("path"), Some(ModuleFallback::Polyfill(_))));
        assert!(matches!(map.get("fs"), Some(ModuleFallback::Disabled)));
        assert!(map.get("crypto").is_none());
    }

    #[test]
    fn replace_keeps_position() {
        let mut map = FallbackMap::empty()
            .with("path", ModuleFallback::Disabled)
            .with("crypto", ModuleFallback::Disabled);
        map.insert("path", ModuleFallback::Polyfill("p.ts".into()));

        let order: Vec<&str> = map.iter().map(|(name, _)| name).collect();
        assert_eq!(order, vec!["path", "crypto"]);
        assert_eq!(
            map.get("path"),
            Some(&ModuleFallback::Polyfill("p.ts".into()))
        );
    }

    #[test]
    fn substitute_path_only_for_mapped_outcomes() {
        assert!(ModuleFallback::Disabled.substitute_path().is_none());
        assert_eq!(
            ModuleFallback::Native("vendor/path.ts".into()).substitute_path(),
            Some(Path::new("vendor/path.ts"))
        );
    }
}
