//! Minification policy: reserved symbols and comment retention.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Annotation marker pattern recognized by [`CommentPolicy::KeepAnnotated`].
///
/// Matches the conventional license/preserve/conditional-compilation
/// markers. Case insensitive.
pub const ANNOTATION_MARKERS: &str = r"(?i)@preserve|@license|@cc_on";

/// Exported names that must appear unchanged in the minified artifact.
///
/// The host runtime invokes these by literal name from outside the bundle;
/// it has no module loader and cannot be told an aliased name. Declared once
/// per target profile at configuration time, consumed only by the minify and
/// validate stages, never mutated during a build.
///
/// Backed by a `BTreeSet` so iteration order is stable and error output is
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReservedSymbols {
    names: BTreeSet<String>,
}

impl ReservedSymbols {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Iterate names in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for ReservedSymbols {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self::new(iter)
    }
}

/// Comment retention policy applied during minification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommentPolicy {
    /// Discard every comment. Size wins; the browser artifact uses this.
    #[default]
    Strip,
    /// Keep comments carrying an annotation marker (`@preserve`, `@license`,
    /// `@cc_on`). The host's editor surfaces these to the deploying user.
    KeepAnnotated,
}

impl CommentPolicy {
    /// Whether a comment body should survive minification under this policy.
    pub fn retains(&self, comment: &str) -> bool {
        match self {
            Self::Strip => false,
            Self::KeepAnnotated => annotation_matcher().is_match(comment),
        }
    }
}

impl std::fmt::Display for CommentPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Strip => write!(f, "strip"),
            Self::KeepAnnotated => write!(f, "keep-annotated"),
        }
    }
}

fn annotation_matcher() -> &'static Regex {
    static MATCHER: OnceLock<Regex> = OnceLock::new();
    MATCHER.get_or_init(|| Regex::new(ANNOTATION_MARKERS).expect("annotation pattern is valid"))
}

/// Complete minification policy for one target profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinifyPolicy {
    /// Names that must survive minification verbatim.
    pub reserved: ReservedSymbols,
    /// Comment retention predicate.
    pub comments: CommentPolicy,
    /// Whether top-level bindings may be renamed. The flat host-script
    /// artifact keeps its top level stable; the UMD artifact, whose top
    /// level is enclosed in the wrapper, mangles everything.
    pub mangle_top_level: bool,
}
