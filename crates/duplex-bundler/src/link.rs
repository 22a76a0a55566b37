//! Linking and target packaging.
//!
//! Assembles rewritten module bodies into a single script around a minimal
//! module registry, then applies the profile's packaging mode:
//!
//! - `UmdLibrary`: the registry lives inside a UMD factory; loading the
//!   artifact binds exactly one global (the library name) and leaks
//!   nothing else.
//! - `BareGlobal`: the registry statements sit at the top level of a flat
//!   script and the entry module executes immediately, so its own
//!   `globalThis` assignments run when the host loads the file.

use duplex_graph::ModuleGraph;
use duplex_profile::PackagingMode;

use crate::{Error, Result};

/// Assemble the linked bundle for a packaging mode.
///
/// `bodies` are the rewritten module bodies, parallel to
/// `graph.modules()`. Registry entries are emitted in discovery order,
/// which keeps rebuilds byte-identical.
pub fn link_bundle(
    graph: &ModuleGraph,
    bodies: &[String],
    packaging: &PackagingMode,
) -> Result<String> {
    if bodies.len() != graph.len() {
        return Err(Error::Link(format!(
            "have {} rewritten bodies for {} modules",
            bodies.len(),
            graph.len()
        )));
    }

    let mut registry = String::new();
    registry.push_str(REGISTRY_PRELUDE);
    for (module, body) in graph.modules().iter().zip(bodies) {
        registry.push_str("__register(");
        registry.push_str(&js_string(module.id.as_str()));
        registry.push_str(", function (exports, require) {\n");
        registry.push_str(body);
        if !body.ends_with('\n') {
            registry.push('\n');
        }
        registry.push_str("});\n");
    }

    let entry = js_string(graph.entry().as_str());
    match packaging {
        PackagingMode::UmdLibrary { global_name } => Ok(format!(
            "(function (root, factory) {{\n\
             \tif (typeof define === \"function\" && define.amd) {{\n\
             \t\tdefine([], factory);\n\
             \t}} else if (typeof module === \"object\" && module.exports) {{\n\
             \t\tmodule.exports = factory();\n\
             \t}} else {{\n\
             \t\troot.{global_name} = factory();\n\
             \t}}\n\
             }})(typeof self !== \"undefined\" ? self : this, function () {{\n\
             \"use strict\";\n\
             {registry}\
             return __require({entry});\n\
             }});\n"
        )),
        PackagingMode::BareGlobal => {
            // Flat script: top-level statements only, entry runs at load.
            Ok(format!("{registry}__require({entry});\n"))
        }
    }
}

/// The in-bundle module registry. Instantiation is lazy with the exports
/// object installed before the factory runs, so import cycles see partial
/// exports instead of recursing forever.
const REGISTRY_PRELUDE: &str = "\
var __modules = Object.create(null);\n\
function __register(id, factory) {\n\
\t__modules[id] = { factory: factory, exports: null };\n\
}\n\
function __require(id) {\n\
\tvar entry = __modules[id];\n\
\tif (entry.exports === null) {\n\
\t\tentry.exports = {};\n\
\t\tentry.factory(entry.exports, __require);\n\
\t}\n\
\treturn entry.exports;\n\
}\n";

fn js_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}
