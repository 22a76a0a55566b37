//! Ambient global sets for the per-target environment check.
//!
//! The original build type-checks the shared source twice: once against DOM
//! ambient declarations and once against an empty environment. This module
//! is the equivalent gate for the compile stage: a value reference to a
//! global the active [`EnvironmentTag`] does not provide fails that
//! target's build.
//!
//! [`EnvironmentTag`]: duplex_profile::EnvironmentTag

use duplex_profile::EnvironmentTag;
use phf::phf_set;

/// Language builtins available in every JavaScript environment.
static ES_GLOBALS: phf::Set<&'static str> = phf_set! {
    "globalThis", "undefined", "NaN", "Infinity",
    "Object", "Function", "Boolean", "Symbol", "Number", "BigInt",
    "Math", "Date", "String", "RegExp", "Array",
    "Int8Array", "Uint8Array", "Uint8ClampedArray", "Int16Array",
    "Uint16Array", "Int32Array", "Uint32Array", "Float32Array",
    "Float64Array", "BigInt64Array", "BigUint64Array",
    "ArrayBuffer", "SharedArrayBuffer", "DataView", "Atomics",
    "JSON", "Promise", "Reflect", "Proxy",
    "Map", "Set", "WeakMap", "WeakSet", "WeakRef", "FinalizationRegistry",
    "Error", "AggregateError", "EvalError", "RangeError", "ReferenceError",
    "SyntaxError", "TypeError", "URIError",
    "Intl", "eval", "isFinite", "isNaN", "parseFloat", "parseInt",
    "decodeURI", "decodeURIComponent", "encodeURI", "encodeURIComponent",
    "structuredClone", "console",
};

/// Globals the DOM environment adds on top of the language.
static DOM_GLOBALS: phf::Set<&'static str> = phf_set! {
    "window", "document", "self", "navigator", "location", "history",
    "screen", "fetch", "XMLHttpRequest",
    "URL", "URLSearchParams", "Headers", "Request", "Response",
    "FormData", "Blob", "File", "FileReader", "WebSocket",
    "localStorage", "sessionStorage",
    "setTimeout", "clearTimeout", "setInterval", "clearInterval",
    "queueMicrotask", "requestAnimationFrame", "cancelAnimationFrame",
    "atob", "btoa", "crypto", "performance",
    "Event", "EventTarget", "CustomEvent", "AbortController", "AbortSignal",
    "TextEncoder", "TextDecoder", "DOMParser",
    "MutationObserver", "ResizeObserver", "IntersectionObserver",
    "Node", "Element", "HTMLElement",
    "alert", "confirm", "prompt",
};

/// Whether `name` is an acceptable free reference under `environment`,
/// given the profile's extra host-provided globals.
pub fn provides(environment: EnvironmentTag, ambient_globals: &[String], name: &str) -> bool {
    if ES_GLOBALS.contains(name) {
        return true;
    }
    match environment {
        EnvironmentTag::Dom => {
            DOM_GLOBALS.contains(name) || ambient_globals.iter().any(|g| g == name)
        }
        EnvironmentTag::None => ambient_globals.iter().any(|g| g == name),
    }
}
