//! Symbol preservation contract checks.
//!
//! Nothing in the type system enforces that a host entry point actually
//! reaches the global scope; an unbound function only surfaces as a
//! "function not found" error at invocation time, after deployment. These
//! checks move that failure to build time:
//!
//! 1. Before minification, every reserved symbol of a bare-global build
//!    must have a static `globalThis.<name> =` assignment in the linked
//!    bundle.
//! 2. After minification, every reserved symbol must appear verbatim in
//!    the artifact.

use duplex_profile::ReservedSymbols;
use regex::Regex;

use crate::{Error, Result};

/// Assert each reserved symbol is statically bound to the global scope.
///
/// Accepts both `globalThis.name = ...` and `globalThis["name"] = ...`
/// forms. Runs against the linked, pre-minify bundle so the match is on
/// the shape the shared source actually wrote.
pub fn check_global_bindings(bundle: &str, reserved: &ReservedSymbols) -> Result<()> {
    for symbol in reserved.iter() {
        let escaped = regex::escape(symbol);
        let pattern = format!(
            r#"globalThis\s*(?:\.\s*{escaped}|\[\s*["']{escaped}["']\s*\])\s*="#
        );
        let matcher = Regex::new(&pattern).expect("binding pattern is valid");
        if !matcher.is_match(bundle) {
            return Err(Error::PackagingViolation {
                symbol: symbol.to_string(),
                detail: "no static globalThis assignment in the compiled source; the host \
                         cannot invoke a name that is only a module export"
                    .to_string(),
            });
        }
    }
    Ok(())
}

/// Assert each reserved symbol survived minification verbatim.
pub fn verify_reserved(artifact: &str, reserved: &ReservedSymbols) -> Result<()> {
    for symbol in reserved.iter() {
        let escaped = regex::escape(symbol);
        let matcher =
            Regex::new(&format!(r"\b{escaped}\b")).expect("reserved pattern is valid");
        if !matcher.is_match(artifact) {
            return Err(Error::PackagingViolation {
                symbol: symbol.to_string(),
                detail: "name not present verbatim in the minified artifact".to_string(),
            });
        }
    }
    Ok(())
}
