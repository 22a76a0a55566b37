//! The shared TypeScript-to-JavaScript compile stage.
//!
//! Both targets run the same transformation; only the environment check
//! differs, driven by the profile's [`EnvironmentTag`]. Output is readable
//! JavaScript with ESM syntax intact; the rewrite stage turns that into
//! registry form afterwards.
//!
//! [`EnvironmentTag`]: duplex_profile::EnvironmentTag

use duplex_graph::Module;
use duplex_profile::TargetProfile;
use oxc_allocator::Allocator;
use oxc_codegen::{Codegen, CodegenOptions, CommentOptions, LegalComment};
use oxc_parser::Parser;
use oxc_semantic::SemanticBuilder;
use oxc_span::SourceType;
use oxc_transformer::{TransformOptions, Transformer};

use crate::ambient;
use crate::{Error, Result};

/// Compile one module of the shared source to JavaScript.
///
/// Runs parse, semantic analysis, the TypeScript transform, the
/// ambient-globals check for the profile's environment, and code
/// generation. Comments are carried through so the minify stage can apply
/// the profile's retention policy.
///
/// # Errors
///
/// Returns [`Error::TypeCheck`] for parse errors, transform errors, and
/// references to globals the target environment does not provide.
pub fn compile_module(module: &Module, profile: &TargetProfile) -> Result<String> {
    let allocator = Allocator::default();
    let source_type =
        SourceType::from_path(&module.path).unwrap_or_else(|_| SourceType::ts());

    let parsed = Parser::new(&allocator, &module.source, source_type).parse();
    if !parsed.errors.is_empty() {
        return Err(type_check_error(module, &parsed.errors));
    }
    let mut program = parsed.program;

    let semantic_ret = SemanticBuilder::new().build(&program);
    if !semantic_ret.errors.is_empty() {
        return Err(type_check_error(module, &semantic_ret.errors));
    }
    let scoping = semantic_ret.semantic.into_scoping();

    let transform_ret = Transformer::new(&allocator, &module.path, &TransformOptions::default())
        .build_with_scoping(scoping, &mut program);
    if !transform_ret.errors.is_empty() {
        return Err(type_check_error(module, &transform_ret.errors));
    }

    // Re-run semantic analysis on the transformed program: type-only
    // references are gone now, so every remaining unresolved reference is
    // a value-level use of a global.
    let semantic_ret = SemanticBuilder::new().build(&program);
    check_ambient_globals(module, profile, &semantic_ret.semantic)?;

    let output = Codegen::new()
        .with_options(CodegenOptions {
            comments: CommentOptions {
                normal: true,
                jsdoc: true,
                legal: LegalComment::Inline,
                annotation: true,
            },
            ..CodegenOptions::default()
        })
        .build(&program);

    Ok(output.code)
}

/// Fail on value references to globals outside the active environment.
fn check_ambient_globals(
    module: &Module,
    profile: &TargetProfile,
    semantic: &oxc_semantic::Semantic<'_>,
) -> Result<()> {
    let scoping = semantic.scoping();

    let mut offenders: Vec<String> = Vec::new();
    for (name, reference_ids) in scoping.root_unresolved_references() {
        let name = name.to_string();
        if ambient::provides(profile.environment, &profile.ambient_globals, &name) {
            continue;
        }
        let value_use = reference_ids.iter().any(|&id| {
            let reference = scoping.get_reference(id);
            reference.is_read() || reference.is_write()
        });
        if value_use {
            offenders.push(name);
        }
    }

    if offenders.is_empty() {
        return Ok(());
    }

    // Hash-map iteration order is arbitrary; sort so the failing
    // identifier is the same on every run.
    offenders.sort();
    offenders.dedup();
    Err(Error::TypeCheck {
        module: module.id.to_string(),
        message: format!(
            "global '{}' is not available in the {} environment of the {} target",
            offenders[0],
            match profile.environment {
                duplex_profile::EnvironmentTag::Dom => "dom",
                duplex_profile::EnvironmentTag::None => "empty",
            },
            profile.kind,
        ),
    })
}

fn type_check_error<D: std::fmt::Debug>(module: &Module, errors: &[D]) -> Error {
    let messages: Vec<String> = errors.iter().map(|e| format!("{e:?}")).collect();
    Error::TypeCheck {
        module: module.id.to_string(),
        message: messages.join(", "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duplex_graph::{GraphWalker, ModuleGraph};
    use duplex_profile::ReservedSymbols;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn graph_for(root: &Path, profile: &TargetProfile) -> ModuleGraph {
        GraphWalker::new(profile, root).walk().unwrap()
    }

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
    fn strips_typescript_types() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "src/main.ts",
            "interface Greeting { who: string }\n\
             export function greet(g: Greeting): string { return 'hi ' + g.who; }\n",
        );

        let profile = host_profile();
        let graph = graph_for(dir.path(), &profile);
        let compiled = compile_module(&graph.modules()[0], &profile).unwrap();

        assert!(!compiled.contains("interface"));
        assert!(!compiled.contains(": string"));
        assert!(compiled.contains("function greet"));
    }

    #[test]
    fn dom_global_fails_the_empty_environment() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "src/main.ts",
            "export function render(): void { document.title = 'x'; }\n",
        );

        let profile = host_profile();
        let graph = graph_for(dir.path(), &profile);
        let err = compile_module(&graph.modules()[0], &profile).unwrap_err();
        match err {
            Error::TypeCheck { module, message } => {
                assert_eq!(module, "src/main.ts");
                assert!(message.contains("'document'"), "message: {message}");
            }
            other => panic!("expected TypeCheck, got {other:?}"),
        }
    }

    #[test]
    fn dom_global_passes_the_dom_environment() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "src/main.ts",
            "export function render(): void { document.title = 'x'; }\n",
        );

        let profile =
            TargetProfile::browser("src/main.ts", "dist/browser", "app.min.js", "App");
        let graph = graph_for(dir.path(), &profile);
        assert!(compile_module(&graph.modules()[0], &profile).is_ok());
    }

    #[test]
    fn configured_host_service_is_accepted() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "src/main.ts",
            "export function rows(): number { return SpreadsheetApp.getActive().getSheets().length; }\n",
        );

        let profile = host_profile().with_ambient_globals(["SpreadsheetApp"]);
        let graph = graph_for(dir.path(), &profile);
        assert!(compile_module(&graph.modules()[0], &profile).is_ok());
    }

    #[test]
    fn type_only_reference_is_not_a_value_use() {
        let dir = TempDir::new().unwrap();
        // HTMLElement appears only in a type position; the compiled module
        // never references it at runtime.
        write(
            dir.path(),
            "src/main.ts",
            "export function tag(el: HTMLElement | null): string { return el ? 'el' : 'none'; }\n",
        );

        let profile = host_profile();
        let graph = graph_for(dir.path(), &profile);
        assert!(compile_module(&graph.modules()[0], &profile).is_ok());
    }
}
