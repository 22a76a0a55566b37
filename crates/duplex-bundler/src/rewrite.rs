//! ESM-to-registry rewrite.
//!
//! The compile stage emits plain JavaScript with `import`/`export` syntax
//! intact. Neither target can ship that: the host has no module system at
//! all, and the browser artifact is a single self-contained file. This
//! stage splices each module's import and export statements into calls
//! against the tiny registry the linker emits, leaving every other byte of
//! the module untouched.
//!
//! Inside a rewritten body, `exports` and `require` are the parameters of
//! the registry factory the linker wraps the body in:
//!
//! ```text
//! import { join } from "path";     ->  const { join } = require("polyfills/path.ts");
//! export const x = 1;              ->  const x = 1; exports.x = x;
//! export default function f() {}   ->  function f() {} exports.default = f;
//! ```

use duplex_graph::Module;
use oxc_allocator::Allocator;
use oxc_ast::ast::{
    BindingPatternKind, Declaration, ExportDefaultDeclarationKind, ImportDeclarationSpecifier,
    ModuleDeclaration, ModuleExportName,
};
use oxc_parser::Parser;
use oxc_span::{GetSpan, SourceType};

use crate::{Error, Result};

/// A single text replacement, by byte range of the compiled source.
struct Edit {
    start: u32,
    end: u32,
    text: String,
}

/// Rewrite one compiled module into registry form.
pub fn rewrite_module(compiled: &str, module: &Module) -> Result<String> {
    let allocator = Allocator::default();
    let parsed = Parser::new(&allocator, compiled, SourceType::mjs()).parse();
    if !parsed.errors.is_empty() {
        return Err(Error::Link(format!(
            "compiled output of '{}' failed to re-parse",
            module.id
        )));
    }

    let mut edits: Vec<Edit> = Vec::new();
    let mut reexport_counter = 0usize;

    for stmt in parsed.program.body.iter() {
        let Some(module_decl) = stmt.as_module_declaration() else {
            continue;
        };
        match module_decl {
            ModuleDeclaration::ImportDeclaration(import) => {
                let id = resolved(module, &import.source.value)?;
                let mut lines: Vec<String> = Vec::new();
                let mut destructured: Vec<String> = Vec::new();

                if let Some(specs) = &import.specifiers {
                    for spec in specs {
                        match spec {
                            ImportDeclarationSpecifier::ImportDefaultSpecifier(default_spec) => {
                                destructured
                                    .push(format!("default: {}", default_spec.local.name));
                            }
                            ImportDeclarationSpecifier::ImportNamespaceSpecifier(ns_spec) => {
                                lines.push(format!(
                                    "const {} = require({});",
                                    ns_spec.local.name,
                                    js_string(&id)
                                ));
                            }
                            ImportDeclarationSpecifier::ImportSpecifier(named_spec) => {
                                let imported = module_export_name(&named_spec.imported);
                                let local = named_spec.local.name.as_str();
                                if imported == local {
                                    destructured.push(imported);
                                } else if is_identifier(&imported) {
                                    destructured.push(format!("{imported}: {local}"));
                                } else {
                                    destructured
                                        .push(format!("{}: {}", js_string(&imported), local));
                                }
                            }
                        }
                    }
                }

                if !destructured.is_empty() {
                    lines.push(format!(
                        "const {{ {} }} = require({});",
                        destructured.join(", "),
                        js_string(&id)
                    ));
                }
                if lines.is_empty() {
                    // Side-effect import: still instantiate the module.
                    lines.push(format!("require({});", js_string(&id)));
                }

                edits.push(Edit {
                    start: import.span.start,
                    end: import.span.end,
                    text: lines.join("\n"),
                });
            }

            ModuleDeclaration::ExportNamedDeclaration(export) => {
                if let Some(decl) = &export.declaration {
                    let names = declared_names(module, decl)?;
                    edits.push(Edit {
                        start: export.span.start,
                        end: decl.span().start,
                        text: String::new(),
                    });
                    let assignments: String = names
                        .iter()
                        .map(|name| format!("\n{} = {name};", property(name)))
                        .collect();
                    edits.push(Edit {
                        start: export.span.end,
                        end: export.span.end,
                        text: assignments,
                    });
                } else if let Some(source) = &export.source {
                    let id = resolved(module, &source.value)?;
                    let tmp = format!("__reexport{reexport_counter}");
                    reexport_counter += 1;
                    let mut text = format!("const {tmp} = require({});", js_string(&id));
                    for spec in &export.specifiers {
                        let local = module_export_name(&spec.local);
                        let exported = module_export_name(&spec.exported);
                        text.push_str(&format!(
                            "\n{} = {};",
                            property(&exported),
                            member(&tmp, &local)
                        ));
                    }
                    edits.push(Edit {
                        start: export.span.start,
                        end: export.span.end,
                        text,
                    });
                } else {
                    let lines: Vec<String> = export
                        .specifiers
                        .iter()
                        .map(|spec| {
                            let local = module_export_name(&spec.local);
                            let exported = module_export_name(&spec.exported);
                            format!("{} = {local};", property(&exported))
                        })
                        .collect();
                    edits.push(Edit {
                        start: export.span.start,
                        end: export.span.end,
                        text: lines.join("\n"),
                    });
                }
            }

            ModuleDeclaration::ExportAllDeclaration(export) => {
                let id = resolved(module, &export.source.value)?;
                let text = match &export.exported {
                    Some(name) => format!(
                        "{} = require({});",
                        property(&module_export_name(name)),
                        js_string(&id)
                    ),
                    None => format!("Object.assign(exports, require({}));", js_string(&id)),
                };
                edits.push(Edit {
                    start: export.span.start,
                    end: export.span.end,
                    text,
                });
            }

            ModuleDeclaration::ExportDefaultDeclaration(export) => {
                if let Some(expr) = export.declaration.as_expression() {
                    edits.push(Edit {
                        start: export.span.start,
                        end: expr.span().start,
                        text: "exports.default = ".to_string(),
                    });
                } else {
                    match &export.declaration {
                        ExportDefaultDeclarationKind::FunctionDeclaration(func) => {
                            rewrite_default_declaration(
                                &mut edits,
                                export.span,
                                func.span,
                                func.id.as_ref().map(|id| id.name.as_str()),
                            );
                        }
                        ExportDefaultDeclarationKind::ClassDeclaration(class) => {
                            rewrite_default_declaration(
                                &mut edits,
                                export.span,
                                class.span,
                                class.id.as_ref().map(|id| id.name.as_str()),
                            );
                        }
                        _ => {
                            return Err(Error::Unsupported {
                                module: module.id.to_string(),
                                detail: "export default of this form".to_string(),
                            });
                        }
                    }
                }
            }

            _ => {
                return Err(Error::Unsupported {
                    module: module.id.to_string(),
                    detail: "TypeScript-style export assignment".to_string(),
                });
            }
        }
    }

    Ok(apply_edits(compiled, edits))
}

fn rewrite_default_declaration(
    edits: &mut Vec<Edit>,
    export_span: oxc_span::Span,
    decl_span: oxc_span::Span,
    name: Option<&str>,
) {
    match name {
        Some(name) => {
            // Keep the declaration, bind it afterwards.
            edits.push(Edit {
                start: export_span.start,
                end: decl_span.start,
                text: String::new(),
            });
            edits.push(Edit {
                start: export_span.end,
                end: export_span.end,
                text: format!("\nexports.default = {name};"),
            });
        }
        None => {
            // Anonymous: the declaration becomes an expression on the
            // right-hand side of the assignment.
            edits.push(Edit {
                start: export_span.start,
                end: decl_span.start,
                text: "exports.default = ".to_string(),
            });
            edits.push(Edit {
                start: export_span.end,
                end: export_span.end,
                text: ";".to_string(),
            });
        }
    }
}

fn resolved(module: &Module, specifier: &str) -> Result<String> {
    module
        .resolved_id(specifier)
        .map(|id| id.as_str().to_string())
        .ok_or_else(|| {
            Error::Link(format!(
                "specifier '{specifier}' in '{}' reached the rewrite stage unresolved",
                module.id
            ))
        })
}

fn declared_names(module: &Module, decl: &Declaration) -> Result<Vec<String>> {
    match decl {
        Declaration::VariableDeclaration(var) => {
            let mut names = Vec::new();
            for declarator in &var.declarations {
                match &declarator.id.kind {
                    BindingPatternKind::BindingIdentifier(ident) => {
                        names.push(ident.name.to_string());
                    }
                    _ => {
                        return Err(Error::Unsupported {
                            module: module.id.to_string(),
                            detail: "destructuring pattern in an exported declaration"
                                .to_string(),
                        });
                    }
                }
            }
            Ok(names)
        }
        Declaration::FunctionDeclaration(func) => {
            Ok(func.id.iter().map(|id| id.name.to_string()).collect())
        }
        Declaration::ClassDeclaration(class) => {
            Ok(class.id.iter().map(|id| id.name.to_string()).collect())
        }
        _ => Err(Error::Unsupported {
            module: module.id.to_string(),
            detail: "non-value export declaration".to_string(),
        }),
    }
}

fn module_export_name(name: &ModuleExportName) -> String {
    match name {
        ModuleExportName::IdentifierName(ident) => ident.name.to_string(),
        ModuleExportName::IdentifierReference(ident) => ident.name.to_string(),
        ModuleExportName::StringLiteral(lit) => lit.value.to_string(),
    }
}

/// `exports.name` or `exports["name"]` depending on identifier validity.
fn property(name: &str) -> String {
    member("exports", name)
}

fn member(object: &str, name: &str) -> String {
    if is_identifier(name) {
        format!("{object}.{name}")
    } else {
        format!("{object}[{}]", js_string(name))
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Quote a module id or export name as a JavaScript string literal.
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

fn apply_edits(source: &str, mut edits: Vec<Edit>) -> String {
    edits.sort_by_key(|edit| (edit.start, edit.end));

    let mut out = String::with_capacity(source.len());
    let mut cursor = 0usize;
    for edit in edits {
        let start = edit.start as usize;
        let end = edit.end as usize;
        debug_assert!(start >= cursor, "overlapping rewrite edits");
        out.push_str(&source[cursor..start]);
        out.push_str(&edit.text);
        cursor = end;
    }
    out.push_str(&source[cursor..]);
    out
}
