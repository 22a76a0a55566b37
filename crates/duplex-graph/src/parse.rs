//! Static import extraction.
//!
//! Parses one module with oxc and collects the specifiers its import graph
//! edges come from: `import` declarations and re-exporting `export`
//! declarations. Type-only imports vanish during compilation and are not
//! graph edges.

use oxc_allocator::Allocator;
use oxc_ast::ast::{ImportExpression, ModuleDeclaration};
use oxc_ast_visit::Visit;
use oxc_parser::Parser;
use oxc_span::SourceType;

/// One static import edge, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRecord {
    /// The specifier exactly as written: `./util`, `path`, ...
    pub specifier: String,
}

/// Extraction result for one module.
#[derive(Debug, Clone, Default)]
pub struct ModuleSummary {
    pub imports: Vec<ImportRecord>,
    /// Byte offset of the first dynamic `import(...)`, if any. Neither
    /// target can express one (the host has no loader; the browser
    /// artifact is a single file), so the walker turns this into an error.
    pub dynamic_import: Option<u32>,
}

/// Parse errors are reported as formatted diagnostics; the walker attaches
/// the file path.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct ParseFailure {
    pub message: String,
}

/// Extract the static import surface of one module.
pub fn extract_imports(source: &str, file_name: &str) -> Result<ModuleSummary, ParseFailure> {
    let allocator = Allocator::default();
    let source_type = SourceType::from_path(file_name).unwrap_or_else(|_| SourceType::ts());

    let parsed = Parser::new(&allocator, source, source_type).parse();
    if !parsed.errors.is_empty() {
        let messages: Vec<String> = parsed.errors.iter().map(|e| format!("{e:?}")).collect();
        return Err(ParseFailure {
            message: messages.join(", "),
        });
    }

    let mut summary = ModuleSummary::default();

    for stmt in parsed.program.body.iter() {
        let Some(module_decl) = stmt.as_module_declaration() else {
            continue;
        };
        match module_decl {
            ModuleDeclaration::ImportDeclaration(import) => {
                if import.import_kind.is_type() {
                    continue;
                }
                summary.imports.push(ImportRecord {
                    specifier: import.source.value.to_string(),
                });
            }
            ModuleDeclaration::ExportNamedDeclaration(export) => {
                if export.export_kind.is_type() {
                    continue;
                }
                if let Some(source) = &export.source {
                    summary.imports.push(ImportRecord {
                        specifier: source.value.to_string(),
                    });
                }
            }
            ModuleDeclaration::ExportAllDeclaration(export) => {
                if export.export_kind.is_type() {
                    continue;
                }
                summary.imports.push(ImportRecord {
                    specifier: export.source.value.to_string(),
                });
            }
            _ => {}
        }
    }

    let mut finder = DynamicImportFinder::default();
    finder.visit_program(&parsed.program);
    summary.dynamic_import = finder.first_offset;

    Ok(summary)
}

#[derive(Default)]
struct DynamicImportFinder {
    first_offset: Option<u32>,
}

impl<'a> Visit<'a> for DynamicImportFinder {
    fn visit_import_expression(&mut self, it: &ImportExpression<'a>) {
        if self.first_offset.is_none() {
            self.first_offset = Some(it.span.start);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_imports_in_source_order() {
        let source = r#"
            import { join } from "path";
            import helper from "./helper";
            import "./side-effect";
            export { thing } from "./things";
            export * from "./wide";
        "#;

        let summary = extract_imports(source, "main.ts").unwrap();
        let specifiers: Vec<&str> = summary
            .imports
            .iter()
            .map(|record| record.specifier.as_str())
            .collect();
        assert_eq!(
            specifiers,
            vec!["path", "./helper", "./side-effect", "./things", "./wide"]
        );
        assert!(summary.dynamic_import.is_none());
    }

    #[test]
    fn type_only_imports_are_not_edges() {
        let source = r#"
            import type { Config } from "./config";
            import { value } from "./value";
        "#;

        let summary = extract_imports(source, "main.ts").unwrap();
        let specifiers: Vec<&str> = summary
            .imports
            .iter()
            .map(|record| record.specifier.as_str())
            .collect();
        assert_eq!(specifiers, vec!["./value"]);
    }

    #[test]
    fn flags_dynamic_import() {
        let source = r#"const loader = () => import("./lazy");"#;
        let summary = extract_imports(source, "main.ts").unwrap();
        assert!(summary.dynamic_import.is_some());
    }

    #[test]
    fn reports_parse_errors() {
        let source = "import from from;;; {";
        assert!(extract_imports(source, "broken.ts").is_err());
    }
}
