//! Import statement extraction.
//!
//! A bare `import foo` produces one [`ImportReference`]. A `from foo import
//! bar, baz` produces one reference for `foo` plus one for each imported
//! member (`foo.bar`, `foo.baz`) — the deliberate over-approximation the
//! resolver is built around.

use std::sync::OnceLock;

use tree_sitter::{Node, Query, QueryCursor, StreamingIterator};

use crate::{AnatomistError, ImportKind};

/// A single import mention: the dotted (or dot-prefixed relative) name as it
/// appears in source, its line, and whether it came from a bare `import` or
/// a `from ... import` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReference {
    pub symbolic_name: String,
    pub line: u32,
    pub kind: ImportKind,
}

static IMPORT_QUERY: OnceLock<Query> = OnceLock::new();

fn get_import_query() -> &'static Query {
    IMPORT_QUERY.get_or_init(|| {
        Query::new(
            &tree_sitter_python::LANGUAGE.into(),
            r#"
            (import_statement
              name: [
                (dotted_name) @import_module
                (aliased_import name: (dotted_name) @import_module)
              ])

            (import_from_statement
              module_name: (dotted_name) @from_module
              name: [
                (dotted_name) @from_name
                (aliased_import name: (dotted_name) @from_name)
              ])

            (import_from_statement
              module_name: (relative_import) @from_relative
              name: [
                (dotted_name) @from_name_rel
                (aliased_import name: (dotted_name) @from_name_rel)
              ])

            (import_from_statement
              module_name: (dotted_name) @from_module_star
              (wildcard_import))

            (import_from_statement
              module_name: (relative_import) @from_relative_star
              (wildcard_import))
            "#,
        )
        .expect("import query compilation failed — hardcoded S-expression is malformed")
    })
}

/// Extracts all import references from a parsed source tree.
pub fn extract_imports(source: &[u8], root: Node) -> Result<Vec<ImportReference>, AnatomistError> {
    let query = get_import_query();
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(query, root, source);

    let mut refs = Vec::new();

    while let Some(m) = matches.next() {
        let mut module_path: Option<String> = None;
        let mut module_kind = ImportKind::Direct;
        let mut module_line = 0u32;
        let mut members: Vec<String> = Vec::new();

        for capture in m.captures {
            let node = capture.node;
            let text = node.utf8_text(source).unwrap_or("");
            let line = node.start_position().row as u32 + 1;

            match query.capture_names()[capture.index as usize] {
                "import_module" => {
                    module_path = Some(text.to_string());
                    module_kind = ImportKind::Direct;
                    module_line = line;
                }
                "from_module" | "from_module_star" | "from_relative" | "from_relative_star" => {
                    module_path = Some(text.to_string());
                    module_kind = ImportKind::From;
                    module_line = line;
                }
                "from_name" | "from_name_rel" => members.push(text.to_string()),
                _ => {}
            }
        }

        let Some(module_path) = module_path else {
            continue;
        };

        refs.push(ImportReference {
            symbolic_name: module_path.clone(),
            line: module_line,
            kind: module_kind,
        });

        for member in &members {
            refs.push(ImportReference {
                symbolic_name: format!("{module_path}.{member}"),
                line: module_line,
                kind: ImportKind::From,
            });
        }
    }

    Ok(refs)
}
