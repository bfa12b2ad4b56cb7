//! Tree-sitter based source parser producing cached per-file facts: import
//! references, exported names, and line counts.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use tree_sitter::{Node, Parser, Query, QueryCursor, StreamingIterator};

use crate::imports::{extract_imports, ImportReference};
use crate::path_util::normalize_path;
use crate::AnatomistError;

/// Cached facts about a single parsed source file.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: String,
    pub imports: Vec<ImportReference>,
    pub exports: Vec<String>,
    pub line_count: u32,
}

static EXPORT_QUERY: OnceLock<Query> = OnceLock::new();

fn get_export_query() -> &'static Query {
    EXPORT_QUERY.get_or_init(|| {
        Query::new(
            &tree_sitter_python::LANGUAGE.into(),
            r#"
            (function_definition
              name: (identifier) @export.name)

            (class_definition
              name: (identifier) @export.name)

            (assignment
              left: (identifier) @export.name)
            "#,
        )
        .expect("export query compilation failed — hardcoded S-expression is malformed")
    })
}

/// Parses Python source files, caching each result by canonical path so a
/// given file is only read and parsed once per run.
pub struct ParserHost {
    parser: Parser,
    cache: HashMap<String, SourceFile>,
}

impl ParserHost {
    pub fn new() -> Result<Self, AnatomistError> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|e| {
                AnatomistError::ParseFailure(format!("failed to load Python grammar: {e}"))
            })?;

        Ok(Self {
            parser,
            cache: HashMap::new(),
        })
    }

    /// Parses `path`, returning the cached result if this path was already
    /// parsed during this run.
    pub fn parse_file(&mut self, path: &Path) -> Result<SourceFile, AnatomistError> {
        let normalized = normalize_path(path)?;
        if let Some(cached) = self.cache.get(&normalized) {
            return Ok(cached.clone());
        }

        let bytes = fs::read(path)?;
        if bytes.len() > u32::MAX as usize {
            return Err(AnatomistError::ByteRangeOverflow);
        }

        let source_file = self.parse_bytes(&bytes, &normalized)?;
        self.cache.insert(normalized, source_file.clone());
        Ok(source_file)
    }

    fn parse_bytes(&mut self, source: &[u8], path: &str) -> Result<SourceFile, AnatomistError> {
        let line_count = count_lines(source);

        if source.is_empty() {
            return Ok(SourceFile {
                path: path.to_string(),
                imports: Vec::new(),
                exports: Vec::new(),
                line_count,
            });
        }

        let tree = self.parser.parse(source, None).ok_or_else(|| {
            AnatomistError::ParseFailure("tree-sitter parse returned None".to_string())
        })?;
        let root = tree.root_node();

        let imports = extract_imports(source, root)?;
        let exports = extract_exports(source, root);

        Ok(SourceFile {
            path: path.to_string(),
            imports,
            exports,
            line_count,
        })
    }

    /// Test helper: parses bytes directly without touching the filesystem
    /// or the parse cache.
    #[cfg(test)]
    pub(crate) fn parse_bytes_for_test(
        &mut self,
        source: &[u8],
        path: &str,
    ) -> Result<SourceFile, AnatomistError> {
        self.parse_bytes(source, path)
    }
}

fn count_lines(source: &[u8]) -> u32 {
    if source.is_empty() {
        return 0;
    }
    let newlines = source.iter().filter(|&&b| b == b'\n').count() as u32;
    if source.last() == Some(&b'\n') {
        newlines
    } else {
        newlines + 1
    }
}

/// Collects exported names from anywhere in the tree — not only top level,
/// matching the distilled spec's deliberate over-collection: nested `def`s
/// inside functions and classes leak into the export set.
fn extract_exports(source: &[u8], root: Node) -> Vec<String> {
    let query = get_export_query();
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(query, root, source);

    let mut exports = Vec::new();
    while let Some(m) = matches.next() {
        for capture in m.captures {
            if let Ok(text) = capture.node.utf8_text(source) {
                if !text.starts_with('_') {
                    exports.push(text.to_string());
                }
            }
        }
    }
    exports
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_function_is_exported() {
        let mut host = ParserHost::new().unwrap();
        let source = b"def hello():\n    pass\n";
        let sf = host.parse_bytes_for_test(source, "test.py").unwrap();
        assert_eq!(sf.exports, vec!["hello".to_string()]);
        assert_eq!(sf.line_count, 2);
    }

    #[test]
    fn private_names_are_not_exported() {
        let mut host = ParserHost::new().unwrap();
        let source = b"def _helper():\n    pass\n\ndef public():\n    pass\n";
        let sf = host.parse_bytes_for_test(source, "test.py").unwrap();
        assert_eq!(sf.exports, vec!["public".to_string()]);
    }

    #[test]
    fn class_and_nested_function_both_exported() {
        let mut host = ParserHost::new().unwrap();
        let source = b"class Foo:\n    def bar(self):\n        def inner():\n            pass\n";
        let sf = host.parse_bytes_for_test(source, "test.py").unwrap();
        assert!(sf.exports.contains(&"Foo".to_string()));
        assert!(sf.exports.contains(&"bar".to_string()));
        assert!(sf.exports.contains(&"inner".to_string()));
    }

    #[test]
    fn module_level_assignment_is_exported() {
        let mut host = ParserHost::new().unwrap();
        let source = b"VERSION = \"1.0\"\n";
        let sf = host.parse_bytes_for_test(source, "test.py").unwrap();
        assert_eq!(sf.exports, vec!["VERSION".to_string()]);
    }

    #[test]
    fn empty_file_has_no_facts() {
        let mut host = ParserHost::new().unwrap();
        let sf = host.parse_bytes_for_test(b"", "empty.py").unwrap();
        assert!(sf.exports.is_empty());
        assert!(sf.imports.is_empty());
        assert_eq!(sf.line_count, 0);
    }

    #[test]
    fn syntax_error_recovers_partial_facts() {
        let mut host = ParserHost::new().unwrap();
        let source = b"def broken(\n    pass\ndef valid():\n    pass\n";
        let sf = host.parse_bytes_for_test(source, "broken.py").unwrap();
        assert!(sf.exports.contains(&"valid".to_string()));
    }

    #[test]
    fn line_count_without_trailing_newline() {
        let mut host = ParserHost::new().unwrap();
        let sf = host
            .parse_bytes_for_test(b"a = 1\nb = 2", "test.py")
            .unwrap();
        assert_eq!(sf.line_count, 2);
    }

    #[test]
    fn repeated_parse_uses_cache() {
        let tmp = std::env::temp_dir().join("test_parser_cache.py");
        std::fs::write(&tmp, "def cached():\n    pass\n").ok();

        let mut host = ParserHost::new().unwrap();
        let first = host.parse_file(&tmp).unwrap();
        let second = host.parse_file(&tmp).unwrap();
        assert_eq!(first.path, second.path);
        assert_eq!(first.exports, second.exports);

        std::fs::remove_file(tmp).ok();
    }
}
