//! Dynamic-import detection: runtime-dispatched import, eval, exec, and
//! compile call sites that cannot be statically resolved.

use std::path::Path;
use std::sync::OnceLock;

use tree_sitter::{Node, Parser, Query, QueryCursor, StreamingIterator};

use crate::AnatomistError;

/// A single site flagged as dynamic or otherwise unanalyzable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicImportSite {
    pub line: u32,
    pub pattern: String,
    pub rationale: String,
}

static CALL_QUERY: OnceLock<Query> = OnceLock::new();

fn get_call_query() -> &'static Query {
    CALL_QUERY.get_or_init(|| {
        Query::new(
            &tree_sitter_python::LANGUAGE.into(),
            r#"
            (call
              function: (identifier) @direct_call) @call.site

            (call
              function: (attribute
                object: (_) @attr_object
                attribute: (identifier) @attr_call)) @call.site
            "#,
        )
        .expect("dynamic import query compilation failed — hardcoded S-expression is malformed")
    })
}

/// Scans a parsed syntax tree for `__import__`, `builtins.__import__`,
/// `importlib.import_module`, and `eval`/`exec`/`compile` call sites.
pub fn detect_dynamic_imports(source: &[u8], root: Node) -> Vec<DynamicImportSite> {
    let query = get_call_query();
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(query, root, source);

    let mut sites = Vec::new();

    while let Some(m) = matches.next() {
        let mut direct_name: Option<&str> = None;
        let mut attr_name: Option<&str> = None;
        let mut attr_object: Option<&str> = None;
        let mut line = 0u32;

        for capture in m.captures {
            let node = capture.node;
            let text = node.utf8_text(source).unwrap_or("");
            match query.capture_names()[capture.index as usize] {
                "call.site" => line = node.start_position().row as u32 + 1,
                "direct_call" => direct_name = Some(text),
                "attr_call" => attr_name = Some(text),
                "attr_object" => attr_object = Some(text),
                _ => {}
            }
        }

        if let Some(name) = direct_name {
            match name {
                "__import__" => sites.push(DynamicImportSite {
                    line,
                    pattern: "__import__()".to_string(),
                    rationale: "runtime import builtin".to_string(),
                }),
                "eval" | "exec" | "compile" => sites.push(DynamicImportSite {
                    line,
                    pattern: format!("{name}()"),
                    rationale: "cannot statically analyze".to_string(),
                }),
                _ => {}
            }
        }

        if attr_name == Some("import_module") {
            if let Some(object) = attr_object {
                if object == "importlib" || object.ends_with(".importlib") {
                    sites.push(DynamicImportSite {
                        line,
                        pattern: "importlib.import_module()".to_string(),
                        rationale: "runtime import via importlib".to_string(),
                    });
                }
            }
        }

        if attr_name == Some("__import__") {
            if let Some(object) = attr_object {
                if object == "builtins" || object.ends_with(".builtins") {
                    sites.push(DynamicImportSite {
                        line,
                        pattern: "builtins.__import__()".to_string(),
                        rationale: "runtime import builtin via builtins".to_string(),
                    });
                }
            }
        }
    }

    sites
}

/// Reads and parses `path` directly (outside the [`crate::parser::ParserHost`]
/// cache) and scans it for dynamic-import sites. Used by reporters that need
/// this one extra fact per file without keeping raw syntax trees around for
/// the whole run.
pub fn scan_file(path: &Path) -> Result<Vec<DynamicImportSite>, AnatomistError> {
    let bytes = std::fs::read(path)?;
    if bytes.is_empty() {
        return Ok(Vec::new());
    }

    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .map_err(|e| AnatomistError::ParseFailure(format!("failed to load Python grammar: {e}")))?;
    let tree = parser
        .parse(&bytes, None)
        .ok_or_else(|| AnatomistError::ParseFailure("tree-sitter parse returned None".to_string()))?;

    Ok(detect_dynamic_imports(&bytes, tree.root_node()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tree_sitter::Parser;

    fn detect(source: &str) -> Vec<DynamicImportSite> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .unwrap();
        let tree = parser.parse(source.as_bytes(), None).unwrap();
        detect_dynamic_imports(source.as_bytes(), tree.root_node())
    }

    #[test]
    fn detects_dunder_import() {
        let sites = detect("mod = __import__('os')");
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].pattern, "__import__()");
    }

    #[test]
    fn detects_importlib_import_module() {
        let sites = detect("import importlib\nmod = importlib.import_module(name)");
        assert!(sites.iter().any(|s| s.pattern == "importlib.import_module()"));
    }

    #[test]
    fn detects_builtins_dunder_import() {
        let sites = detect("import builtins\nmod = builtins.__import__('os')");
        assert!(sites.iter().any(|s| s.pattern == "builtins.__import__()"));
    }

    #[test]
    fn detects_eval_exec_compile() {
        let sites = detect("eval(x)\nexec(y)\ncompile(z, 'f', 'exec')");
        assert_eq!(sites.len(), 3);
    }

    #[test]
    fn ignores_unrelated_attribute_calls() {
        let sites = detect("obj.import_module()");
        assert!(sites.is_empty());
    }

    #[test]
    fn ignores_unrelated_direct_calls() {
        let sites = detect("print('hi')\nlen([1, 2])");
        assert!(sites.is_empty());
    }

    #[test]
    fn no_false_positive_on_plain_module_attribute() {
        let sites = detect("result = some_namespace.import_module(x)");
        assert!(!sites.iter().any(|s| s.pattern == "importlib.import_module()"));
    }

    #[test]
    fn scan_file_reads_and_parses_from_disk() {
        let tmp = std::env::temp_dir().join("test_dynamic_imports_scan_file.py");
        std::fs::write(&tmp, "mod = __import__('os')\n").unwrap();

        let sites = scan_file(&tmp).unwrap();
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].pattern, "__import__()");

        std::fs::remove_file(tmp).ok();
    }

    #[test]
    fn scan_file_empty_file_has_no_sites() {
        let tmp = std::env::temp_dir().join("test_dynamic_imports_scan_empty.py");
        std::fs::write(&tmp, "").unwrap();

        let sites = scan_file(&tmp).unwrap();
        assert!(sites.is_empty());

        std::fs::remove_file(tmp).ok();
    }
}
