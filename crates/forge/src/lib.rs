//! # The Forge: split suggestions for oversized modules
//!
//! Partitions a file's top-level syntax into classes, functions, and
//! assignments (source order), then applies a few greedy grouping
//! heuristics over the names to suggest how the module might be split.

use std::fs;
use std::path::Path;

use tree_sitter::{Node, Parser};

#[derive(Debug, thiserror::Error)]
pub enum ForgeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse failure: {0}")]
    ParseFailure(String),
}

pub const DEFAULT_MIN_LINES: u32 = 300;
pub const DEFAULT_MIN_FUNCTIONS: usize = 10;

const UTILITY_SPLIT_MIN_FUNCTIONS: usize = 15;
const PREFIX_GROUP_LEN: usize = 3;

/// A suggested way to split an oversized module, carrying a human-readable
/// reason and recommendation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitSuggestion {
    ClassGrouping {
        group_count: usize,
        reason: String,
        recommendation: String,
    },
    FunctionGrouping {
        group_count: usize,
        reason: String,
        recommendation: String,
    },
    UtilitySplit {
        reason: String,
        recommendation: String,
    },
}

/// Reads and parses the file at `path`, and if it exceeds `min_lines`,
/// returns the split suggestions that apply. Returns an empty list for
/// files at or under the threshold without parsing them.
pub fn suggest_splits(
    path: &Path,
    min_lines: u32,
    min_functions: usize,
) -> Result<Vec<SplitSuggestion>, ForgeError> {
    let bytes = fs::read(path)?;
    let line_count = count_lines(&bytes);
    if line_count <= min_lines {
        return Ok(Vec::new());
    }

    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .map_err(|e| ForgeError::ParseFailure(format!("failed to load Python grammar: {e}")))?;
    let tree = parser
        .parse(&bytes, None)
        .ok_or_else(|| ForgeError::ParseFailure("tree-sitter parse returned None".to_string()))?;

    let (classes, functions, _assignments) = partition_top_level(tree.root_node(), &bytes);

    Ok(build_suggestions(&classes, &functions, min_functions))
}

fn build_suggestions(
    classes: &[String],
    functions: &[String],
    min_functions: usize,
) -> Vec<SplitSuggestion> {
    let mut suggestions = Vec::new();

    if classes.len() >= 3 {
        let groups = greedy_group_by_prefix(classes, PREFIX_GROUP_LEN);
        let big_groups = groups.iter().filter(|g| g.len() >= 2).count();
        if big_groups > 1 {
            suggestions.push(SplitSuggestion::ClassGrouping {
                group_count: big_groups,
                reason: format!(
                    "{} classes fall into {} groups sharing a name prefix",
                    classes.len(),
                    big_groups
                ),
                recommendation: "split classes into separate modules by shared name prefix"
                    .to_string(),
            });
        }
    }

    if functions.len() >= min_functions {
        let groups = greedy_group_by_first_token(functions);
        let big_groups = groups.iter().filter(|g| g.len() >= 2).count();
        if big_groups > 1 {
            suggestions.push(SplitSuggestion::FunctionGrouping {
                group_count: big_groups,
                reason: format!(
                    "{} functions fall into {} groups sharing a name prefix",
                    functions.len(),
                    big_groups
                ),
                recommendation: "split functions into separate modules by shared name prefix"
                    .to_string(),
            });
        }
    }

    if classes.is_empty() && functions.len() >= UTILITY_SPLIT_MIN_FUNCTIONS {
        suggestions.push(SplitSuggestion::UtilitySplit {
            reason: format!("{} top-level functions with no classes", functions.len()),
            recommendation: "extract related functions into a dedicated utility module"
                .to_string(),
        });
    }

    suggestions
}

/// Greedily groups `names` by a shared lowercase prefix of `prefix_len`:
/// each unassigned name seeds a group; later unassigned names sharing its
/// prefix join it. Names shorter than `prefix_len` never group.
fn greedy_group_by_prefix(names: &[String], prefix_len: usize) -> Vec<Vec<String>> {
    let mut groups: Vec<Vec<String>> = Vec::new();
    let mut assigned = vec![false; names.len()];
    let lowered: Vec<String> = names.iter().map(|n| n.to_lowercase()).collect();

    for i in 0..names.len() {
        if assigned[i] {
            continue;
        }
        assigned[i] = true;
        if lowered[i].len() < prefix_len {
            groups.push(vec![names[i].clone()]);
            continue;
        }
        let seed_prefix = &lowered[i][..prefix_len];
        let mut group = vec![names[i].clone()];
        for j in (i + 1)..names.len() {
            if assigned[j] {
                continue;
            }
            if lowered[j].len() >= prefix_len && &lowered[j][..prefix_len] == seed_prefix {
                group.push(names[j].clone());
                assigned[j] = true;
            }
        }
        groups.push(group);
    }
    groups
}

/// Greedily groups `names` by the token preceding each name's first
/// underscore, when that token is at least 3 characters. Names with no
/// qualifying token never group.
fn greedy_group_by_first_token(names: &[String]) -> Vec<Vec<String>> {
    let token_of = |name: &str| -> Option<String> {
        let token = name.split('_').next().unwrap_or(name);
        (token.len() >= 3).then(|| token.to_lowercase())
    };

    let mut groups: Vec<Vec<String>> = Vec::new();
    let mut assigned = vec![false; names.len()];
    let tokens: Vec<Option<String>> = names.iter().map(|n| token_of(n)).collect();

    for i in 0..names.len() {
        if assigned[i] {
            continue;
        }
        assigned[i] = true;
        let Some(seed_token) = &tokens[i] else {
            groups.push(vec![names[i].clone()]);
            continue;
        };
        let mut group = vec![names[i].clone()];
        for j in (i + 1)..names.len() {
            if assigned[j] {
                continue;
            }
            if tokens[j].as_deref() == Some(seed_token.as_str()) {
                group.push(names[j].clone());
                assigned[j] = true;
            }
        }
        groups.push(group);
    }
    groups
}

/// Walks `root`'s direct children (the module's top-level statements) and
/// partitions them into class names, function names, and simple-assignment
/// target names, in source order.
fn partition_top_level(root: Node, source: &[u8]) -> (Vec<String>, Vec<String>, Vec<String>) {
    let mut classes = Vec::new();
    let mut functions = Vec::new();
    let mut assignments = Vec::new();

    let mut cursor = root.walk();
    for child in root.children(&mut cursor) {
        record_top_level_child(child, source, &mut classes, &mut functions, &mut assignments);
    }
    (classes, functions, assignments)
}

fn record_top_level_child(
    node: Node,
    source: &[u8],
    classes: &mut Vec<String>,
    functions: &mut Vec<String>,
    assignments: &mut Vec<String>,
) {
    match node.kind() {
        "class_definition" => {
            if let Some(name) = name_text(node, source) {
                classes.push(name);
            }
        }
        "function_definition" => {
            if let Some(name) = name_text(node, source) {
                functions.push(name);
            }
        }
        "decorated_definition" => {
            if let Some(def) = node.child_by_field_name("definition") {
                record_top_level_child(def, source, classes, functions, assignments);
            }
        }
        "expression_statement" => {
            let mut cursor = node.walk();
            for inner in node.children(&mut cursor) {
                if inner.kind() == "assignment" {
                    if let Some(left) = inner.child_by_field_name("left") {
                        if left.kind() == "identifier" {
                            if let Ok(text) = left.utf8_text(source) {
                                assignments.push(text.to_string());
                            }
                        }
                    }
                }
            }
        }
        _ => {}
    }
}

fn name_text(node: Node, source: &[u8]) -> Option<String> {
    node.child_by_field_name("name")
        .and_then(|n| n.utf8_text(source).ok())
        .map(str::to_string)
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_fixture(name: &str, source: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(name);
        fs::write(&path, source).unwrap();
        path
    }

    #[test]
    fn under_threshold_file_gets_no_suggestions() {
        let path = write_fixture("test_forge_small.py", "def f():\n    pass\n");
        let suggestions = suggest_splits(&path, 300, 10).unwrap();
        assert!(suggestions.is_empty());
        fs::remove_file(path).ok();
    }

    #[test]
    fn utility_split_fires_for_many_functions_no_classes() {
        let mut source = String::new();
        for i in 0..20 {
            source.push_str(&format!("def helper_{i}():\n    pass\n\n"));
        }
        // Pad past the line threshold.
        source.push_str(&"x = 1\n".repeat(280));
        let path = write_fixture("test_forge_utility.py", &source);

        let suggestions = suggest_splits(&path, 300, 10).unwrap();
        assert!(suggestions
            .iter()
            .any(|s| matches!(s, SplitSuggestion::UtilitySplit { .. })));

        fs::remove_file(path).ok();
    }

    #[test]
    fn function_grouping_fires_for_shared_prefixes() {
        let mut source = String::new();
        for i in 0..6 {
            source.push_str(&format!("def parse_thing_{i}():\n    pass\n\n"));
        }
        for i in 0..6 {
            source.push_str(&format!("def render_thing_{i}():\n    pass\n\n"));
        }
        source.push_str(&"x = 1\n".repeat(280));
        let path = write_fixture("test_forge_function_grouping.py", &source);

        let suggestions = suggest_splits(&path, 300, 10).unwrap();
        assert!(suggestions
            .iter()
            .any(|s| matches!(s, SplitSuggestion::FunctionGrouping { group_count, .. } if *group_count >= 2)));

        fs::remove_file(path).ok();
    }

    #[test]
    fn class_grouping_fires_for_shared_prefixes() {
        let source = format!(
            "{}{}{}",
            "class ParseA:\n    pass\n\nclass ParseB:\n    pass\n\n",
            "class RenderA:\n    pass\n\nclass RenderB:\n    pass\n\n",
            "x = 1\n".repeat(290)
        );
        let path = write_fixture("test_forge_class_grouping.py", &source);

        let suggestions = suggest_splits(&path, 300, 10).unwrap();
        assert!(suggestions
            .iter()
            .any(|s| matches!(s, SplitSuggestion::ClassGrouping { group_count, .. } if *group_count >= 2)));

        fs::remove_file(path).ok();
    }

    #[test]
    fn partition_separates_classes_functions_and_assignments() {
        let source = b"class Foo:\n    pass\n\ndef bar():\n    pass\n\nVERSION = 1\n";
        let mut parser = Parser::new();
        parser.set_language(&tree_sitter_python::LANGUAGE.into()).unwrap();
        let tree = parser.parse(source, None).unwrap();
        let (classes, functions, assignments) = partition_top_level(tree.root_node(), source);

        assert_eq!(classes, vec!["Foo".to_string()]);
        assert_eq!(functions, vec!["bar".to_string()]);
        assert_eq!(assignments, vec!["VERSION".to_string()]);
    }

    #[test]
    fn decorated_function_is_still_partitioned() {
        let source = b"@staticmethod\ndef bar():\n    pass\n";
        let mut parser = Parser::new();
        parser.set_language(&tree_sitter_python::LANGUAGE.into()).unwrap();
        let tree = parser.parse(source, None).unwrap();
        let (_, functions, _) = partition_top_level(tree.root_node(), source);

        assert_eq!(functions, vec!["bar".to_string()]);
    }

    #[test]
    fn short_names_never_group() {
        let names: Vec<String> = vec!["ab".to_string(), "cd".to_string(), "ef".to_string()];
        let groups = greedy_group_by_prefix(&names, 3);
        assert!(groups.iter().all(|g| g.len() == 1));
    }
}
