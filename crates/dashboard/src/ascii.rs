//! Indented ASCII tree reporter.

use std::collections::HashSet;
use std::path::Path;

use anatomist::DependencyGraph;

/// Renders `graph` as an indented tree, one subtree per root (sorted),
/// depth-bounded by `max_depth`, lines clipped to `max_width`. Each node is
/// printed at most once across the whole map; isolated modules (no
/// dependents or dependencies) are listed in a trailing section.
pub fn render_ascii_tree(
    graph: &DependencyGraph,
    max_depth: usize,
    max_width: usize,
    root: Option<&Path>,
) -> String {
    let mut output = String::new();
    let mut printed: HashSet<String> = HashSet::new();

    let mut roots: Vec<String> = graph.roots().into_iter().map(str::to_string).collect();
    roots.sort();

    for path in &roots {
        render_node(graph, path, 0, max_depth, max_width, "", true, true, root, &mut printed, &mut output);
    }

    let mut isolated: Vec<String> = graph.isolated().into_iter().map(str::to_string).collect();
    if !isolated.is_empty() {
        isolated.sort();
        output.push_str("\nIsolated modules:\n");
        for path in &isolated {
            let line = format!("  {}", relativize(path, root));
            output.push_str(&clip_line(&line, max_width));
            output.push('\n');
        }
    }

    output
}

#[allow(clippy::too_many_arguments)]
fn render_node(
    graph: &DependencyGraph,
    path: &str,
    depth: usize,
    max_depth: usize,
    max_width: usize,
    prefix: &str,
    is_last: bool,
    is_root: bool,
    root: Option<&Path>,
    printed: &mut HashSet<String>,
    output: &mut String,
) {
    let already_shown = !printed.insert(path.to_string());
    if already_shown {
        return;
    }

    let connector = if is_root {
        ""
    } else if is_last {
        "└── "
    } else {
        "├── "
    };
    let line = format!("{prefix}{connector}{}", node_label(graph, path, root));
    output.push_str(&clip_line(&line, max_width));
    output.push('\n');

    if depth >= max_depth {
        return;
    }

    let mut children: Vec<String> = graph.dependencies(path).into_iter().map(str::to_string).collect();
    children.sort();

    let child_prefix = if is_root {
        String::new()
    } else {
        format!("{prefix}{}", if is_last { "    " } else { "│   " })
    };

    let count = children.len();
    for (i, child) in children.iter().enumerate() {
        render_node(
            graph,
            child,
            depth + 1,
            max_depth,
            max_width,
            &child_prefix,
            i + 1 == count,
            false,
            root,
            printed,
            output,
        );
    }
}

fn node_label(graph: &DependencyGraph, path: &str, root: Option<&Path>) -> String {
    match graph.metadata(path) {
        Some(meta) => format!("{} ({} lines)", relativize(path, root), meta.line_count),
        None => relativize(path, root),
    }
}

fn relativize(path: &str, root: Option<&Path>) -> String {
    let Some(root) = root else {
        return path.to_string();
    };
    let root_str = root.to_string_lossy().replace('\\', "/");
    path.strip_prefix(root_str.as_ref())
        .map(|p| p.trim_start_matches('/').to_string())
        .unwrap_or_else(|| path.to_string())
}

fn clip_line(line: &str, max_width: usize) -> String {
    if line.chars().count() <= max_width {
        return line.to_string();
    }
    let truncated: String = line.chars().take(max_width.saturating_sub(3)).collect();
    format!("{truncated}...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn build_graph(tmp: &Path) -> DependencyGraph {
        let mut host = anatomist::ParserHost::new().unwrap();
        DependencyGraph::build(tmp, &[], &mut host).unwrap()
    }

    #[test]
    fn renders_single_root_with_no_children() {
        let tmp = std::env::temp_dir().join("test_ascii_single_root");
        fs::create_dir_all(&tmp).ok();
        fs::write(tmp.join("main.py"), "").ok();

        let graph = build_graph(&tmp);
        let tree = render_ascii_tree(&graph, 3, 80, Some(&tmp));
        assert!(tree.contains("main.py"));

        fs::remove_dir_all(tmp).ok();
    }

    #[test]
    fn depth_bound_stops_descent() {
        let tmp = std::env::temp_dir().join("test_ascii_depth_bound");
        fs::create_dir_all(&tmp).ok();
        fs::write(tmp.join("a.py"), "import b\n").ok();
        fs::write(tmp.join("b.py"), "import c\n").ok();
        fs::write(tmp.join("c.py"), "").ok();

        let graph = build_graph(&tmp);
        let tree = render_ascii_tree(&graph, 1, 80, Some(&tmp));
        assert!(tree.contains("a.py"));
        assert!(tree.contains("b.py"));
        assert!(!tree.contains("c.py"));

        fs::remove_dir_all(tmp).ok();
    }

    #[test]
    fn each_node_printed_once() {
        let tmp = std::env::temp_dir().join("test_ascii_printed_once");
        fs::create_dir_all(&tmp).ok();
        fs::write(tmp.join("a.py"), "import shared\n").ok();
        fs::write(tmp.join("b.py"), "import shared\n").ok();
        fs::write(tmp.join("shared.py"), "").ok();

        let graph = build_graph(&tmp);
        let tree = render_ascii_tree(&graph, 3, 80, Some(&tmp));
        assert_eq!(tree.matches("shared.py").count(), 1);

        fs::remove_dir_all(tmp).ok();
    }

    #[test]
    fn diamond_within_single_root_prints_shared_dep_once() {
        let tmp = std::env::temp_dir().join("test_ascii_diamond_single_root");
        fs::create_dir_all(&tmp).ok();
        fs::write(tmp.join("main.py"), "import left\nimport right\n").ok();
        fs::write(tmp.join("left.py"), "import shared\n").ok();
        fs::write(tmp.join("right.py"), "import shared\n").ok();
        fs::write(tmp.join("shared.py"), "").ok();

        let graph = build_graph(&tmp);
        let tree = render_ascii_tree(&graph, 3, 80, Some(&tmp));
        assert_eq!(tree.matches("shared.py").count(), 1);

        fs::remove_dir_all(tmp).ok();
    }

    #[test]
    fn isolated_module_listed_in_trailing_section() {
        let tmp = std::env::temp_dir().join("test_ascii_isolated");
        fs::create_dir_all(&tmp).ok();
        fs::write(tmp.join("lonely.py"), "x = 1\n").ok();

        let graph = build_graph(&tmp);
        let tree = render_ascii_tree(&graph, 3, 80, Some(&tmp));
        assert!(tree.contains("Isolated modules:"));
        assert!(tree.contains("lonely.py"));

        fs::remove_dir_all(tmp).ok();
    }

    #[test]
    fn long_line_is_clipped_with_ellipsis() {
        let line = "x".repeat(100);
        let clipped = clip_line(&line, 20);
        assert_eq!(clipped.chars().count(), 20);
        assert!(clipped.ends_with("..."));
    }
}
