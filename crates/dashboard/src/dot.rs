//! Graphviz DOT graph description, plus the optional external `dot` render.

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::process::Command;

use anatomist::DependencyGraph;
use oracle::Cycle;

use crate::DashboardError;

/// Sanitizes a canonical path into a valid Graphviz node identifier:
/// every byte outside `[A-Za-z0-9_]` becomes `_`, truncated to 50 chars.
pub fn sanitize_node_id(path: &str) -> String {
    path.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .take(50)
        .collect()
}

/// Builds the set of canonical paths appearing in any cycle, for edge/node
/// highlighting.
pub fn cycle_node_set(cycles: &[Cycle]) -> HashSet<String> {
    cycles
        .iter()
        .flat_map(|c| c.nodes.iter().cloned())
        .collect()
}

/// Renders `graph` as a `digraph` description. In-cycle nodes are colored
/// red/bold (takes priority over the oversized coloring); oversized nodes
/// (over `oversized_threshold` lines) are colored orange. Edges between two
/// in-cycle nodes are bold red, otherwise gray.
pub fn render_dot(graph: &DependencyGraph, cycle_nodes: &HashSet<String>, oversized_threshold: u32) -> String {
    let mut out = String::from("digraph G {\n");

    let mut paths: Vec<String> = graph.files().map(str::to_string).collect();
    paths.sort();

    for path in &paths {
        let Some(meta) = graph.metadata(path) else {
            continue;
        };
        let id = sanitize_node_id(path);
        let label = escape_label(&format!("{path} ({} lines)", meta.line_count));
        let style = if cycle_nodes.contains(path) {
            "color=red, style=bold"
        } else if meta.line_count > oversized_threshold {
            "color=orange"
        } else {
            "color=black"
        };
        out.push_str(&format!("  {id} [label=\"{label}\", {style}];\n"));
    }

    for path in &paths {
        let mut targets: Vec<String> = graph.dependencies(path).into_iter().map(str::to_string).collect();
        targets.sort();
        for target in targets {
            let both_in_cycle = cycle_nodes.contains(path) && cycle_nodes.contains(&target);
            let style = if both_in_cycle { "color=red, style=bold" } else { "color=gray" };
            out.push_str(&format!(
                "  {} -> {} [{style}];\n",
                sanitize_node_id(path),
                sanitize_node_id(&target)
            ));
        }
    }

    out.push_str("}\n");
    out
}

fn escape_label(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Writes the textual `.dot` source to `path`. A failure here is fatal to
/// the run (propagated to the CLI), unlike renderer invocation.
pub fn write_dot_file(dot_source: &str, path: &Path) -> Result<(), DashboardError> {
    fs::write(path, dot_source)?;
    Ok(())
}

/// Invokes the external `dot` binary to render `dot_path` into `format`
/// (png/svg/pdf) alongside it. Never fails the run: on renderer absence or
/// failure, the textual `.dot` file is kept and a warning is printed.
pub fn invoke_renderer(dot_path: &Path, format: &str) {
    if format == "dot" {
        return;
    }

    let output_path = dot_path.with_extension(format);
    let result = Command::new("dot")
        .arg(format!("-T{format}"))
        .arg(dot_path)
        .arg("-o")
        .arg(&output_path)
        .output();

    match result {
        Ok(output) if output.status.success() => {}
        Ok(output) => {
            eprintln!(
                "warning: dot renderer exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr)
            );
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            eprintln!("warning: `dot` renderer not found on PATH; keeping textual .dot file");
        }
        Err(e) => {
            eprintln!("warning: failed to invoke `dot` renderer: {e}");
        }
    }
}
