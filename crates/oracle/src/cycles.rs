//! Circular import detection.
//!
//! Single-pass DFS with a global `visited` set and a per-branch `on_stack`
//! set: when the walk meets a node already on the current stack, the path is
//! sliced from that node forward and closed into a cycle. Each cycle is
//! canonicalized (rotated so its lexicographically smallest node leads) and
//! deduplicated by the **set** of participating nodes, not the edge set —
//! two cycles over the same files via different edges count once.

use std::collections::HashSet;

use anatomist::DependencyGraph;
use petgraph::graph::NodeIndex;
use petgraph::Direction;

/// One detected circular import chain, in traversal order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cycle {
    pub nodes: Vec<String>,
}

impl Cycle {
    /// Renders as `"a.py -> b.py -> c.py -> ..."`, with paths relative to
    /// `root` when given.
    pub fn format(&self, root: Option<&std::path::Path>) -> String {
        let rendered: Vec<String> = self.nodes.iter().map(|p| relativize(p, root)).collect();
        format!("{} -> ...", rendered.join(" -> "))
    }
}

fn relativize(path: &str, root: Option<&std::path::Path>) -> String {
    let Some(root) = root else {
        return path.to_string();
    };
    let root_str = root.to_string_lossy().replace('\\', "/");
    path.strip_prefix(root_str.as_ref())
        .map(|p| p.trim_start_matches('/').to_string())
        .unwrap_or_else(|| path.to_string())
}

pub struct CycleDetector;

impl CycleDetector {
    /// Enumerates cycles reachable via a single forward DFS over `graph`,
    /// starting from nodes in path order so results are deterministic.
    pub fn detect(graph: &DependencyGraph) -> Vec<Cycle> {
        let inner = graph.inner();
        let mut start_nodes: Vec<NodeIndex> = inner.node_indices().collect();
        start_nodes.sort_by_key(|&idx| graph.path_at(idx).unwrap_or("").to_string());

        let mut visited: HashSet<NodeIndex> = HashSet::new();
        let mut on_stack: HashSet<NodeIndex> = HashSet::new();
        let mut path: Vec<NodeIndex> = Vec::new();
        let mut seen_vertex_sets: HashSet<Vec<String>> = HashSet::new();
        let mut cycles = Vec::new();

        for start in start_nodes {
            if !visited.contains(&start) {
                Self::dfs(
                    graph,
                    start,
                    &mut path,
                    &mut visited,
                    &mut on_stack,
                    &mut seen_vertex_sets,
                    &mut cycles,
                );
            }
        }

        cycles
    }

    pub fn has_cycles(graph: &DependencyGraph) -> bool {
        !Self::detect(graph).is_empty()
    }

    #[allow(clippy::too_many_arguments)]
    fn dfs(
        graph: &DependencyGraph,
        node: NodeIndex,
        path: &mut Vec<NodeIndex>,
        visited: &mut HashSet<NodeIndex>,
        on_stack: &mut HashSet<NodeIndex>,
        seen_vertex_sets: &mut HashSet<Vec<String>>,
        cycles: &mut Vec<Cycle>,
    ) {
        visited.insert(node);
        on_stack.insert(node);
        path.push(node);

        let mut neighbors: Vec<NodeIndex> = graph
            .inner()
            .neighbors_directed(node, Direction::Outgoing)
            .collect();
        neighbors.sort_by_key(|&idx| graph.path_at(idx).unwrap_or("").to_string());

        for neighbor in neighbors {
            if on_stack.contains(&neighbor) {
                if let Some(pos) = path.iter().position(|&n| n == neighbor) {
                    let cycle_nodes: Vec<String> = path[pos..]
                        .iter()
                        .filter_map(|&idx| graph.path_at(idx))
                        .map(str::to_string)
                        .collect();
                    let canonical = canonicalize(&cycle_nodes);
                    if seen_vertex_sets.insert(vertex_set_key(&canonical)) {
                        cycles.push(Cycle { nodes: canonical });
                    }
                }
            } else if !visited.contains(&neighbor) {
                Self::dfs(graph, neighbor, path, visited, on_stack, seen_vertex_sets, cycles);
            }
        }

        path.pop();
        on_stack.remove(&node);
    }
}

fn canonicalize(nodes: &[String]) -> Vec<String> {
    let min_pos = nodes
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.cmp(b))
        .map(|(i, _)| i)
        .unwrap_or(0);
    let mut rotated = nodes[min_pos..].to_vec();
    rotated.extend_from_slice(&nodes[..min_pos]);
    rotated
}

fn vertex_set_key(nodes: &[String]) -> Vec<String> {
    let mut sorted = nodes.to_vec();
    sorted.sort();
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn build_graph(tmp: &std::path::Path) -> DependencyGraph {
        let mut host = anatomist::ParserHost::new().unwrap();
        DependencyGraph::build(tmp, &[], &mut host).unwrap()
    }

    #[test]
    fn no_cycle_in_acyclic_graph() {
        let tmp = std::env::temp_dir().join("test_cycles_acyclic");
        fs::create_dir_all(&tmp).ok();
        fs::write(tmp.join("a.py"), "import b\n").ok();
        fs::write(tmp.join("b.py"), "").ok();

        let graph = build_graph(&tmp);
        assert!(!CycleDetector::has_cycles(&graph));

        fs::remove_dir_all(tmp).ok();
    }

    #[test]
    fn detects_two_file_cycle() {
        let tmp = std::env::temp_dir().join("test_cycles_two_file");
        fs::create_dir_all(&tmp).ok();
        fs::write(tmp.join("a.py"), "import b\n").ok();
        fs::write(tmp.join("b.py"), "import a\n").ok();

        let graph = build_graph(&tmp);
        let cycles = CycleDetector::detect(&graph);
        assert!(!cycles.is_empty());
        assert_eq!(cycles[0].nodes.len(), 2);

        fs::remove_dir_all(tmp).ok();
    }

    #[test]
    fn detects_self_import_as_length_one_cycle() {
        let tmp = std::env::temp_dir().join("test_cycles_self_import");
        fs::create_dir_all(&tmp).ok();
        fs::write(tmp.join("a.py"), "import a\n").ok();

        let graph = build_graph(&tmp);
        let cycles = CycleDetector::detect(&graph);
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].nodes.len(), 1);

        fs::remove_dir_all(tmp).ok();
    }

    #[test]
    fn dedupes_cycle_by_vertex_set() {
        let tmp = std::env::temp_dir().join("test_cycles_dedup");
        fs::create_dir_all(&tmp).ok();
        // Two import statements between the same pair of files still form
        // one cycle by vertex set, despite multiple edges.
        fs::write(tmp.join("a.py"), "import b\nfrom b import thing\n").ok();
        fs::write(tmp.join("b.py"), "import a\n").ok();

        let graph = build_graph(&tmp);
        let cycles = CycleDetector::detect(&graph);
        assert_eq!(cycles.len(), 1);

        fs::remove_dir_all(tmp).ok();
    }
}
