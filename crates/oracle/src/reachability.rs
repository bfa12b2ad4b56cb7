//! Reachability / dead-code analysis.
//!
//! The reachable set is closed under **both** outgoing and incoming edges
//! from the entry points — a module that pulls in an entry point is as
//! "live" as one the entry point pulls in.

use std::collections::{HashSet, VecDeque};

use anatomist::DependencyGraph;
use petgraph::graph::NodeIndex;
use petgraph::Direction;

pub struct ReachabilityReport {
    pub unused_modules: Vec<String>,
    pub unused_exports: Vec<(String, Vec<String>)>,
}

impl ReachabilityReport {
    /// Computes the undirected-closure reachable set from `entry_points` and
    /// derives the unused-module and unused-export findings from it.
    pub fn compute(graph: &DependencyGraph, entry_points: &[String]) -> Self {
        let inner = graph.inner();
        let mut reachable: HashSet<NodeIndex> = HashSet::new();
        let mut queue: VecDeque<NodeIndex> = VecDeque::new();

        for entry in entry_points {
            if let Some(idx) = graph.index_of(entry) {
                if reachable.insert(idx) {
                    queue.push_back(idx);
                }
            }
        }

        while let Some(node) = queue.pop_front() {
            for direction in [Direction::Outgoing, Direction::Incoming] {
                for neighbor in inner.neighbors_directed(node, direction) {
                    if reachable.insert(neighbor) {
                        queue.push_back(neighbor);
                    }
                }
            }
        }

        let mut unused_modules: Vec<String> = inner
            .node_indices()
            .filter(|idx| !reachable.contains(idx))
            .filter_map(|idx| graph.path_at(idx))
            .map(str::to_string)
            .collect();
        unused_modules.sort();

        let entry_set: HashSet<&str> = entry_points.iter().map(String::as_str).collect();
        let mut unused_exports: Vec<(String, Vec<String>)> = graph
            .files()
            .filter(|path| graph.fan_in(path) == 0 && !entry_set.contains(path))
            .filter_map(|path| {
                graph
                    .metadata(path)
                    .map(|meta| (path.to_string(), meta.exports.clone()))
            })
            .filter(|(_, exports)| !exports.is_empty())
            .collect();
        unused_exports.sort_by(|a, b| a.0.cmp(&b.0));

        Self {
            unused_modules,
            unused_exports,
        }
    }
}

/// Determines entry points when none are given explicitly: files whose stem
/// looks like an entry point (§3), else graph roots, else every file.
pub fn discover_entry_points(graph: &DependencyGraph) -> Vec<String> {
    let mut by_stem: Vec<String> = graph
        .files()
        .filter(|path| {
            std::path::Path::new(path)
                .file_stem()
                .and_then(|s| s.to_str())
                .map(common::looks_like_entry_point)
                .unwrap_or(false)
        })
        .map(str::to_string)
        .collect();
    if !by_stem.is_empty() {
        by_stem.sort();
        return by_stem;
    }

    let mut roots: Vec<String> = graph.roots().into_iter().map(str::to_string).collect();
    if !roots.is_empty() {
        roots.sort();
        return roots;
    }

    let mut all: Vec<String> = graph.files().map(str::to_string).collect();
    all.sort();
    all
}
