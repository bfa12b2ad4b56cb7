//! File-level dependency graph: nodes are project source files, edges are
//! resolved import references.
//!
//! Built in one pass, read-only thereafter: downstream diagnostic
//! components (cycle detector, reachability analyzer, metrics) hold `&`,
//! never `&mut`.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use walkdir::WalkDir;

use crate::module_map::ModuleMap;
use crate::parser::{ParserHost, SourceFile};
use crate::resolver::{ImportResolver, Resolution};
use crate::{AnatomistError, ImportKind};

/// Per-node metadata.
#[derive(Debug, Clone)]
pub struct NodeMeta {
    pub path: String,
    pub line_count: u32,
    pub exports: Vec<String>,
}

impl NodeMeta {
    pub fn export_count(&self) -> usize {
        self.exports.len()
    }
}

/// Per-edge metadata: one resolved import reference.
#[derive(Debug, Clone)]
pub struct EdgeMeta {
    pub line: u32,
    pub kind: ImportKind,
    pub symbolic_name: String,
}

/// Directed multigraph of project source files, set once at build time.
pub struct DependencyGraph {
    graph: DiGraph<NodeMeta, EdgeMeta>,
    index_of: HashMap<String, NodeIndex>,
    pub parse_errors: usize,
}

impl DependencyGraph {
    /// Walks `project_root` (skipping `excludes`), parses every `.py` file
    /// through `host`, resolves every import, and builds the graph. Parse
    /// failures are non-fatal: the file is skipped and `parse_errors` is
    /// incremented.
    pub fn build(
        project_root: &Path,
        excludes: &[String],
        host: &mut ParserHost,
    ) -> Result<Self, AnatomistError> {
        let root = PathBuf::from(common::canonicalize_utf8(project_root)?);
        let module_map = ModuleMap::build(&root, excludes)?;

        let mut files: Vec<PathBuf> = WalkDir::new(&root)
            .into_iter()
            .filter_entry(|e| !is_excluded(e.path(), excludes))
            .filter_map(|e| e.ok())
            .map(|e| e.into_path())
            .filter(|p| p.is_file() && p.extension().and_then(|s| s.to_str()) == Some("py"))
            .collect();
        files.sort();

        let mut graph = DiGraph::new();
        let mut index_of = HashMap::new();
        let mut parsed: HashMap<String, SourceFile> = HashMap::new();
        let mut parse_errors = 0usize;

        for path in &files {
            match host.parse_file(path) {
                Ok(source_file) => {
                    let idx = graph.add_node(NodeMeta {
                        path: source_file.path.clone(),
                        line_count: source_file.line_count,
                        exports: source_file.exports.clone(),
                    });
                    index_of.insert(source_file.path.clone(), idx);
                    parsed.insert(source_file.path.clone(), source_file);
                }
                Err(e) => {
                    eprintln!("warning: skipping {}: {e}", path.display());
                    parse_errors += 1;
                }
            }
        }

        let resolver = ImportResolver::new(&module_map, &root);

        for (file_path, source_file) in &parsed {
            let Some(&src_idx) = index_of.get(file_path) else {
                continue;
            };
            for import_ref in &source_file.imports {
                if let Resolution::Project(target_path) =
                    resolver.resolve(&import_ref.symbolic_name, file_path)
                {
                    let Some(&tgt_idx) = index_of.get(&target_path) else {
                        continue;
                    };
                    graph.add_edge(
                        src_idx,
                        tgt_idx,
                        EdgeMeta {
                            line: import_ref.line,
                            kind: import_ref.kind,
                            symbolic_name: import_ref.symbolic_name.clone(),
                        },
                    );
                }
            }
        }

        Ok(Self {
            graph,
            index_of,
            parse_errors,
        })
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn metadata(&self, path: &str) -> Option<&NodeMeta> {
        self.index_of
            .get(path)
            .and_then(|&idx| self.graph.node_weight(idx))
    }

    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.index_of.keys().map(String::as_str)
    }

    /// Distinct outgoing neighbors — parallel edges to the same file (e.g. a
    /// module ref plus member refs from one `from X import a, b`) count once.
    pub fn dependencies(&self, path: &str) -> Vec<&str> {
        self.distinct_neighbors(path, Direction::Outgoing)
    }

    /// Distinct incoming neighbors; see [`Self::dependencies`].
    pub fn dependents(&self, path: &str) -> Vec<&str> {
        self.distinct_neighbors(path, Direction::Incoming)
    }

    fn distinct_neighbors(&self, path: &str, direction: Direction) -> Vec<&str> {
        let Some(&idx) = self.index_of.get(path) else {
            return Vec::new();
        };
        let distinct: HashSet<NodeIndex> =
            self.graph.neighbors_directed(idx, direction).collect();
        distinct
            .into_iter()
            .filter_map(|n| self.graph.node_weight(n))
            .map(|m| m.path.as_str())
            .collect()
    }

    pub fn fan_in(&self, path: &str) -> usize {
        self.dependents(path).len()
    }

    pub fn fan_out(&self, path: &str) -> usize {
        self.dependencies(path).len()
    }

    pub fn roots(&self) -> Vec<&str> {
        self.filter_nodes(|g, idx| g.edges_directed(idx, Direction::Incoming).count() == 0)
    }

    pub fn leaves(&self) -> Vec<&str> {
        self.filter_nodes(|g, idx| g.edges_directed(idx, Direction::Outgoing).count() == 0)
    }

    pub fn isolated(&self) -> Vec<&str> {
        self.filter_nodes(|g, idx| {
            g.edges_directed(idx, Direction::Incoming).count() == 0
                && g.edges_directed(idx, Direction::Outgoing).count() == 0
        })
    }

    fn filter_nodes(&self, pred: impl Fn(&DiGraph<NodeMeta, EdgeMeta>, NodeIndex) -> bool) -> Vec<&str> {
        self.graph
            .node_indices()
            .filter(|&idx| pred(&self.graph, idx))
            .filter_map(|idx| self.graph.node_weight(idx))
            .map(|m| m.path.as_str())
            .collect()
    }

    /// Exposes the underlying petgraph for components (cycle detector,
    /// reachability analyzer) that walk the graph directly.
    pub fn inner(&self) -> &DiGraph<NodeMeta, EdgeMeta> {
        &self.graph
    }

    pub fn index_of(&self, path: &str) -> Option<NodeIndex> {
        self.index_of.get(path).copied()
    }

    pub fn path_at(&self, idx: NodeIndex) -> Option<&str> {
        self.graph.node_weight(idx).map(|m| m.path.as_str())
    }
}

fn is_excluded(path: &Path, excludes: &[String]) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| excludes.iter().any(|e| e == name))
        .unwrap_or(false)
}
