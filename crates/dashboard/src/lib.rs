//! # The Dashboard: ASCII tree and Graphviz DOT reporters
//!
//! Renders an already-built [`anatomist::DependencyGraph`] (plus the
//! [`oracle`] findings layered on top of it) as static text: no TUI, no
//! interactivity — the corpus's `ratatui`/`crossterm` dashboard is replaced
//! with the two report formats this tool actually needs.

pub mod ascii;
pub mod dot;

pub use ascii::render_ascii_tree;
pub use dot::{cycle_node_set, invoke_renderer, render_dot, sanitize_node_id, write_dot_file};

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub const DEFAULT_MAX_DEPTH: usize = 3;
pub const DEFAULT_MAX_WIDTH: usize = 80;
