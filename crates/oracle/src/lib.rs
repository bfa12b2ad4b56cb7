//! # The Oracle: cycle detection, reachability, and module metrics
//!
//! Pure analysis passes over an already-built [`anatomist::DependencyGraph`].
//! The graph is final by the time these run, so nothing here mutates it or
//! touches the filesystem — and nothing here fails.

pub mod cycles;
pub mod metrics;
pub mod reachability;

pub use cycles::{Cycle, CycleDetector};
pub use metrics::ModuleMetrics;
pub use reachability::{discover_entry_points, ReachabilityReport};
