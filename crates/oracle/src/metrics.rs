//! Per-module size and coupling metrics, and the bounded complexity score.

use anatomist::DependencyGraph;

#[derive(Debug, Clone)]
pub struct ModuleMetrics {
    pub path: String,
    pub line_count: u32,
    pub export_count: usize,
    pub fan_in: usize,
    pub fan_out: usize,
    pub complexity: f64,
}

impl ModuleMetrics {
    /// Computes metrics for every file in `graph`, sorted by path.
    pub fn compute_all(graph: &DependencyGraph) -> Vec<ModuleMetrics> {
        let mut metrics: Vec<ModuleMetrics> = graph
            .files()
            .filter_map(|path| {
                graph.metadata(path).map(|meta| {
                    let fan_in = graph.fan_in(path);
                    let fan_out = graph.fan_out(path);
                    let complexity = 100.0
                        * (0.6 * (meta.line_count as f64 / 1000.0).min(1.0)
                            + 0.4 * ((fan_in + fan_out) as f64 / 20.0).min(1.0));
                    ModuleMetrics {
                        path: path.to_string(),
                        line_count: meta.line_count,
                        export_count: meta.export_count(),
                        fan_in,
                        fan_out,
                        complexity,
                    }
                })
            })
            .collect();
        metrics.sort_by(|a, b| a.path.cmp(&b.path));
        metrics
    }

    /// Files over `threshold` lines, sorted descending by size (ties by path).
    pub fn oversized(metrics: &[ModuleMetrics], threshold: u32) -> Vec<ModuleMetrics> {
        let mut result: Vec<ModuleMetrics> = metrics
            .iter()
            .filter(|m| m.line_count > threshold)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.line_count.cmp(&a.line_count).then_with(|| a.path.cmp(&b.path)));
        result
    }

    /// Files whose `fan_in + fan_out` exceeds `threshold`, sorted descending.
    pub fn highly_coupled(metrics: &[ModuleMetrics], threshold: usize) -> Vec<ModuleMetrics> {
        let mut result: Vec<ModuleMetrics> = metrics
            .iter()
            .filter(|m| m.fan_in + m.fan_out > threshold)
            .cloned()
            .collect();
        result.sort_by(|a, b| {
            (b.fan_in + b.fan_out)
                .cmp(&(a.fan_in + a.fan_out))
                .then_with(|| a.path.cmp(&b.path))
        });
        result
    }
}
