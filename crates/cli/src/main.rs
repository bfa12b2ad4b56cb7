//! Command-line front end for the dependency-graph analyzer.
//!
//! Wires the five diagnostic passes (`oracle`, `forge`) and the two
//! reporters (`dashboard`) around a single [`anatomist::DependencyGraph`]
//! build. No diagnostic logic lives here — this binary only parses flags,
//! drives the pipeline in stage order, and formats the sections it prints.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;

use anatomist::{DependencyGraph, ParserHost};
use dashboard::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_WIDTH};
use forge::SplitSuggestion;
use oracle::{discover_entry_points, Cycle, CycleDetector, ModuleMetrics, ReachabilityReport};

const DEFAULT_OVERSIZED_THRESHOLD: u32 = 500;

/// Cap on per-line findings shown for cycles/dead-modules/oversized-modules
/// before collapsing the rest into a "... and N more" line.
const REPORT_LIST_CAP: usize = 10;

/// Cap on per-file groups shown for split suggestions/dynamic-import sites.
const FILE_GROUP_CAP: usize = 5;

/// Analyzes a directory tree of Python sources and reports on its
/// module-level dependency graph: circular imports, dead modules, oversized
/// modules, split suggestions, and dynamic-import sites.
#[derive(Parser)]
#[command(name = "cartographer", version, about, long_about = None)]
struct Cli {
    /// Root directory of the project to analyze.
    project_path: PathBuf,

    /// Directory basenames to skip, in addition to the built-in defaults
    /// (__pycache__, .git, venv, node_modules, ...).
    #[arg(long, num_args = 1.., value_name = "DIR")]
    exclude: Vec<String>,

    /// Print an indented ASCII dependency tree.
    #[arg(long)]
    ascii: bool,

    /// Write a Graphviz DOT graph description to this path.
    #[arg(long, value_name = "FILE")]
    graphviz: Option<PathBuf>,

    /// Output format for --graphviz: dot, png, svg, or pdf. Non-dot formats
    /// are rendered with the external `dot` binary if it is on PATH.
    #[arg(long, default_value = "dot", value_name = "dot|png|svg|pdf")]
    format: String,

    /// Print node/edge/root/leaf counts. Printed by default when no other
    /// diagnostic flag is given.
    #[arg(long)]
    summary: bool,

    /// Report circular import chains.
    #[arg(long)]
    cycles: bool,

    /// Report modules unreachable from any entry point, and unused exports.
    #[arg(long = "dead-code")]
    dead_code: bool,

    /// Report modules exceeding N lines (default 500).
    #[arg(long, value_name = "N")]
    oversized: Option<u32>,

    /// Suggest how oversized modules could be split.
    #[arg(long = "suggest-splits")]
    suggest_splits: bool,

    /// Report runtime-dispatched import, eval, exec, and compile call sites.
    #[arg(long = "dynamic-imports")]
    dynamic_imports: bool,

    /// Accepted for CLI-surface compatibility; highlighting is always on
    /// and cannot be turned off, matching the original's own `store_true,
    /// default=True` flags (there's no negating flag either).
    #[arg(long = "highlight-cycles")]
    #[allow(dead_code)]
    highlight_cycles: bool,

    /// See `--highlight-cycles`.
    #[arg(long = "highlight-oversized")]
    #[allow(dead_code)]
    highlight_oversized: bool,

    /// Maximum depth of the ASCII tree (default 3).
    #[arg(long = "max-depth", value_name = "D")]
    max_depth: Option<usize>,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("project path does not exist or is not a directory: {0}")]
    InvalidProjectPath(PathBuf),
    #[error("unrecognized --format '{0}' (expected dot, png, svg, or pdf)")]
    UnknownFormat(String),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if !cli.project_path.is_dir() {
        // Spec: invalid project path is fatal, reported to stderr, exit 1 —
        // not routed through anyhow's `Error: ...` wrapper.
        eprintln!("error: {}", CliError::InvalidProjectPath(cli.project_path.clone()));
        std::process::exit(1);
    }

    if !matches!(cli.format.as_str(), "dot" | "png" | "svg" | "pdf") {
        eprintln!("error: {}", CliError::UnknownFormat(cli.format.clone()));
        std::process::exit(1);
    }

    let canonical_root = PathBuf::from(
        common::canonicalize_utf8(&cli.project_path)
            .context("failed to canonicalize project path")?,
    );

    let mut excludes: Vec<String> = common::DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect();
    for dir in &cli.exclude {
        if !excludes.contains(dir) {
            excludes.push(dir.clone());
        }
    }

    println!("[1/4] Parsing project files under {}...", canonical_root.display());
    let mut host = ParserHost::new().context("failed to initialize the Python parser")?;

    println!("[2/4] Building dependency graph...");
    let graph = DependencyGraph::build(&canonical_root, &excludes, &mut host)
        .context("failed to build the dependency graph")?;

    println!("[3/4] Running diagnostic passes...");
    let cycles = CycleDetector::detect(&graph);
    let metrics = ModuleMetrics::compute_all(&graph);
    let oversized_threshold = cli.oversized.unwrap_or(DEFAULT_OVERSIZED_THRESHOLD);

    println!("[4/4] Generating reports...\n");

    let mut printed_a_section = false;

    if cli.cycles {
        printed_a_section = true;
        print_cycles_section(&cycles, &canonical_root);
    }

    if cli.dead_code {
        printed_a_section = true;
        let entry_points = discover_entry_points(&graph);
        let report = ReachabilityReport::compute(&graph, &entry_points);
        print_dead_code_section(&report, &canonical_root);
    }

    if cli.oversized.is_some() {
        printed_a_section = true;
        print_oversized_section(&metrics, oversized_threshold, &canonical_root);
    }

    if cli.suggest_splits {
        printed_a_section = true;
        print_suggest_splits_section(&graph, &canonical_root);
    }

    if cli.dynamic_imports {
        printed_a_section = true;
        print_dynamic_imports_section(&graph, &canonical_root);
    }

    if cli.ascii {
        printed_a_section = true;
        let max_depth = cli.max_depth.unwrap_or(DEFAULT_MAX_DEPTH);
        println!("ASCII dependency tree:\n");
        println!(
            "{}",
            dashboard::render_ascii_tree(&graph, max_depth, DEFAULT_MAX_WIDTH, Some(&canonical_root))
        );
    }

    if let Some(dot_path) = &cli.graphviz {
        printed_a_section = true;
        write_graphviz_report(&graph, &cycles, oversized_threshold, &cli, dot_path)?;
    }

    if cli.summary || !printed_a_section {
        print_summary_section(&graph);
    }

    Ok(())
}

fn relativize(path: &str, root: &Path) -> String {
    let root_str = root.to_string_lossy().replace('\\', "/");
    path.strip_prefix(root_str.as_str())
        .map(|p| p.trim_start_matches('/').to_string())
        .unwrap_or_else(|| path.to_string())
}

fn print_cycles_section(cycles: &[Cycle], root: &Path) {
    if cycles.is_empty() {
        println!("✓ No circular imports detected.\n");
        return;
    }
    println!("⚠️  Found {} circular import chain(s):", cycles.len());
    for (i, cycle) in cycles.iter().take(REPORT_LIST_CAP).enumerate() {
        println!("  Cycle {}: {}", i + 1, cycle.format(Some(root)));
    }
    if cycles.len() > REPORT_LIST_CAP {
        println!("  ... and {} more", cycles.len() - REPORT_LIST_CAP);
    }
    println!();
}

fn print_dead_code_section(report: &ReachabilityReport, root: &Path) {
    if report.unused_modules.is_empty() {
        println!("✓ No dead modules detected.\n");
    } else {
        println!("⚠️  Found {} unused module(s):", report.unused_modules.len());
        for path in report.unused_modules.iter().take(REPORT_LIST_CAP) {
            println!("  {}", relativize(path, root));
        }
        if report.unused_modules.len() > REPORT_LIST_CAP {
            println!("  ... and {} more", report.unused_modules.len() - REPORT_LIST_CAP);
        }
        println!();
    }

    if report.unused_exports.is_empty() {
        println!("✓ No unused exports detected.\n");
        return;
    }

    let total: usize = report.unused_exports.iter().map(|(_, exports)| exports.len()).sum();
    println!(
        "⚠️  Found {} unused export(s) across {} file(s):",
        total,
        report.unused_exports.len()
    );
    for (path, exports) in &report.unused_exports {
        println!("  {}: {}", relativize(path, root), exports.join(", "));
    }
    println!();
}

fn print_oversized_section(metrics: &[ModuleMetrics], threshold: u32, root: &Path) {
    let oversized = ModuleMetrics::oversized(metrics, threshold);
    if oversized.is_empty() {
        println!("✓ No modules exceed {threshold} lines.\n");
        return;
    }
    println!("⚠️  Found {} module(s) exceeding {threshold} lines:", oversized.len());
    for m in oversized.iter().take(REPORT_LIST_CAP) {
        println!("  {} ({} lines)", relativize(&m.path, root), m.line_count);
    }
    if oversized.len() > REPORT_LIST_CAP {
        println!("  ... and {} more", oversized.len() - REPORT_LIST_CAP);
    }
    println!();
}

fn print_suggest_splits_section(graph: &DependencyGraph, root: &Path) {
    let mut paths: Vec<&str> = graph.files().collect();
    paths.sort();

    let mut flagged: Vec<(&str, Vec<SplitSuggestion>)> = Vec::new();
    for path in paths {
        let suggestions = match forge::suggest_splits(
            Path::new(path),
            forge::DEFAULT_MIN_LINES,
            forge::DEFAULT_MIN_FUNCTIONS,
        ) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("warning: split analysis skipped for {path}: {e}");
                continue;
            }
        };
        if !suggestions.is_empty() {
            flagged.push((path, suggestions));
        }
    }

    if flagged.is_empty() {
        println!("✓ No split suggestions.\n");
        return;
    }

    for (path, suggestions) in flagged.iter().take(FILE_GROUP_CAP) {
        println!("💡 {}:", relativize(path, root));
        for suggestion in suggestions {
            let (tag, reason, recommendation) = match suggestion {
                SplitSuggestion::ClassGrouping { reason, recommendation, .. } => {
                    ("class_grouping", reason, recommendation)
                }
                SplitSuggestion::FunctionGrouping { reason, recommendation, .. } => {
                    ("function_grouping", reason, recommendation)
                }
                SplitSuggestion::UtilitySplit { reason, recommendation } => {
                    ("utility_split", reason, recommendation)
                }
            };
            println!("  {tag}: {reason} — {recommendation}");
        }
    }
    if flagged.len() > FILE_GROUP_CAP {
        println!("  ... and {} more file(s) with suggestions", flagged.len() - FILE_GROUP_CAP);
    }
    println!();
}

fn print_dynamic_imports_section(graph: &DependencyGraph, root: &Path) {
    let mut paths: Vec<&str> = graph.files().collect();
    paths.sort();

    let mut flagged: Vec<(&str, Vec<anatomist::DynamicImportSite>)> = Vec::new();
    for path in paths {
        let sites = match anatomist::scan_dynamic_imports(Path::new(path)) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("warning: dynamic-import scan skipped for {path}: {e}");
                continue;
            }
        };
        if !sites.is_empty() {
            flagged.push((path, sites));
        }
    }

    if flagged.is_empty() {
        println!("✓ No dynamic-import sites detected.\n");
        return;
    }

    println!("⚠️  Dynamic-import sites:");
    for (path, sites) in flagged.iter().take(FILE_GROUP_CAP) {
        for site in sites {
            println!(
                "  {}:{} {} ({})",
                relativize(path, root),
                site.line,
                site.pattern,
                site.rationale
            );
        }
    }
    if flagged.len() > FILE_GROUP_CAP {
        println!("  ... and {} more file(s) with dynamic-import sites", flagged.len() - FILE_GROUP_CAP);
    }
    println!();
}

fn write_graphviz_report(
    graph: &DependencyGraph,
    cycles: &[Cycle],
    oversized_threshold: u32,
    cli: &Cli,
    dot_path: &Path,
) -> anyhow::Result<()> {
    // Cycle and oversized-module highlighting is unconditional, matching
    // the original's `export_graphviz(..., highlight_cycles=True,
    // highlight_oversized=True)` — there is no flag that turns it off.
    let cycle_nodes = dashboard::cycle_node_set(cycles);
    let dot_source = dashboard::render_dot(graph, &cycle_nodes, oversized_threshold);
    dashboard::write_dot_file(&dot_source, dot_path)
        .with_context(|| format!("failed to write graph description to {}", dot_path.display()))?;
    println!("Wrote graph description to {}", dot_path.display());

    if cli.format != "dot" {
        dashboard::invoke_renderer(dot_path, &cli.format);
    }

    Ok(())
}

fn print_summary_section(graph: &DependencyGraph) {
    println!(
        "Summary: {} node(s), {} edge(s), {} root(s), {} leaf(ves), {} isolated",
        graph.node_count(),
        graph.edge_count(),
        graph.roots().len(),
        graph.leaves().len(),
        graph.isolated().len()
    );
}
