//! Shared primitives used across the analysis pipeline: canonical path
//! handling and the hardcoded tables (excluded directories, entry-point
//! heuristics, stdlib module names) every component needs a copy of.

use std::path::Path;

/// Errors shared across crate boundaries that don't need a richer local enum.
#[derive(Debug, thiserror::Error)]
pub enum CommonError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("non-UTF-8 path: {0}")]
    NonUtf8Path(String),
}

/// Canonicalizes `path` and returns it as a forward-slash-normalized UTF-8
/// string. Every path that enters the parser, module map, or graph goes
/// through this so all downstream code can assume canonical absolute form.
pub fn canonicalize_utf8(path: &Path) -> Result<String, CommonError> {
    let canonical = dunce::canonicalize(path)?;
    let s = canonical
        .to_str()
        .ok_or_else(|| CommonError::NonUtf8Path(canonical.display().to_string()))?;
    Ok(s.replace('\\', "/"))
}

/// Directory basenames skipped during project traversal unless overridden
/// by `--exclude`.
pub const DEFAULT_EXCLUDES: &[&str] = &[
    "__pycache__",
    ".git",
    ".hg",
    ".svn",
    "venv",
    ".venv",
    "env",
    ".tox",
    "node_modules",
    ".mypy_cache",
    ".pytest_cache",
    "target",
    "dist",
    "build",
    "site-packages",
    ".idea",
    ".vscode",
];

/// File basename stems (extension stripped) treated as canonical program
/// entry points during entry-point discovery.
const ENTRY_POINT_STEMS: &[&str] =
    &["main", "run", "app", "cli", "__main__", "manage", "wsgi", "asgi"];

/// Returns `true` if `stem` (a file's basename without extension) should be
/// treated as a program entry point for reachability analysis.
pub fn looks_like_entry_point(stem: &str) -> bool {
    let lower = stem.to_ascii_lowercase();
    ENTRY_POINT_STEMS.contains(&lower.as_str())
        || lower.contains("main")
        || lower.contains("entry")
        || lower.contains("start")
}

/// Top-level standard-library module names. An absolute import whose first
/// dotted segment appears here is classified external without consulting
/// the module map or probing the filesystem.
pub const STDLIB_MODULES: &[&str] = &[
    "abc", "argparse", "array", "asyncio", "base64", "bisect", "builtins", "collections",
    "concurrent", "configparser", "contextlib", "copy", "csv", "ctypes", "dataclasses",
    "datetime", "decimal", "difflib", "dis", "email", "enum", "errno", "functools", "gc",
    "getpass", "glob", "gzip", "hashlib", "heapq", "hmac", "html", "http", "importlib",
    "inspect", "io", "ipaddress", "itertools", "json", "keyword", "logging", "math",
    "mimetypes", "multiprocessing", "numbers", "operator", "os", "pathlib", "pickle",
    "platform", "pprint", "queue", "random", "re", "sched", "secrets", "select", "shelve",
    "shlex", "shutil", "signal", "site", "socket", "socketserver", "sqlite3", "ssl", "stat",
    "string", "struct", "subprocess", "sys", "sysconfig", "tempfile", "textwrap", "threading",
    "time", "timeit", "tkinter", "token", "tokenize", "traceback", "tracemalloc", "types",
    "typing", "unicodedata", "unittest", "urllib", "uuid", "venv", "warnings", "weakref",
    "xml", "xmlrpc", "zipfile", "zlib", "zoneinfo",
];

/// `true` if `top_level_segment` (the first dotted component of an import
/// name) names a standard-library module.
pub fn is_stdlib_module(top_level_segment: &str) -> bool {
    STDLIB_MODULES.contains(&top_level_segment)
}
