//! # The Anatomist: source parsing, module mapping, and import resolution
//!
//! **Role**: walks a project tree, parses every source file once, and turns
//! raw syntax into the facts the rest of the pipeline needs: import
//! references, exported names, line counts, and a resolved file-level
//! dependency graph.
//!
//! **Core types**:
//! - [`SourceFile`]: cached per-file parse result (imports, exports, line count).
//! - [`ImportReference`]: one resolved-or-not import mention, with its line and kind.
//! - [`ModuleMap`]: bidirectional `module_name <-> file_path` mapping.
//! - [`DependencyGraph`]: the directed multigraph of project files.

pub mod dynamic_imports;
pub mod graph;
pub mod imports;
pub mod module_map;
pub mod parser;
pub mod path_util;
pub mod resolver;

pub use dynamic_imports::{scan_file as scan_dynamic_imports, DynamicImportSite};
pub use graph::DependencyGraph;
pub use imports::ImportReference;
pub use module_map::ModuleMap;
pub use parser::{ParserHost, SourceFile};
pub use resolver::{ImportResolver, Resolution};

/// Import statement flavor. Distinguishes `import foo` (`Direct`) from
/// `from foo import bar` (`From`) — both the module reference itself and
/// each named member it pulls in are recorded as `From`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportKind {
    Direct,
    From,
}

/// Errors produced by the Anatomist crate.
#[derive(Debug, thiserror::Error)]
pub enum AnatomistError {
    #[error("parse failure: {0}")]
    ParseFailure(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("byte range overflow: file size exceeds 4GB limit")]
    ByteRangeOverflow,
}

impl From<common::CommonError> for AnatomistError {
    fn from(e: common::CommonError) -> Self {
        match e {
            common::CommonError::Io(io) => AnatomistError::IoError(io),
            common::CommonError::NonUtf8Path(p) => {
                AnatomistError::ParseFailure(format!("non-UTF-8 path: {p}"))
            }
        }
    }
}
