//! Bidirectional `module_name <-> file_path` mapping over a project tree.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::AnatomistError;

/// Immutable map from dotted module name to canonical file path, and back.
///
/// Built once per project. Files are processed in sorted path order so that
/// an ambiguous collision (two files deriving the same module name) resolves
/// "last wins" deterministically rather than depending on OS walk order.
pub struct ModuleMap {
    name_to_file: HashMap<String, String>,
    file_to_name: HashMap<String, String>,
}

impl ModuleMap {
    pub fn build(project_root: &Path, excludes: &[String]) -> Result<Self, AnatomistError> {
        let mut files: Vec<PathBuf> = Vec::new();
        for entry in WalkDir::new(project_root)
            .into_iter()
            .filter_entry(|e| !is_excluded(e.path(), excludes))
        {
            let entry = entry.map_err(|e| AnatomistError::IoError(e.into()))?;
            let path = entry.path();
            if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("py") {
                files.push(path.to_path_buf());
            }
        }
        files.sort();

        let mut name_to_file = HashMap::new();
        let mut file_to_name = HashMap::new();

        for path in &files {
            let canonical = common::canonicalize_utf8(path)?;
            let module_name = module_name_for_path(path, project_root);
            name_to_file.insert(module_name.clone(), canonical.clone());
            file_to_name.insert(canonical, module_name);
        }

        Ok(Self {
            name_to_file,
            file_to_name,
        })
    }

    pub fn file_for_module(&self, module_name: &str) -> Option<&str> {
        self.name_to_file.get(module_name).map(String::as_str)
    }

    pub fn module_name_for(&self, file_path: &str) -> Option<&str> {
        self.file_to_name.get(file_path).map(String::as_str)
    }

    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.file_to_name.keys().map(String::as_str)
    }
}

fn is_excluded(path: &Path, excludes: &[String]) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| excludes.iter().any(|e| e == name))
        .unwrap_or(false)
}

/// Derives a module's dotted name from its path relative to the project
/// root: strip `.py`; `__init__` takes its parent directory's dotted name
/// (empty string at the project root); everything else appends its stem to
/// the parent directory's dotted name.
fn module_name_for_path(path: &Path, project_root: &Path) -> String {
    let rel = path.strip_prefix(project_root).unwrap_or(path);
    let stem = rel.file_stem().and_then(|s| s.to_str()).unwrap_or("");
    let parent_dotted: Vec<&str> = rel
        .parent()
        .into_iter()
        .flat_map(|p| p.components())
        .filter_map(|c| c.as_os_str().to_str())
        .collect();

    if stem == "__init__" {
        parent_dotted.join(".")
    } else if parent_dotted.is_empty() {
        stem.to_string()
    } else {
        format!("{}.{}", parent_dotted.join("."), stem)
    }
}
