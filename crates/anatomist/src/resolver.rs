//! Import reference resolution: turns a symbolic name plus its origin file
//! into a project file or an external classification.

use std::path::{Path, PathBuf};

use crate::module_map::ModuleMap;

/// Outcome of resolving a single [`crate::ImportReference`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Project(String),
    External,
}

/// Resolves symbolic import names against a [`ModuleMap`], rooted at a
/// project directory for the filesystem-probe fallback.
pub struct ImportResolver<'a> {
    module_map: &'a ModuleMap,
    project_root: PathBuf,
}

impl<'a> ImportResolver<'a> {
    pub fn new(module_map: &'a ModuleMap, project_root: &Path) -> Self {
        Self {
            module_map,
            project_root: project_root.to_path_buf(),
        }
    }

    /// Resolves `symbolic_name` as it appeared in `from_file` (a canonical
    /// file path already present in the module map).
    pub fn resolve(&self, symbolic_name: &str, from_file: &str) -> Resolution {
        let dot_count = symbolic_name.chars().take_while(|&c| c == '.').count();

        if dot_count > 0 {
            self.resolve_relative(from_file, dot_count, &symbolic_name[dot_count..])
        } else {
            self.resolve_absolute(symbolic_name, from_file)
        }
    }

    fn resolve_relative(&self, from_file: &str, dot_count: usize, remainder: &str) -> Resolution {
        let Some(from_module) = self.module_map.module_name_for(from_file) else {
            return Resolution::External;
        };

        let mut components: Vec<&str> = if from_module.is_empty() {
            Vec::new()
        } else {
            from_module.split('.').collect()
        };

        // Mirrors Python's slice semantics (`parts[:-dots]`), where `dots`
        // exceeding the list length still yields `[]` rather than erroring.
        components.truncate(components.len().saturating_sub(dot_count));

        if !remainder.is_empty() {
            components.extend(remainder.split('.'));
        }

        let target_module = components.join(".");
        match self.module_map.file_for_module(&target_module) {
            Some(path) => Resolution::Project(path.to_string()),
            None => Resolution::External,
        }
    }

    fn resolve_absolute(&self, symbolic_name: &str, from_file: &str) -> Resolution {
        let top_level = symbolic_name.split('.').next().unwrap_or(symbolic_name);
        if common::is_stdlib_module(top_level) {
            return Resolution::External;
        }

        if let Some(path) = self.module_map.file_for_module(symbolic_name) {
            return Resolution::Project(path.to_string());
        }

        let segments: Vec<&str> = symbolic_name.split('.').collect();
        for drop_from_end in 1..segments.len() {
            let prefix = segments[..segments.len() - drop_from_end].join(".");
            if let Some(path) = self.module_map.file_for_module(&prefix) {
                return Resolution::Project(path.to_string());
            }
        }

        match self.probe_filesystem(symbolic_name, from_file) {
            Some(path) => Resolution::Project(path),
            None => Resolution::External,
        }
    }

    /// Walks ancestors of `from_file`'s directory, up to and including the
    /// project root's parent, testing `<ancestor>/<name>.py` and
    /// `<ancestor>/<name>/__init__.py` at each level.
    fn probe_filesystem(&self, symbolic_name: &str, from_file: &str) -> Option<String> {
        let rel_path = symbolic_name.replace('.', "/");
        let boundary = self
            .project_root
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.project_root.clone());

        let mut ancestor = Path::new(from_file).parent()?.to_path_buf();

        loop {
            let module_py = ancestor.join(format!("{rel_path}.py"));
            if module_py.is_file() {
                return common::canonicalize_utf8(&module_py).ok();
            }
            let init_py = ancestor.join(&rel_path).join("__init__.py");
            if init_py.is_file() {
                return common::canonicalize_utf8(&init_py).ok();
            }

            if ancestor == boundary {
                break;
            }
            match ancestor.parent() {
                Some(parent) => ancestor = parent.to_path_buf(),
                None => break,
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn resolves_absolute_exact_match() {
        let tmp = std::env::temp_dir().join("test_resolver_abs");
        fs::create_dir_all(&tmp).ok();
        fs::write(tmp.join("mymod.py"), "").ok();
        fs::write(tmp.join("main.py"), "").ok();

        let map = ModuleMap::build(&tmp, &[]).unwrap();
        let resolver = ImportResolver::new(&map, &tmp);
        let main_path = map.file_for_module("main").unwrap().to_string();

        let resolution = resolver.resolve("mymod", &main_path);
        assert!(matches!(resolution, Resolution::Project(_)));

        fs::remove_dir_all(tmp).ok();
    }

    #[test]
    fn resolves_prefix_shortened_absolute_import() {
        let tmp = std::env::temp_dir().join("test_resolver_prefix");
        fs::create_dir_all(tmp.join("pkg")).ok();
        fs::write(tmp.join("pkg/core.py"), "").ok();
        fs::write(tmp.join("main.py"), "").ok();

        let map = ModuleMap::build(&tmp, &[]).unwrap();
        let resolver = ImportResolver::new(&map, &tmp);
        let main_path = map.file_for_module("main").unwrap().to_string();

        // "pkg.core.SomeClass" has no exact module entry, but "pkg.core" does.
        let resolution = resolver.resolve("pkg.core.SomeClass", &main_path);
        assert!(matches!(resolution, Resolution::Project(_)));

        fs::remove_dir_all(tmp).ok();
    }

    #[test]
    fn stdlib_import_is_external() {
        let tmp = std::env::temp_dir().join("test_resolver_stdlib");
        fs::create_dir_all(&tmp).ok();
        fs::write(tmp.join("main.py"), "").ok();

        let map = ModuleMap::build(&tmp, &[]).unwrap();
        let resolver = ImportResolver::new(&map, &tmp);
        let main_path = map.file_for_module("main").unwrap().to_string();

        assert_eq!(resolver.resolve("os.path", &main_path), Resolution::External);

        fs::remove_dir_all(tmp).ok();
    }

    #[test]
    fn unresolvable_absolute_import_is_external() {
        let tmp = std::env::temp_dir().join("test_resolver_unresolvable");
        fs::create_dir_all(&tmp).ok();
        fs::write(tmp.join("main.py"), "").ok();

        let map = ModuleMap::build(&tmp, &[]).unwrap();
        let resolver = ImportResolver::new(&map, &tmp);
        let main_path = map.file_for_module("main").unwrap().to_string();

        assert_eq!(
            resolver.resolve("totally_nonexistent_package", &main_path),
            Resolution::External
        );

        fs::remove_dir_all(tmp).ok();
    }

    #[test]
    fn resolves_relative_single_dot() {
        let tmp = std::env::temp_dir().join("test_resolver_rel1");
        fs::create_dir_all(tmp.join("src")).ok();
        fs::write(tmp.join("src/utils.py"), "").ok();
        fs::write(tmp.join("src/main.py"), "").ok();

        let map = ModuleMap::build(&tmp, &[]).unwrap();
        let resolver = ImportResolver::new(&map, &tmp);
        let main_path = map.file_for_module("src.main").unwrap().to_string();

        let resolution = resolver.resolve(".utils", &main_path);
        assert!(matches!(resolution, Resolution::Project(_)));

        fs::remove_dir_all(tmp).ok();
    }

    #[test]
    fn relative_import_with_excess_dots_clamps_instead_of_bailing() {
        let tmp = std::env::temp_dir().join("test_resolver_rel_overflow");
        fs::create_dir_all(&tmp).ok();
        fs::write(tmp.join("main.py"), "").ok();
        fs::write(tmp.join("sibling.py"), "").ok();

        let map = ModuleMap::build(&tmp, &[]).unwrap();
        let resolver = ImportResolver::new(&map, &tmp);
        let main_path = map.file_for_module("main").unwrap().to_string();

        // "main" has a single path component, so two leading dots overflow it.
        // Python's `parts[:-2]` on a one-element list still yields `[]`
        // rather than raising, so resolution should continue against the
        // project root's namespace instead of bailing out to `External`.
        let resolution = resolver.resolve("..sibling", &main_path);
        assert!(matches!(resolution, Resolution::Project(_)));

        fs::remove_dir_all(tmp).ok();
    }

    #[test]
    fn resolves_relative_double_dot() {
        let tmp = std::env::temp_dir().join("test_resolver_rel2");
        fs::create_dir_all(tmp.join("src/api")).ok();
        fs::write(tmp.join("src/core.py"), "").ok();
        fs::write(tmp.join("src/api/handlers.py"), "").ok();

        let map = ModuleMap::build(&tmp, &[]).unwrap();
        let resolver = ImportResolver::new(&map, &tmp);
        let handlers_path = map.file_for_module("src.api.handlers").unwrap().to_string();

        let resolution = resolver.resolve("..core", &handlers_path);
        assert!(matches!(resolution, Resolution::Project(_)));

        fs::remove_dir_all(tmp).ok();
    }
}
