//! Directory-backed template resolver.

use jwalk::WalkDir;
use std::fs;
use std::path::PathBuf;
use std::time::SystemTime;

use super::CodeResolver;
use crate::core::Dialect;

const IGNORED_FILES: &[&str] = &[".DS_Store"];

/// Resolves template names relative to a root directory.
#[derive(Debug, Clone)]
pub struct DirectoryResolver {
    root: PathBuf,
}

impl DirectoryResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Absolute path of a template name.
    ///
    /// Names containing `..` are rejected so lookups stay inside the root.
    fn path_of(&self, name: &str) -> Option<PathBuf> {
        if name.split('/').any(|segment| segment == "..") {
            return None;
        }
        Some(self.root.join(name))
    }
}

impl CodeResolver for DirectoryResolver {
    fn resolve(&self, name: &str) -> Option<String> {
        fs::read_to_string(self.path_of(name)?).ok()
    }

    fn last_modified(&self, name: &str) -> Option<SystemTime> {
        self.path_of(name)?
            .metadata()
            .and_then(|m| m.modified())
            .ok()
    }

    fn resolve_all_template_names(&self) -> Vec<String> {
        let mut names: Vec<String> = WalkDir::new(&self.root)
            .sort(true)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .filter(|e| {
                let name = e.file_name().to_str().unwrap_or_default();
                !IGNORED_FILES.contains(&name) && Dialect::is_template_file(name)
            })
            .filter_map(|e| {
                let path = e.path();
                let relative = path.strip_prefix(&self.root).ok()?;
                let segments: Vec<_> = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect();
                Some(segments.join("/"))
            })
            .collect();

        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn write(root: &Path, name: &str, content: &str) {
        let path = root.join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_resolve_and_exists() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "page.jte", "hello");

        let resolver = DirectoryResolver::new(dir.path());
        assert_eq!(resolver.resolve("page.jte").as_deref(), Some("hello"));
        assert!(resolver.exists("page.jte"));
        assert!(resolver.last_modified("page.jte").is_some());

        assert_eq!(resolver.resolve("missing.jte"), None);
        assert!(!resolver.exists("missing.jte"));
        assert_eq!(resolver.last_modified("missing.jte"), None);
    }

    #[test]
    fn test_parent_segments_rejected() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "inner/page.jte", "hello");

        let resolver = DirectoryResolver::new(dir.path().join("inner"));
        assert!(resolver.exists("page.jte"));
        assert_eq!(resolver.resolve("../inner/page.jte"), None);
    }

    #[test]
    fn test_resolve_all_template_names() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "page.jte", "");
        write(dir.path(), "tag/nav.jte", "");
        write(dir.path(), "layout/main.kte", "");
        write(dir.path(), "tag/forms/input.jte", "");
        write(dir.path(), "notes.txt", "");
        write(dir.path(), ".DS_Store", "");

        let resolver = DirectoryResolver::new(dir.path());
        assert_eq!(
            resolver.resolve_all_template_names(),
            vec![
                "layout/main.kte",
                "page.jte",
                "tag/forms/input.jte",
                "tag/nav.jte",
            ]
        );
    }

    #[test]
    fn test_missing_root_lists_nothing() {
        let resolver = DirectoryResolver::new("/nonexistent/stencil/templates");
        assert!(resolver.resolve_all_template_names().is_empty());
    }
}
