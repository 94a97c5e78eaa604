//! Loading of local Markdown sources.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::updater::UpdateError;

/// One Markdown file to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    /// File stem, used as the section title.
    pub name: String,
    /// Path of the file.
    pub path: PathBuf,
    /// Raw file content.
    pub content: String,
}

impl SourceUnit {
    /// Create a unit from in-memory content.
    #[must_use]
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            content: content.into(),
        }
    }

    /// Whether the content is only whitespace.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }

    /// File name for log and report lines.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map_or_else(|| self.name.clone(), |n| n.to_string_lossy().into_owned())
    }
}

/// Load every `*.md` file directly inside `dir`, sorted by file name.
///
/// The extension is matched case-insensitively. Subdirectories and other
/// files are ignored.
///
/// # Errors
///
/// Returns [`UpdateError::Config`] if the directory does not exist or holds
/// no Markdown files, and [`UpdateError::Io`] if a file cannot be read.
pub fn load_sources(dir: &Path) -> Result<Vec<SourceUnit>, UpdateError> {
    if !dir.is_dir() {
        return Err(UpdateError::Config(format!(
            "Input directory not found: {}",
            dir.display()
        )));
    }

    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_markdown(&path) {
            paths.push(path);
        }
    }

    if paths.is_empty() {
        return Err(UpdateError::Config(format!(
            "No Markdown files (*.md) found in '{}'.",
            dir.display()
        )));
    }

    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    let mut units = Vec::with_capacity(paths.len());
    for path in paths {
        let content = std::fs::read_to_string(&path)?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        debug!("Loaded {} ({} bytes)", path.display(), content.len());
        units.push(SourceUnit {
            name,
            path,
            content,
        });
    }
    Ok(units)
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_loads_sorted_markdown_only() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.md"), "second").unwrap();
        std::fs::write(dir.path().join("a.MD"), "first").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        std::fs::create_dir(dir.path().join("sub.md")).unwrap();

        let units = load_sources(dir.path()).unwrap();

        let names: Vec<_> = units.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(units[0].content, "first");
        assert_eq!(units[0].file_name(), "a.MD");
    }

    #[test]
    fn test_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_sources(&dir.path().join("Input")).unwrap_err();
        assert!(matches!(err, UpdateError::Config(_)));
        assert!(err.to_string().starts_with("Input directory not found"));
    }

    #[test]
    fn test_no_markdown_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("readme.txt"), "x").unwrap();
        let err = load_sources(dir.path()).unwrap_err();
        assert!(matches!(err, UpdateError::Config(_)));
        assert!(err.to_string().contains("No Markdown files (*.md)"));
    }

    #[test]
    fn test_is_empty() {
        assert!(SourceUnit::new("a", "a.md", " \n\t\r\n").is_empty());
        assert!(!SourceUnit::new("a", "a.md", " x ").is_empty());
    }
}
