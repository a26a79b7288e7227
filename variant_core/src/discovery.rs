//! Source file discovery.
//!
//! Walks the source root and produces the ordered list of items the engine
//! will process. Ordering is a stable sort by path so progress numbering is
//! reproducible run to run.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions handed to the codec library. Matching is case-insensitive.
/// Whether a given file actually decodes is up to the codec; a mismatch is a
/// per-item failure, not a discovery concern.
pub const SUPPORTED_SOURCE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "heic", "avif", "webp", "bmp", "tif", "tiff", "gif",
];

/// One eligible input file: where it is, and where it sits relative to the
/// source root (the part mirrored under each profile directory).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceItem {
    pub absolute_path: PathBuf,
    pub relative_path: PathBuf,
}

impl SourceItem {
    /// Filename shown in progress events.
    pub fn file_name(&self) -> String {
        self.absolute_path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string()
    }
}

pub fn has_supported_extension(path: &Path) -> bool {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    SUPPORTED_SOURCE_EXTENSIONS.contains(&ext.as_str())
}

/// Collects eligible files under `root`, sorted by path.
///
/// Recursive mode walks the whole tree (walkdir detects symlink loops when
/// following links); flat mode looks only at the top level, so relative
/// paths collapse to bare filenames. An empty result is a normal outcome.
pub fn discover_sources(root: &Path, recursive: bool) -> Vec<SourceItem> {
    let walker = if recursive {
        WalkDir::new(root).follow_links(true)
    } else {
        WalkDir::new(root).max_depth(1)
    };

    let mut items: Vec<SourceItem> = walker
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| has_supported_extension(e.path()))
        .filter_map(|e| {
            let relative_path = e.path().strip_prefix(root).ok()?.to_path_buf();
            Some(SourceItem {
                absolute_path: e.path().to_path_buf(),
                relative_path,
            })
        })
        .collect();

    items.sort_by(|a, b| a.absolute_path.cmp(&b.absolute_path));
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn test_extension_filter_is_case_insensitive() {
        assert!(has_supported_extension(Path::new("a.JPG")));
        assert!(has_supported_extension(Path::new("b.Png")));
        assert!(has_supported_extension(Path::new("c.tIfF")));
        assert!(!has_supported_extension(Path::new("d.txt")));
        assert!(!has_supported_extension(Path::new("noext")));
        assert!(!has_supported_extension(Path::new(".hidden")));
    }

    #[test]
    fn test_recursive_discovery_is_sorted_and_relative() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("zebra.png"));
        touch(&root.join("sub/deep/alpha.jpg"));
        touch(&root.join("sub/notes.txt"));
        touch(&root.join("beta.JPEG"));

        let items = discover_sources(root, true);
        let rel: Vec<_> = items
            .iter()
            .map(|i| i.relative_path.to_string_lossy().to_string())
            .collect();

        assert_eq!(
            rel,
            vec!["beta.JPEG", "sub/deep/alpha.jpg", "zebra.png"],
            "sorted by path, txt excluded"
        );
        for item in &items {
            assert_eq!(item.absolute_path, root.join(&item.relative_path));
        }
    }

    #[test]
    fn test_flat_discovery_skips_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("top.png"));
        touch(&root.join("sub/nested.png"));

        let items = discover_sources(root, false);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].relative_path, PathBuf::from("top.png"));
        assert_eq!(items[0].file_name(), "top.png");
    }

    #[test]
    fn test_empty_source_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover_sources(dir.path(), true).is_empty());
        assert!(discover_sources(dir.path(), false).is_empty());
    }

    #[test]
    fn test_missing_root_yields_empty() {
        let items = discover_sources(Path::new("/nonexistent/really/not/here"), true);
        assert!(items.is_empty());
    }
}
