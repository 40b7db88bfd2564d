//! Input file list management
//!
//! Holds the ordered set of source documents queued for conversion. Paths are
//! deduplicated on insert and filtered to the supported extension, whether
//! they arrive from the browse dialog or from drag-and-drop.

use std::path::{Path, PathBuf};

/// Extension accepted for source documents
pub const SOURCE_EXTENSION: &str = "docx";

/// Check if a path has the supported document extension
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case(SOURCE_EXTENSION))
        .unwrap_or(false)
}

/// Ordered, deduplicated list of source document paths
#[derive(Debug, Clone, Default)]
pub struct FileList {
    entries: Vec<PathBuf>,
}

impl FileList {
    /// Create an empty file list
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a path if it is supported and not already present.
    ///
    /// Returns `true` if the path was added. Duplicate paths and paths with
    /// the wrong extension are ignored.
    pub fn add(&mut self, path: PathBuf) -> bool {
        if !is_supported(&path) || self.entries.contains(&path) {
            return false;
        }
        self.entries.push(path);
        true
    }

    /// Add a dropped batch with all-or-nothing acceptance.
    ///
    /// If any path in the batch lacks the supported extension, the whole
    /// batch is rejected and nothing is added. Returns the number of entries
    /// actually added (duplicates within an accepted batch are still skipped).
    pub fn add_batch(&mut self, paths: &[PathBuf]) -> usize {
        if !Self::accepts_batch(paths) {
            return 0;
        }
        paths.iter().filter(|p| self.add((*p).clone())).count()
    }

    /// Whether a dropped batch would be accepted (non-empty and every path
    /// supported). Used at the drag-hover stage before any drop happens.
    pub fn accepts_batch(paths: &[PathBuf]) -> bool {
        !paths.is_empty() && paths.iter().all(|p| is_supported(p))
    }

    /// Remove every path in `selected` from the list. Unknown paths and an
    /// empty selection are silently ignored.
    pub fn remove_selected(&mut self, selected: &[PathBuf]) {
        if selected.is_empty() {
            return;
        }
        self.entries.retain(|p| !selected.contains(p));
    }

    /// Empty the list unconditionally
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterate entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &PathBuf> {
        self.entries.iter()
    }

    /// Snapshot the current entries for a conversion run
    pub fn snapshot(&self) -> Vec<PathBuf> {
        self.entries.clone()
    }
}
