//! File list iteration for the picture viewer

use app_fs::FolderScan;
use std::path::{Path, PathBuf};

/// Ordered list of picture paths with a movable cursor.
///
/// `prev`/`next` move the cursor in place. `unlink` drops the entry under the
/// cursor after a delete. Dropping the iterator releases it.
pub trait FileIterator: Send {
    /// Current position
    fn index(&self) -> usize;

    /// Number of entries
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Path under the cursor
    fn filepath(&self) -> Option<&Path>;

    /// Move to the previous entry; false at the start
    fn prev(&mut self) -> bool;

    /// Move to the next entry; false at the end
    fn next(&mut self) -> bool;

    /// Remove the entry under the cursor and return it
    fn unlink(&mut self) -> Option<PathBuf>;

    fn has_prev(&self) -> bool {
        self.index() > 0
    }

    fn has_next(&self) -> bool {
        self.len() >= 1 && self.index() < self.len() - 1
    }
}

/// In-memory iterator over a list of paths
#[derive(Debug, Clone, Default)]
pub struct PathListIterator {
    paths: Vec<PathBuf>,
    index: usize,
}

impl PathListIterator {
    pub fn new(paths: Vec<PathBuf>, index: usize) -> Self {
        let index = index.min(paths.len().saturating_sub(1));
        Self { paths, index }
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

impl From<FolderScan> for PathListIterator {
    fn from(scan: FolderScan) -> Self {
        Self::new(scan.files, scan.index)
    }
}

impl FileIterator for PathListIterator {
    fn index(&self) -> usize {
        self.index
    }

    fn len(&self) -> usize {
        self.paths.len()
    }

    fn filepath(&self) -> Option<&Path> {
        self.paths.get(self.index).map(PathBuf::as_path)
    }

    fn prev(&mut self) -> bool {
        if self.index > 0 {
            self.index -= 1;
            true
        } else {
            false
        }
    }

    fn next(&mut self) -> bool {
        if self.index + 1 < self.paths.len() {
            self.index += 1;
            true
        } else {
            false
        }
    }

    fn unlink(&mut self) -> Option<PathBuf> {
        if self.index >= self.paths.len() {
            return None;
        }
        let removed = self.paths.remove(self.index);
        // The following entry slides under the cursor; step back at the tail
        if self.index >= self.paths.len() && self.index > 0 {
            self.index -= 1;
        }
        Some(removed)
    }
}

/// Paths one step before and after the cursor, leaving the cursor where it was
pub fn neighbor_paths(iter: &mut dyn FileIterator) -> (Option<PathBuf>, Option<PathBuf>) {
    let mut prev = None;
    let mut next = None;

    if iter.has_prev() && iter.prev() {
        prev = iter.filepath().map(Path::to_path_buf);
        iter.next();
    }
    if iter.has_next() && iter.next() {
        next = iter.filepath().map(Path::to_path_buf);
        iter.prev();
    }

    (prev, next)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(names: &[&str], index: usize) -> PathListIterator {
        PathListIterator::new(names.iter().map(PathBuf::from).collect(), index)
    }

    #[test]
    fn test_prev_next_bounds() {
        let mut it = list(&["a", "b"], 0);
        assert!(!it.prev());
        assert!(it.next());
        assert_eq!(it.filepath(), Some(Path::new("b")));
        assert!(!it.next());
        assert_eq!(it.index(), 1);
    }

    #[test]
    fn test_unlink_middle_and_tail() {
        let mut it = list(&["a", "b", "c"], 1);
        assert_eq!(it.unlink(), Some(PathBuf::from("b")));
        assert_eq!(it.filepath(), Some(Path::new("c")));

        assert_eq!(it.unlink(), Some(PathBuf::from("c")));
        assert_eq!(it.filepath(), Some(Path::new("a")));

        assert_eq!(it.unlink(), Some(PathBuf::from("a")));
        assert!(it.is_empty());
        assert_eq!(it.filepath(), None);
        assert_eq!(it.unlink(), None);
    }

    #[test]
    fn test_neighbors_restore_cursor() {
        let mut it = list(&["a", "b", "c"], 1);
        let (prev, next) = neighbor_paths(&mut it);
        assert_eq!(prev, Some(PathBuf::from("a")));
        assert_eq!(next, Some(PathBuf::from("c")));
        assert_eq!(it.index(), 1);

        let mut first = list(&["a", "b"], 0);
        assert_eq!(neighbor_paths(&mut first), (None, Some(PathBuf::from("b"))));
        assert_eq!(first.index(), 0);
    }

    #[test]
    fn test_index_clamped() {
        let it = list(&["a"], 5);
        assert_eq!(it.index(), 0);
        assert!(!it.has_prev());
        assert!(!it.has_next());
    }
}
