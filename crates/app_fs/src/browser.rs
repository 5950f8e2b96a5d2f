//! Folder listing for the picture viewer

use crate::{FsError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Extensions the viewer offers to open
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "bmp"];

/// File entry with metadata
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub path: PathBuf,
    pub name: String,
    pub is_dir: bool,
    pub is_hidden: bool,
    pub extension: String,
}

impl FileEntry {
    /// Create a new file entry from path
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let metadata = fs::metadata(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        let is_hidden = is_hidden_file(path, &name);

        Ok(Self {
            path: path.to_path_buf(),
            name,
            is_dir: metadata.is_dir(),
            is_hidden,
            extension,
        })
    }

    /// Check if this is an image file
    pub fn is_image(&self) -> bool {
        !self.is_dir && IMAGE_EXTENSIONS.contains(&self.extension.as_str())
    }
}

/// Options for listing directory contents. Hidden files are never listed.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub images_only: bool,
}

impl ListOptions {
    /// Filter for images only
    pub fn images_only() -> Self {
        Self { images_only: true }
    }
}

/// List the files of a directory in natural name order.
/// Sub-directories are skipped.
pub fn list_directory<P: AsRef<Path>>(path: P, options: &ListOptions) -> Result<Vec<FileEntry>> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(FsError::NotFound(path.display().to_string()));
    }

    if !path.is_dir() {
        return Err(FsError::InvalidPath(format!("Not a directory: {}", path.display())));
    }

    let mut entries = Vec::new();

    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let file_entry = match FileEntry::from_path(entry.path()) {
            Ok(e) => e,
            Err(_) => continue, // Skip entries we can't read
        };

        if file_entry.is_dir {
            continue;
        }

        if file_entry.is_hidden {
            continue;
        }

        if options.images_only && !file_entry.is_image() {
            continue;
        }

        entries.push(file_entry);
    }

    entries.sort_by(|a, b| natural_sort_key(&a.name).cmp(&natural_sort_key(&b.name)));

    Ok(entries)
}

/// Result of scanning the folder that holds an opened picture
#[derive(Debug, Clone)]
pub struct FolderScan {
    pub files: Vec<PathBuf>,
    /// Position of the opened file in `files`
    pub index: usize,
}

/// Scan the parent folder of `file` for images and locate `file` in it.
///
/// If `file` itself is filtered out (hidden, or an unknown extension) it is
/// still inserted at its natural position so the viewer keeps showing it.
pub fn scan_folder_of<P: AsRef<Path>>(file: P) -> Result<FolderScan> {
    let file = file.as_ref();
    let parent = match file.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let mut entries = list_directory(&parent, &ListOptions::images_only())?;
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| FsError::InvalidPath(file.display().to_string()))?;

    let index = match entries.iter().position(|e| e.name == name) {
        Some(i) => i,
        None => {
            let key = natural_sort_key(&name);
            let at = entries
                .iter()
                .position(|e| natural_sort_key(&e.name) > key)
                .unwrap_or(entries.len());
            entries.insert(at, FileEntry::from_path(file)?);
            at
        }
    };

    tracing::debug!("Scanned {} images in {:?}", entries.len(), parent);

    Ok(FolderScan {
        files: entries.into_iter().map(|e| e.path).collect(),
        index,
    })
}

/// Generate a natural sort key (handles numbers correctly)
/// "image2.jpg" < "image10.jpg"
fn natural_sort_key(s: &str) -> Vec<NaturalSortPart> {
    let mut parts = Vec::new();
    let mut current_num = String::new();
    let mut current_str = String::new();

    for c in s.chars() {
        if c.is_ascii_digit() {
            if !current_str.is_empty() {
                parts.push(NaturalSortPart::Str(current_str.to_lowercase()));
                current_str.clear();
            }
            current_num.push(c);
        } else {
            if !current_num.is_empty() {
                if let Ok(n) = current_num.parse::<u64>() {
                    parts.push(NaturalSortPart::Num(n));
                }
                current_num.clear();
            }
            current_str.push(c);
        }
    }

    if !current_num.is_empty() {
        if let Ok(n) = current_num.parse::<u64>() {
            parts.push(NaturalSortPart::Num(n));
        }
    }
    if !current_str.is_empty() {
        parts.push(NaturalSortPart::Str(current_str.to_lowercase()));
    }

    parts
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum NaturalSortPart {
    Num(u64),
    Str(String),
}

#[cfg(windows)]
fn is_hidden_file(path: &Path, _name: &str) -> bool {
    use std::os::windows::fs::MetadataExt;

    const FILE_ATTRIBUTE_HIDDEN: u32 = 0x2;

    fs::metadata(path)
        .map(|m| m.file_attributes() & FILE_ATTRIBUTE_HIDDEN != 0)
        .unwrap_or(false)
}

#[cfg(not(windows))]
fn is_hidden_file(_path: &Path, name: &str) -> bool {
    name.starts_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, b"").unwrap();
        path
    }

    #[test]
    fn test_natural_sort() {
        let mut names = vec!["image10.jpg", "image2.jpg", "image1.jpg", "image20.jpg"];
        names.sort_by(|a, b| natural_sort_key(a).cmp(&natural_sort_key(b)));
        assert_eq!(names, vec!["image1.jpg", "image2.jpg", "image10.jpg", "image20.jpg"]);
    }

    #[test]
    fn test_list_images_only() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "p10.png");
        touch(dir.path(), "p2.png");
        touch(dir.path(), "readme.txt");
        touch(dir.path(), ".hidden.png");
        fs::create_dir(dir.path().join("sub.png")).unwrap();

        let names: Vec<_> = list_directory(dir.path(), &ListOptions::images_only())
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["p2.png", "p10.png"]);
    }

    #[test]
    fn test_list_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let err = list_directory(dir.path().join("missing"), &ListOptions::default());
        assert!(matches!(err, Err(FsError::NotFound(_))));
    }

    #[test]
    fn test_scan_folder_locates_file() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.jpg");
        let b = touch(dir.path(), "b.jpg");
        touch(dir.path(), "c.jpg");

        let scan = scan_folder_of(&b).unwrap();
        assert_eq!(scan.files.len(), 3);
        assert_eq!(scan.index, 1);
        assert_eq!(scan.files[scan.index], b);
    }

    #[test]
    fn test_scan_folder_keeps_unlisted_file() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.jpg");
        touch(dir.path(), "c.jpg");
        let odd = touch(dir.path(), "b.tiff");

        let scan = scan_folder_of(&odd).unwrap();
        assert_eq!(scan.files.len(), 3);
        assert_eq!(scan.index, 1);
        assert_eq!(scan.files[1], odd);
    }
}
