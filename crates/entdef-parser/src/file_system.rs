//! File access for top-level documents and included files.

use std::{
    collections::HashMap,
    fs, io,
    path::{Component, Path, PathBuf},
};

use log::trace;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FileSystemError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Source of definition file contents.
pub trait FileSystem {
    /// Reads the complete contents of the file at `path`.
    fn open_file(&self, path: &Path) -> Result<Vec<u8>, FileSystemError>;
}

/// Reads files from the local disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskFileSystem;

impl FileSystem for DiskFileSystem {
    fn open_file(&self, path: &Path) -> Result<Vec<u8>, FileSystemError> {
        trace!(path = path.display().to_string(); "Reading file");
        fs::read(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => FileSystemError::NotFound(path.to_path_buf()),
            _ => FileSystemError::Io {
                path: path.to_path_buf(),
                source,
            },
        })
    }
}

/// An in-memory file system keyed by normalized path.
#[derive(Debug, Clone, Default)]
pub struct MemoryFileSystem {
    files: HashMap<PathBuf, Vec<u8>>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a file.
    pub fn with_file(mut self, path: impl AsRef<Path>, contents: impl Into<Vec<u8>>) -> Self {
        self.insert(path, contents);
        self
    }

    pub fn insert(&mut self, path: impl AsRef<Path>, contents: impl Into<Vec<u8>>) {
        self.files
            .insert(normalize_path(path.as_ref()), contents.into());
    }
}

impl FileSystem for MemoryFileSystem {
    fn open_file(&self, path: &Path) -> Result<Vec<u8>, FileSystemError> {
        self.files
            .get(&normalize_path(path))
            .cloned()
            .ok_or_else(|| FileSystemError::NotFound(path.to_path_buf()))
    }
}

/// Lexically normalizes a path by dropping `.` and folding `..` components.
///
/// The file system is not consulted, so symbolic links are not resolved.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(
                    normalized.components().next_back(),
                    Some(Component::Normal(_))
                );
                if can_pop {
                    normalized.pop();
                } else if !normalized.has_root() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(
            normalize_path(Path::new("/defs/./quake/../base.fgd")),
            PathBuf::from("/defs/base.fgd")
        );
        assert_eq!(
            normalize_path(Path::new("../shared/base.fgd")),
            PathBuf::from("../shared/base.fgd")
        );
        assert_eq!(normalize_path(Path::new("/../a.fgd")), PathBuf::from("/a.fgd"));
    }

    #[test]
    fn test_memory_file_system_normalizes_keys() {
        let fs = MemoryFileSystem::new().with_file("/defs/sub/../base.fgd", "@BaseClass = x []");

        assert_eq!(
            fs.open_file(Path::new("/defs/./base.fgd")).unwrap(),
            b"@BaseClass = x []"
        );
        assert!(matches!(
            fs.open_file(Path::new("/defs/other.fgd")),
            Err(FileSystemError::NotFound(_))
        ));
    }

    #[test]
    fn test_disk_file_system() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "// empty").unwrap();

        let contents = DiskFileSystem.open_file(file.path()).unwrap();
        assert_eq!(contents, b"// empty");

        let missing = file.path().with_extension("missing");
        assert!(matches!(
            DiskFileSystem.open_file(&missing),
            Err(FileSystemError::NotFound(_))
        ));
    }
}
