//! Filesystem storage implementation.
//!
//! Provides [`FsStorage`] for listing and reading markdown sources below a
//! content root on the local filesystem.

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::storage::{Storage, StorageError, StorageErrorKind};

/// Backend identifier for error messages.
const BACKEND: &str = "Fs";

/// Filesystem storage implementation.
///
/// Every path handed to the [`Storage`] methods is interpreted relative to
/// `root`. Paths that try to escape the root with `..` are rejected.
///
/// # Example
///
/// ```ignore
/// use std::path::{Path, PathBuf};
/// use docgraph_storage::{FsStorage, Storage};
///
/// let storage = FsStorage::new(PathBuf::from("content"));
/// let text = storage.read(Path::new("docs/v6/index.md"))?;
/// ```
#[derive(Debug)]
pub struct FsStorage {
    /// Root directory for document storage.
    root: PathBuf,
}

impl FsStorage {
    /// Create a new filesystem storage rooted at `root`.
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Root directory of this storage.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Validate that a path doesn't escape the storage root.
    ///
    /// Rejects parent directory components (`..`) and absolute paths.
    fn validate_path(path: &Path) -> Result<(), StorageError> {
        let escapes = path
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)));

        if escapes {
            return Err(StorageError::new(StorageErrorKind::InvalidPath)
                .with_path(path)
                .with_backend(BACKEND));
        }
        Ok(())
    }

    /// Walk `dir` recursively, collecting markdown files as root-relative paths.
    fn walk(
        &self,
        dir: &Path,
        rel_dir: &Path,
        excluded_dirs: &[String],
        files: &mut Vec<PathBuf>,
    ) -> Result<(), StorageError> {
        let entries = fs::read_dir(dir)
            .map_err(|e| StorageError::io(e, Some(rel_dir.to_path_buf())).with_backend(BACKEND))?;

        for entry in entries {
            let entry = entry.map_err(|e| {
                StorageError::io(e, Some(rel_dir.to_path_buf())).with_backend(BACKEND)
            })?;
            let name = entry.file_name().to_string_lossy().into_owned();

            // Skip hidden files/dirs
            if name.starts_with('.') {
                continue;
            }

            let rel_path = rel_dir.join(&name);
            let is_dir = entry
                .file_type()
                .map_err(|e| StorageError::io(e, Some(rel_path.clone())).with_backend(BACKEND))?
                .is_dir();

            if is_dir {
                if excluded_dirs.iter().any(|excluded| *excluded == name) {
                    tracing::debug!(path = %rel_path.display(), "Skipping excluded directory");
                    continue;
                }
                self.walk(&entry.path(), &rel_path, excluded_dirs, files)?;
            } else if Path::new(&name).extension().is_some_and(|e| e == "md") {
                files.push(rel_path);
            }
        }

        Ok(())
    }
}

impl Storage for FsStorage {
    fn list_markdown(
        &self,
        base: &Path,
        excluded_dirs: &[String],
    ) -> Result<Vec<PathBuf>, StorageError> {
        Self::validate_path(base)?;
        let full_path = self.root.join(base);
        if !full_path.is_dir() {
            return Err(StorageError::not_found(base).with_backend(BACKEND));
        }

        let mut files = Vec::new();
        self.walk(&full_path, base, excluded_dirs, &mut files)?;
        files.sort();
        Ok(files)
    }

    fn read(&self, path: &Path) -> Result<String, StorageError> {
        Self::validate_path(path)?;
        fs::read_to_string(self.root.join(path))
            .map_err(|e| StorageError::io(e, Some(path.to_path_buf())).with_backend(BACKEND))
    }

    fn exists(&self, path: &Path) -> bool {
        Self::validate_path(path).is_ok() && self.root.join(path).exists()
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }
}
