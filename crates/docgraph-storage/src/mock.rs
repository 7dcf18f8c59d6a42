//! Mock storage implementation for testing.
//!
//! Provides [`MockStorage`] for unit testing without filesystem access.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::storage::{Storage, StorageError, StorageErrorKind};

/// Backend identifier for error messages.
const BACKEND: &str = "Mock";

/// Mock storage for testing.
///
/// Stores file contents in memory. Use the builder methods to configure the
/// mock with test data, and the mutation methods to change it between scans.
///
/// # Example
///
/// ```ignore
/// use std::path::Path;
/// use docgraph_storage::{MockStorage, Storage};
///
/// let storage = MockStorage::new()
///     .with_file("docs/v6/index.md", "---\ntitle: Home\n---\n")
///     .with_file("docs/v6/01_guide.md", "# Guide");
///
/// let files = storage.list_markdown(Path::new("docs/v6"), &[]).unwrap();
/// ```
#[derive(Debug, Default)]
pub struct MockStorage {
    files: RwLock<BTreeMap<PathBuf, String>>,
    unreadable: RwLock<HashSet<PathBuf>>,
}

impl MockStorage {
    /// Create a new empty mock storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file with the given content.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_file(self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.set_file(path, content);
        self
    }

    /// Add a file that is listed but fails on read.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_unreadable(self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.files
            .write()
            .unwrap()
            .insert(path.clone(), String::new());
        self.unreadable.write().unwrap().insert(path);
        self
    }

    /// Insert or replace a file.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn set_file(&self, path: impl Into<PathBuf>, content: impl Into<String>) {
        self.files
            .write()
            .unwrap()
            .insert(path.into(), content.into());
    }

    /// Remove a file.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn remove_file(&self, path: impl AsRef<Path>) {
        self.files.write().unwrap().remove(path.as_ref());
    }
}

impl Storage for MockStorage {
    fn list_markdown(
        &self,
        base: &Path,
        excluded_dirs: &[String],
    ) -> Result<Vec<PathBuf>, StorageError> {
        let files = self.files.read().unwrap();

        let mut found_base = false;
        let mut listed = Vec::new();
        for path in files.keys() {
            let Ok(rel) = path.strip_prefix(base) else {
                continue;
            };
            found_base = true;

            // Every component except the file name is a directory
            let mut components: Vec<_> = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            let Some(name) = components.pop() else {
                continue;
            };
            let skipped = components
                .iter()
                .any(|dir| dir.starts_with('.') || excluded_dirs.contains(dir));
            if skipped || name.starts_with('.') {
                continue;
            }
            if Path::new(&name).extension().is_some_and(|e| e == "md") {
                listed.push(path.clone());
            }
        }

        if !found_base {
            return Err(StorageError::not_found(base).with_backend(BACKEND));
        }
        Ok(listed)
    }

    fn read(&self, path: &Path) -> Result<String, StorageError> {
        if self.unreadable.read().unwrap().contains(path) {
            return Err(StorageError::new(StorageErrorKind::PermissionDenied)
                .with_path(path)
                .with_backend(BACKEND));
        }
        self.files
            .read()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| StorageError::not_found(path).with_backend(BACKEND))
    }

    fn exists(&self, path: &Path) -> bool {
        self.files
            .read()
            .unwrap()
            .keys()
            .any(|p| p.starts_with(path))
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        Path::new("/mock").join(path)
    }
}
