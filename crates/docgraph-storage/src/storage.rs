//! Storage trait and error types.
//!
//! Provides the core [`Storage`] trait for listing and reading markdown sources,
//! along with [`StorageError`] for unified error handling across backends.
//!
//! # Path Convention
//!
//! All path parameters are **relative to the storage root**:
//! - `"docs/v6"` - a version directory of the `docs` category
//! - `"docs/v6/01_guide/index.md"` - a folder page
//!
//! Storage implementations map these to their internal location. Use
//! [`Storage::resolve`] to obtain the full backend location of a path.

use std::path::{Path, PathBuf};

/// Semantic error categories.
#[derive(Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum StorageErrorKind {
    /// Resource does not exist.
    NotFound,
    /// Permission denied.
    PermissionDenied,
    /// Invalid path or identifier.
    InvalidPath,
    /// Content is not valid UTF-8.
    InvalidData,
    /// Other/unknown error category.
    Other,
}

/// Storage error with semantic kind and backend-specific source.
#[derive(Debug)]
pub struct StorageError {
    /// Semantic error category.
    pub kind: StorageErrorKind,
    /// Path context (if applicable).
    pub path: Option<PathBuf>,
    /// Backend identifier (e.g., "Fs", "Mock").
    pub backend: Option<&'static str>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl StorageError {
    /// Create a new storage error.
    #[must_use]
    pub fn new(kind: StorageErrorKind) -> Self {
        Self {
            kind,
            path: None,
            backend: None,
            source: None,
        }
    }

    /// Attach path context.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attach backend identifier.
    #[must_use]
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Create a not found error with path.
    #[must_use]
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::new(StorageErrorKind::NotFound).with_path(path)
    }

    /// Create a storage error from an I/O error.
    #[must_use]
    pub fn io(err: std::io::Error, path: Option<PathBuf>) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => StorageErrorKind::NotFound,
            std::io::ErrorKind::PermissionDenied => StorageErrorKind::PermissionDenied,
            std::io::ErrorKind::InvalidData => StorageErrorKind::InvalidData,
            _ => StorageErrorKind::Other,
        };
        let mut error = Self::new(kind).with_source(err);
        if let Some(p) = path {
            error = error.with_path(p);
        }
        error
    }

    /// True if the error means the resource is absent.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind == StorageErrorKind::NotFound
    }
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: "[Backend] Kind: message (path: /foo/bar)"
        if let Some(backend) = self.backend {
            write!(f, "[{backend}] ")?;
        }

        let kind_str = match self.kind {
            StorageErrorKind::NotFound => "Not found",
            StorageErrorKind::PermissionDenied => "Permission denied",
            StorageErrorKind::InvalidPath => "Invalid path",
            StorageErrorKind::InvalidData => "Invalid data",
            StorageErrorKind::Other => "Error",
        };

        write!(f, "{kind_str}")?;

        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }

        if let Some(path) = &self.path {
            write!(f, " (path: {})", path.display())?;
        }

        Ok(())
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Storage abstraction for markdown discovery and retrieval.
///
/// Provides a unified interface for accessing markdown sources regardless of
/// backend. All paths are relative to the storage root.
pub trait Storage: Send + Sync {
    /// List every markdown file below `base`, recursively.
    ///
    /// Directories whose name appears in `excluded_dirs` are skipped along
    /// with everything below them. Hidden entries (leading `.`) are always
    /// skipped. Returned paths are relative to the storage root and sorted
    /// lexicographically.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] with [`StorageErrorKind::NotFound`] if `base`
    /// does not exist, or another kind if listing fails.
    fn list_markdown(
        &self,
        base: &Path,
        excluded_dirs: &[String],
    ) -> Result<Vec<PathBuf>, StorageError>;

    /// Read the full text of a file.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the file doesn't exist or can't be read.
    fn read(&self, path: &Path) -> Result<String, StorageError>;

    /// Check if a file or directory exists at the given path.
    ///
    /// Returns `false` on errors (treats errors as "doesn't exist").
    fn exists(&self, path: &Path) -> bool;

    /// Full backend location of a path, used for display and tie-breaking.
    ///
    /// Default implementation returns the path unchanged.
    fn resolve(&self, path: &Path) -> PathBuf {
        path.to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_storage_error_new() {
        let err = StorageError::new(StorageErrorKind::NotFound);

        assert_eq!(err.kind, StorageErrorKind::NotFound);
        assert!(err.path.is_none());
        assert!(err.backend.is_none());
    }

    #[test]
    fn test_storage_error_not_found() {
        let err = StorageError::not_found("docs/v6");

        assert!(err.is_not_found());
        assert_eq!(err.path.as_deref(), Some(Path::new("docs/v6")));
    }

    #[test]
    fn test_storage_error_io_kinds() {
        let cases = [
            (std::io::ErrorKind::NotFound, StorageErrorKind::NotFound),
            (
                std::io::ErrorKind::PermissionDenied,
                StorageErrorKind::PermissionDenied,
            ),
            (std::io::ErrorKind::InvalidData, StorageErrorKind::InvalidData),
            (std::io::ErrorKind::Interrupted, StorageErrorKind::Other),
        ];

        for (io_kind, expected) in cases {
            let err = StorageError::io(std::io::Error::new(io_kind, "boom"), None);
            assert_eq!(err.kind, expected);
        }
    }

    #[test]
    fn test_storage_error_display_simple() {
        let err = StorageError::new(StorageErrorKind::NotFound);

        assert_eq!(err.to_string(), "Not found");
    }

    #[test]
    fn test_storage_error_display_full() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = StorageError::new(StorageErrorKind::NotFound)
            .with_backend("Fs")
            .with_path("docs/v6/index.md")
            .with_source(io_err);

        assert_eq!(
            err.to_string(),
            "[Fs] Not found: file not found (path: docs/v6/index.md)"
        );
    }

    #[test]
    fn test_storage_error_exposes_source() {
        use std::error::Error as _;

        let io_err = std::io::Error::other("disk on fire");
        let err = StorageError::io(io_err, None);

        assert_eq!(err.source().unwrap().to_string(), "disk on fire");
    }

    #[test]
    fn test_storage_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<StorageError>();
    }
}
