//! Storage abstraction for the docgraph content engine.
//!
//! This crate provides a [`Storage`] trait for listing and reading markdown
//! sources independently of where they live. This enables:
//!
//! - **Unit testing** without touching the real filesystem
//! - **Clean separation** between document-graph logic and I/O operations
//!
//! # Architecture
//!
//! The crate provides:
//! - [`Storage`] trait with `list_markdown()`, `read()`, `exists()` and `resolve()`
//! - [`FsStorage`] implementation rooted at a content directory
//! - [`MockStorage`] for testing (behind `mock` feature flag)
//!
//! # Example
//!
//! ```ignore
//! use std::path::{Path, PathBuf};
//! use docgraph_storage::{FsStorage, Storage};
//!
//! let storage = FsStorage::new(PathBuf::from("content"));
//! let files = storage.list_markdown(Path::new("docs/v6"), &["optional_features".to_owned()])?;
//! for file in files {
//!     println!("{}", file.display());
//! }
//! ```

mod fs;
#[cfg(feature = "mock")]
mod mock;
mod storage;

pub use fs::FsStorage;
#[cfg(feature = "mock")]
pub use mock::MockStorage;
pub use storage::{Storage, StorageError, StorageErrorKind};
