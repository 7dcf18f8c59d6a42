//! Document graph for multi-version documentation.
//!
//! This crate provides:
//! - [`DocumentStore`]: aggregated, cached document collections per category
//! - [`Hierarchy`]: children, siblings and filtered children queries
//! - [`TreeBuilder`]: one version (or optional features) directory as documents
//! - path derivation helpers ([`derive_slug`], [`derive_title`], [`derive_order`])
//! - [`parse_marker`] / [`find_markers`] for in-page `[CHILDREN ...]` listings
//!
//! # Quick Start
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::path::PathBuf;
//! use std::sync::Arc;
//! use docgraph_site::{Category, DocumentStore, Hierarchy, StoreConfig};
//! use docgraph_storage::FsStorage;
//!
//! let storage = Arc::new(FsStorage::new(PathBuf::from("content")));
//! let store = DocumentStore::new(storage, StoreConfig::default());
//!
//! let snapshot = store.snapshot(Category::Docs)?;
//! if let Some(root) = snapshot.get("/en/6/") {
//!     let children = Hierarchy::new(&snapshot).get_children(root, true);
//!     println!("{} children", children.len());
//! }
//! # Ok(())
//! # }
//! ```

mod document;
mod frontmatter;
mod hierarchy;
mod marker;
mod slug;
mod sort;
mod store;
mod tree;

#[cfg(test)]
mod testing;

pub use document::{Category, Document, ParseCategoryError};
pub use frontmatter::{Frontmatter, FrontmatterError, split_frontmatter};
pub use hierarchy::{ChildrenFilter, ChildrenOptions, Hierarchy};
pub use marker::{ChildrenMarker, MarkerError, MarkerMatch, find_markers, parse_marker};
pub use slug::{
    LOCALE, derive_order, derive_slug, derive_title, join_slug, normalize_name,
    normalize_version, strip_order_prefix,
};
pub use sort::{compare_documents, sort_documents};
pub use store::{DocumentStore, Snapshot, StoreConfig, StoreError};
pub use tree::{TreeBuilder, TreeError, TreeSpec};
