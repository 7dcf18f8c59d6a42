//! Cross-version document aggregation with snapshot caching.
//!
//! [`DocumentStore`] merges the main tree and the optional features tree of
//! every configured version into one [`Snapshot`] per category.
//!
//! # Thread Safety
//!
//! `DocumentStore` is designed for concurrent access:
//! - readers clone an `Arc<Snapshot>` under a short read lock
//! - builds are serialized by `reload_lock` and double-checked
//! - a snapshot is published only once fully built, so readers never see a
//!   partially aggregated category

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Instant;

use docgraph_storage::Storage;

use crate::document::{Category, Document};
use crate::slug;
use crate::sort;
use crate::tree::{TreeBuilder, TreeError, TreeSpec};

/// Error returned when a category cannot be aggregated.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A main version tree failed to build.
    #[error("failed to build {category} documents for version {version}: {source}")]
    Tree {
        category: Category,
        version: String,
        #[source]
        source: TreeError,
    },
}

/// Configuration for [`DocumentStore`].
#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Versions to aggregate, in display order.
    pub versions: Vec<String>,
    /// Root of the `docs` category, relative to the storage root.
    pub docs_root: PathBuf,
    /// Root of the `user` category, relative to the storage root.
    pub user_root: PathBuf,
    /// Optional features directory inside each version. Also the slug marker.
    pub features_dir: String,
    /// Legacy directory excluded from `docs` main trees.
    pub legacy_dir: String,
    /// Feature folders dropped from the `docs` category.
    ///
    /// Empty by default: deployments list their legacy duplicate folders.
    pub deprecated_features: Vec<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            versions: ["3", "4", "5", "6"].map(str::to_owned).to_vec(),
            docs_root: PathBuf::from("docs"),
            user_root: PathBuf::from("user"),
            features_dir: "optional_features".to_owned(),
            legacy_dir: "legacy".to_owned(),
            deprecated_features: Vec::new(),
        }
    }
}

impl StoreConfig {
    /// Content root of a category.
    #[must_use]
    pub fn root(&self, category: Category) -> &Path {
        match category {
            Category::Docs => &self.docs_root,
            Category::User => &self.user_root,
        }
    }

    /// Directory names skipped while scanning a main version tree.
    fn main_exclusions(&self, category: Category) -> Vec<String> {
        match category {
            Category::Docs => vec![self.legacy_dir.clone(), self.features_dir.clone()],
            // The legacy folder holds live content for users
            Category::User => vec![self.features_dir.clone()],
        }
    }

    fn is_deprecated(&self, feature: &str) -> bool {
        self.deprecated_features
            .iter()
            .any(|name| slug::slug_segment(name) == feature)
    }
}

/// Immutable aggregate of one category.
///
/// Documents keep their build order: versions in configuration order, each
/// main tree followed by its feature tree.
#[derive(Debug, Default)]
pub struct Snapshot {
    documents: Vec<Document>,
    by_slug: HashMap<String, usize>,
    by_slug_lowercase: HashMap<String, usize>,
    by_parent: HashMap<String, Vec<usize>>,
    /// Tree key (`6`, `6/optional_features`) to document indices.
    by_tree: HashMap<String, Vec<usize>>,
    versions: Vec<String>,
}

impl Snapshot {
    /// All documents of the snapshot.
    #[must_use]
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Versions that produced at least one document.
    #[must_use]
    pub fn versions(&self) -> &[String] {
        &self.versions
    }

    /// Look up by slug: exact match first, then case-insensitive.
    #[must_use]
    pub fn get(&self, slug: &str) -> Option<&Document> {
        self.by_slug
            .get(slug)
            .or_else(|| self.by_slug_lowercase.get(&slug.to_lowercase()))
            .map(|&idx| &self.documents[idx])
    }

    /// Documents whose `parent_slug` equals `parent`, in build order.
    ///
    /// A tree root is its own parent and therefore listed under its own slug.
    pub fn with_parent(&self, parent: &str) -> impl Iterator<Item = &Document> {
        self.by_parent
            .get(parent)
            .into_iter()
            .flatten()
            .map(|&idx| &self.documents[idx])
    }

    /// Documents of one tree, in build order.
    fn tree(&self, key: &str) -> impl Iterator<Item = &Document> {
        self.by_tree
            .get(key)
            .into_iter()
            .flatten()
            .map(|&idx| &self.documents[idx])
    }
}

/// Accumulates trees into a [`Snapshot`].
#[derive(Default)]
struct SnapshotBuilder {
    snapshot: Snapshot,
}

impl SnapshotBuilder {
    fn add_tree(&mut self, key: String, version: &str, documents: Vec<Document>) {
        let snapshot = &mut self.snapshot;
        if !documents.is_empty() && !snapshot.versions.iter().any(|v| v == version) {
            snapshot.versions.push(version.to_owned());
        }

        let tree = snapshot.by_tree.entry(key).or_default();
        for doc in documents {
            if let Some(&existing) = snapshot.by_slug.get(&doc.slug) {
                tracing::warn!(
                    slug = %doc.slug,
                    kept = %snapshot.documents[existing].file_absolute_path.display(),
                    dropped = %doc.file_absolute_path.display(),
                    "Duplicate slug across trees, keeping first"
                );
                continue;
            }
            let idx = snapshot.documents.len();
            snapshot.by_slug.insert(doc.slug.clone(), idx);
            snapshot
                .by_slug_lowercase
                .entry(doc.slug.to_lowercase())
                .or_insert(idx);
            snapshot
                .by_parent
                .entry(doc.parent_slug.clone())
                .or_default()
                .push(idx);
            tree.push(idx);
            snapshot.documents.push(doc);
        }
    }

    fn build(self) -> Snapshot {
        self.snapshot
    }
}

/// Aggregated document collections for both categories.
///
/// Owns the storage backend, the aggregation settings and one cached
/// [`Snapshot`] per category. Snapshots are built lazily on first access and
/// kept until [`DocumentStore::clear_document_cache`].
pub struct DocumentStore {
    storage: Arc<dyn Storage>,
    config: StoreConfig,
    /// Mutex for serializing snapshot builds.
    reload_lock: Mutex<()>,
    /// Published snapshots, replaced only as a whole.
    snapshots: RwLock<HashMap<Category, Arc<Snapshot>>>,
}

impl DocumentStore {
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>, config: StoreConfig) -> Self {
        Self {
            storage,
            config,
            reload_lock: Mutex::new(()),
            snapshots: RwLock::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Snapshot of a category, building it if needed.
    ///
    /// Uses double-checked locking:
    /// 1. Fast path: return the published snapshot
    /// 2. Slow path: acquire `reload_lock`, recheck, then build and publish
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if a main version tree fails to build. Nothing
    /// is published in that case.
    pub fn snapshot(&self, category: Category) -> Result<Arc<Snapshot>, StoreError> {
        if let Some(snapshot) = self.published(category) {
            return Ok(snapshot);
        }

        let _guard = self
            .reload_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(snapshot) = self.published(category) {
            return Ok(snapshot);
        }

        let snapshot = Arc::new(self.load(category)?);
        self.snapshots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(category, Arc::clone(&snapshot));
        Ok(snapshot)
    }

    fn published(&self, category: Category) -> Option<Arc<Snapshot>> {
        self.snapshots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&category)
            .map(Arc::clone)
    }

    /// Drop every cached snapshot. The next access rescans storage.
    ///
    /// Waits for an in-flight build so that its result cannot outlive the clear.
    pub fn clear_document_cache(&self) {
        let _guard = self
            .reload_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        self.snapshots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        tracing::debug!("Document cache cleared");
    }

    /// Every document of a category.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the category cannot be aggregated.
    pub fn all_documents(&self, category: Category) -> Result<Vec<Document>, StoreError> {
        let snapshot = self.snapshot(category)?;
        Ok(snapshot
            .documents()
            .iter()
            .filter(|doc| doc.category == category)
            .cloned()
            .collect())
    }

    /// Look up a document by slug.
    ///
    /// Exact matches win; otherwise the slug is matched case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the category cannot be aggregated.
    pub fn get_document_by_slug(
        &self,
        category: Category,
        slug: &str,
    ) -> Result<Option<Document>, StoreError> {
        let snapshot = self.snapshot(category)?;
        Ok(snapshot
            .get(slug)
            .filter(|doc| doc.category == category)
            .cloned())
    }

    /// Look up a document by version and URL segments.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the category cannot be aggregated.
    pub fn get_document_by_params<S: AsRef<str>>(
        &self,
        category: Category,
        version: &str,
        segments: &[S],
    ) -> Result<Option<Document>, StoreError> {
        self.get_document_by_slug(category, &slug::join_slug(version, segments))
    }

    /// Direct children of a slug, sorted, without `hide_self` documents.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the category cannot be aggregated.
    pub fn children_of(
        &self,
        category: Category,
        parent_slug: &str,
    ) -> Result<Vec<Document>, StoreError> {
        let snapshot = self.snapshot(category)?;
        let children = snapshot
            .with_parent(parent_slug)
            .filter(|doc| doc.category == category && !doc.hide_self && doc.slug != parent_slug)
            .cloned()
            .collect();
        Ok(sort::sorted(children))
    }

    /// Documents of a version's main tree.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the category cannot be aggregated.
    pub fn version_documents(
        &self,
        category: Category,
        version: &str,
    ) -> Result<Vec<Document>, StoreError> {
        let snapshot = self.snapshot(category)?;
        Ok(snapshot
            .tree(slug::normalize_version(version))
            .cloned()
            .collect())
    }

    /// Documents of a version's optional features tree.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the category cannot be aggregated.
    pub fn feature_documents(
        &self,
        category: Category,
        version: &str,
    ) -> Result<Vec<Document>, StoreError> {
        let snapshot = self.snapshot(category)?;
        Ok(snapshot
            .tree(&self.feature_key(slug::normalize_version(version)))
            .cloned()
            .collect())
    }

    /// Configured versions that produced documents, in configuration order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the category cannot be aggregated.
    pub fn versions(&self, category: Category) -> Result<Vec<String>, StoreError> {
        Ok(self.snapshot(category)?.versions().to_vec())
    }

    fn feature_key(&self, version: &str) -> String {
        format!("{version}/{}", self.config.features_dir)
    }

    /// Scan storage and aggregate one category.
    fn load(&self, category: Category) -> Result<Snapshot, StoreError> {
        let start = Instant::now();
        let builder = TreeBuilder::new(self.storage.as_ref());
        let mut snapshot = SnapshotBuilder::default();

        for version in &self.config.versions {
            let version = slug::normalize_version(version);
            let version_root = self.config.root(category).join(format!("v{version}"));

            if !self.storage.exists(&version_root) {
                tracing::warn!(
                    %category,
                    version,
                    path = %version_root.display(),
                    "Version directory missing, skipping"
                );
                continue;
            }

            let spec = TreeSpec::new(&version_root, version, category)
                .with_excluded_dirs(self.config.main_exclusions(category));
            let main = builder
                .build(&spec)
                .map_err(|source| StoreError::Tree {
                    category,
                    version: version.to_owned(),
                    source,
                })?;
            snapshot.add_tree(version.to_owned(), version, main);

            let features = self.load_features(&builder, category, version, &version_root);
            snapshot.add_tree(self.feature_key(version), version, features);
        }

        let snapshot = snapshot.build();
        tracing::info!(
            %category,
            versions = snapshot.versions().len(),
            document_count = snapshot.documents().len(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Documents aggregated"
        );
        Ok(snapshot)
    }

    /// Build the optional features tree of a version.
    ///
    /// Failures are logged and yield no documents.
    fn load_features(
        &self,
        builder: &TreeBuilder<'_>,
        category: Category,
        version: &str,
        version_root: &Path,
    ) -> Vec<Document> {
        let marker = self.config.features_dir.as_str();
        let features_root = version_root.join(marker);
        if !self.storage.exists(&features_root) {
            tracing::debug!(%category, version, "No optional features");
            return Vec::new();
        }

        let root_parent = match category {
            Category::User => slug::derive_slug("", version, Some(marker)),
            Category::Docs => slug::derive_slug("", version, None),
        };
        let spec = TreeSpec::new(&features_root, version, category)
            .with_feature_marker(marker)
            .with_root_parent(root_parent);

        let documents = match builder.build(&spec) {
            Ok(documents) => documents,
            Err(e) => {
                tracing::warn!(%category, version, error = %e, "Skipping optional features");
                return Vec::new();
            }
        };

        documents
            .into_iter()
            .filter_map(|mut doc| {
                let feature = slug::segment_after(&doc.slug, marker).map(str::to_owned);
                if let Some(name) = &feature {
                    if category == Category::Docs && self.config.is_deprecated(name) {
                        return None;
                    }
                    doc.file_path = strip_first_component(&doc.file_path);
                }
                doc.optional_feature = feature;
                Some(doc)
            })
            .collect()
    }
}

/// Drop the leading feature directory so paths are relative to the feature repository.
fn strip_first_component(path: &Path) -> PathBuf {
    let mut components = path.components();
    match components.next() {
        Some(Component::Normal(_)) if components.clone().next().is_some() => {
            components.as_path().to_path_buf()
        }
        _ => path.to_path_buf(),
    }
}
