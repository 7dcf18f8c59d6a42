//! Document tree building for a single content root.
//!
//! A tree is one version directory (or one optional features directory) turned
//! into a flat, sorted list of [`Document`] records with parent links:
//!
//! ```text
//! v6/index.md                          /en/6/                          parent: itself
//! v6/01_getting_started/index.md       /en/6/getting-started/          parent: /en/6/
//! v6/01_getting_started/01_install.md  /en/6/getting-started/install/  parent: /en/6/getting-started/
//! ```

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::time::Instant;

use docgraph_storage::{Storage, StorageError};
use rayon::prelude::*;

use crate::document::{Category, Document};
use crate::frontmatter::{FrontmatterError, split_frontmatter};
use crate::slug;
use crate::sort;

/// Error returned when a tree cannot be built.
///
/// Every variant names the subtree being built so that failures deep inside
/// an aggregate build stay traceable.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// Listing the base directory or reading a source failed.
    #[error("storage error in {} while building {}: {source}", .path.display(), .base.display())]
    Storage {
        path: PathBuf,
        base: PathBuf,
        #[source]
        source: StorageError,
    },
    /// Frontmatter of a source could not be parsed.
    #[error("invalid frontmatter in {} while building {}: {source}", .path.display(), .base.display())]
    Frontmatter {
        path: PathBuf,
        base: PathBuf,
        #[source]
        source: FrontmatterError,
    },
    /// Two sources normalize to the same slug.
    #[error("duplicate slug {slug}: {} and {}", .first.display(), .second.display())]
    DuplicateSlug {
        slug: String,
        first: PathBuf,
        second: PathBuf,
    },
}

/// What to build.
#[derive(Clone, Debug)]
pub struct TreeSpec {
    /// Base directory, relative to the storage root.
    pub base: PathBuf,
    /// Version the documents belong to.
    pub version: String,
    pub category: Category,
    /// Slug segment placed after the version, e.g. `optional_features`.
    pub feature_marker: Option<String>,
    /// Parent slug for the subtree's root index instead of itself.
    pub root_parent_slug: Option<String>,
    /// Directory names skipped while listing.
    pub excluded_dirs: Vec<String>,
}

impl TreeSpec {
    /// Tree of a version directory with no marker, override or exclusions.
    #[must_use]
    pub fn new(base: impl Into<PathBuf>, version: impl Into<String>, category: Category) -> Self {
        Self {
            base: base.into(),
            version: version.into(),
            category,
            feature_marker: None,
            root_parent_slug: None,
            excluded_dirs: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_feature_marker(mut self, marker: impl Into<String>) -> Self {
        self.feature_marker = Some(marker.into());
        self
    }

    #[must_use]
    pub fn with_root_parent(mut self, slug: impl Into<String>) -> Self {
        self.root_parent_slug = Some(slug.into());
        self
    }

    #[must_use]
    pub fn with_excluded_dirs(mut self, dirs: Vec<String>) -> Self {
        self.excluded_dirs = dirs;
        self
    }
}

/// Builds document trees from a [`Storage`] backend.
pub struct TreeBuilder<'a> {
    storage: &'a dyn Storage,
}

impl<'a> TreeBuilder<'a> {
    #[must_use]
    pub fn new(storage: &'a dyn Storage) -> Self {
        Self { storage }
    }

    /// Build the sorted document list for one subtree.
    ///
    /// Sources are read in parallel; the result does not depend on read
    /// completion order.
    ///
    /// # Errors
    ///
    /// Fails without returning partial results if the base directory is
    /// missing, a source cannot be read, frontmatter is malformed, or two
    /// sources produce the same slug.
    pub fn build(&self, spec: &TreeSpec) -> Result<Vec<Document>, TreeError> {
        let start = Instant::now();
        let paths = self
            .storage
            .list_markdown(&spec.base, &spec.excluded_dirs)
            .map_err(|source| TreeError::Storage {
                path: spec.base.clone(),
                base: spec.base.clone(),
                source,
            })?;

        let documents = paths
            .par_iter()
            .map(|path| self.load_document(spec, path))
            .collect::<Result<Vec<_>, _>>()?;

        check_unique_slugs(&documents)?;
        let documents = sort::sorted(documents);

        tracing::debug!(
            base = %spec.base.display(),
            version = %spec.version,
            category = %spec.category,
            document_count = documents.len(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Built document tree"
        );

        Ok(documents)
    }

    fn load_document(&self, spec: &TreeSpec, path: &Path) -> Result<Document, TreeError> {
        let raw = self.storage.read(path).map_err(|source| TreeError::Storage {
            path: path.to_path_buf(),
            base: spec.base.clone(),
            source,
        })?;
        let (frontmatter, body) =
            split_frontmatter(&raw).map_err(|source| TreeError::Frontmatter {
                path: path.to_path_buf(),
                base: spec.base.clone(),
                source,
            })?;

        let rel = path.strip_prefix(&spec.base).unwrap_or(path);
        let identity = Identity::derive(spec, rel);

        Ok(Document {
            slug: identity.slug,
            version: slug::normalize_version(&spec.version).to_owned(),
            category: spec.category,
            file_path: rel.to_path_buf(),
            file_title: identity.file_title,
            file_absolute_path: self.storage.resolve(path),
            is_index: identity.is_index,
            parent_slug: identity.parent_slug,
            title: frontmatter.title.unwrap_or(identity.title),
            content: body.to_owned(),
            order: identity.order,
            optional_feature: None,
            summary: frontmatter.summary,
            icon: frontmatter.icon,
            icon_brand: frontmatter.icon_brand,
            introduction: frontmatter.introduction,
            hide_children: frontmatter.hide_children,
            hide_self: frontmatter.hide_self,
            unhide_self: frontmatter.unhide_self,
            extra: frontmatter.extra,
        })
    }
}

/// Path-derived identity of one source.
struct Identity {
    slug: String,
    parent_slug: String,
    file_title: String,
    title: String,
    order: Option<u32>,
    is_index: bool,
}

impl Identity {
    /// Derive identity from a path relative to the tree base.
    fn derive(spec: &TreeSpec, rel: &Path) -> Self {
        let mut dirs: Vec<String> = rel
            .components()
            .filter_map(|c| match c {
                Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        let file_name = dirs.pop().unwrap_or_default();
        let stem = Path::new(&file_name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let is_index = stem == "index";
        let is_root_index = is_index && dirs.is_empty();
        let marker = spec.feature_marker.as_deref();

        // Index files name themselves after their directory
        let name = if is_index {
            dirs.last()
                .cloned()
                .or_else(|| base_name(&spec.base))
                .unwrap_or_else(|| stem.clone())
        } else {
            stem.clone()
        };

        let dir_path = dirs.join("/");
        let slug_path = if is_index {
            dir_path.clone()
        } else {
            join_path(&dir_path, &stem)
        };
        let slug = slug::derive_slug(&slug_path, &spec.version, marker);

        let parent_slug = if is_root_index {
            spec.root_parent_slug.clone().unwrap_or_else(|| slug.clone())
        } else if is_index {
            let parent_dir = dirs[..dirs.len() - 1].join("/");
            slug::derive_slug(&parent_dir, &spec.version, marker)
        } else {
            slug::derive_slug(&dir_path, &spec.version, marker)
        };

        let title = slug::derive_title(&stem, is_index.then_some(name.as_str()));

        Self {
            slug,
            parent_slug,
            file_title: slug::strip_order_prefix(&name).to_owned(),
            title,
            order: slug::derive_order(&name),
            is_index,
        }
    }
}

fn base_name(base: &Path) -> Option<String> {
    base.file_name().map(|n| n.to_string_lossy().into_owned())
}

fn join_path(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_owned()
    } else {
        format!("{dir}/{name}")
    }
}

fn check_unique_slugs(documents: &[Document]) -> Result<(), TreeError> {
    let mut seen: HashMap<&str, &Path> = HashMap::with_capacity(documents.len());
    for doc in documents {
        if let Some(first) = seen.insert(&doc.slug, &doc.file_path) {
            return Err(TreeError::DuplicateSlug {
                slug: doc.slug.clone(),
                first: first.to_path_buf(),
                second: doc.file_path.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use docgraph_storage::{FsStorage, MockStorage};
    use pretty_assertions::assert_eq;

    use super::*;

    fn find<'d>(docs: &'d [Document], slug: &str) -> &'d Document {
        docs.iter()
            .find(|d| d.slug == slug)
            .unwrap_or_else(|| panic!("missing {slug}"))
    }

    fn getting_started() -> MockStorage {
        MockStorage::new()
            .with_file("docs/v6/index.md", "---\ntitle: Home\n---\nWelcome")
            .with_file("docs/v6/01_getting_started/index.md", "# Getting started")
            .with_file(
                "docs/v6/01_getting_started/01_installation.md",
                "---\ntitle: Install it\nhideSelf: true\n---\nSteps",
            )
    }

    #[test]
    fn test_build_round_trip_fixture() {
        let storage = getting_started();
        let spec = TreeSpec::new("docs/v6", "6", Category::Docs);

        let docs = TreeBuilder::new(&storage).build(&spec).unwrap();

        assert_eq!(docs.len(), 3);

        let root = find(&docs, "/en/6/");
        assert!(root.is_index);
        assert_eq!(root.parent_slug, "/en/6/");
        assert_eq!(root.title, "Home");
        assert_eq!(root.content, "Welcome");

        let folder = find(&docs, "/en/6/getting-started/");
        assert!(folder.is_index);
        assert_eq!(folder.parent_slug, "/en/6/");
        assert_eq!(folder.order, Some(1));
        assert_eq!(folder.file_title, "getting_started");
        assert_eq!(folder.title, "Getting Started");

        let page = find(&docs, "/en/6/getting-started/installation/");
        assert!(!page.is_index);
        assert_eq!(page.parent_slug, folder.slug);
        assert_eq!(page.title, "Install it");
        assert!(page.hide_self);
        assert_eq!(page.file_path, PathBuf::from("01_getting_started/01_installation.md"));
        assert_eq!(
            page.file_absolute_path,
            PathBuf::from("/mock/docs/v6/01_getting_started/01_installation.md")
        );
    }

    #[test]
    fn test_build_sorts_result() {
        let storage = MockStorage::new()
            .with_file("docs/v6/index.md", "")
            .with_file("docs/v6/02_b.md", "")
            .with_file("docs/v6/01_a.md", "")
            .with_file("docs/v6/10_c.md", "");
        let spec = TreeSpec::new("docs/v6", "6", Category::Docs);

        let docs = TreeBuilder::new(&storage).build(&spec).unwrap();
        let slugs: Vec<_> = docs.iter().map(|d| d.slug.as_str()).collect();

        assert_eq!(slugs, vec!["/en/6/a/", "/en/6/b/", "/en/6/c/", "/en/6/"]);
    }

    #[test]
    fn test_root_index_title_uses_base_name() {
        let storage = MockStorage::new().with_file("docs/v6/index.md", "");
        let spec = TreeSpec::new("docs/v6", "6", Category::Docs);

        let docs = TreeBuilder::new(&storage).build(&spec).unwrap();

        assert_eq!(docs[0].file_title, "v6");
        assert_eq!(docs[0].title, "V6");
    }

    #[test]
    fn test_root_parent_override_applies_to_root_index_only() {
        let storage = MockStorage::new()
            .with_file("docs/v6/optional_features/index.md", "")
            .with_file("docs/v6/optional_features/ldap/index.md", "")
            .with_file("docs/v6/optional_features/ldap/setup.md", "");
        let spec = TreeSpec::new("docs/v6/optional_features", "6", Category::Docs)
            .with_feature_marker("optional_features")
            .with_root_parent("/en/6/");

        let docs = TreeBuilder::new(&storage).build(&spec).unwrap();

        assert_eq!(find(&docs, "/en/6/optional_features/").parent_slug, "/en/6/");
        assert_eq!(
            find(&docs, "/en/6/optional_features/ldap/").parent_slug,
            "/en/6/optional_features/"
        );
        assert_eq!(
            find(&docs, "/en/6/optional_features/ldap/setup/").parent_slug,
            "/en/6/optional_features/ldap/"
        );
    }

    #[test]
    fn test_mixed_case_feature_marker_yields_lowercase_slugs() {
        let storage = MockStorage::new()
            .with_file("docs/v6/Optional_Features/index.md", "")
            .with_file("docs/v6/Optional_Features/ldap/index.md", "");
        let spec = TreeSpec::new("docs/v6/Optional_Features", "6", Category::Docs)
            .with_feature_marker("Optional_Features");

        let docs = TreeBuilder::new(&storage).build(&spec).unwrap();
        let slugs: Vec<_> = docs.iter().map(|d| d.slug.as_str()).collect();

        assert_eq!(
            slugs,
            vec!["/en/6/optional_features/", "/en/6/optional_features/ldap/"]
        );
        assert!(docs.iter().all(|d| d.slug == d.slug.to_lowercase()));
    }

    #[test]
    fn test_thematic_breaks_after_blank_line_are_body() {
        let content = "\n---\n\nSome text\n\n---\n\nMore text\n";
        let storage = MockStorage::new().with_file("docs/v6/page.md", content);
        let spec = TreeSpec::new("docs/v6", "6", Category::Docs);

        let docs = TreeBuilder::new(&storage).build(&spec).unwrap();

        assert_eq!(docs[0].slug, "/en/6/page/");
        assert_eq!(docs[0].content, content);
    }

    #[test]
    fn test_frontmatter_never_overrides_identity() {
        let storage = MockStorage::new().with_file(
            "docs/v6/page.md",
            "---\nslug: /hijack/\nparentSlug: /elsewhere/\norder: 99\n---\n",
        );
        let spec = TreeSpec::new("docs/v6", "6", Category::Docs);

        let docs = TreeBuilder::new(&storage).build(&spec).unwrap();

        assert_eq!(docs[0].slug, "/en/6/page/");
        assert_eq!(docs[0].parent_slug, "/en/6/");
        assert_eq!(docs[0].order, None);
        assert_eq!(docs[0].extra.get("slug").map(String::as_str), Some("/hijack/"));
    }

    #[test]
    fn test_excluded_dirs_are_skipped() {
        let storage = MockStorage::new()
            .with_file("docs/v6/index.md", "")
            .with_file("docs/v6/legacy/old.md", "")
            .with_file("docs/v6/optional_features/ldap/index.md", "");
        let spec = TreeSpec::new("docs/v6", "6", Category::Docs)
            .with_excluded_dirs(vec!["legacy".to_owned(), "optional_features".to_owned()]);

        let docs = TreeBuilder::new(&storage).build(&spec).unwrap();

        assert_eq!(docs.len(), 1);
    }

    #[test]
    fn test_missing_base_fails() {
        let storage = getting_started();
        let spec = TreeSpec::new("docs/v9", "9", Category::Docs);

        let err = TreeBuilder::new(&storage).build(&spec).unwrap_err();

        assert!(matches!(err, TreeError::Storage { ref source, .. } if source.is_not_found()));
        assert!(err.to_string().contains("docs/v9"));
    }

    #[test]
    fn test_unreadable_file_fails_whole_tree() {
        let storage = getting_started().with_unreadable("docs/v6/broken.md");
        let spec = TreeSpec::new("docs/v6", "6", Category::Docs);

        let err = TreeBuilder::new(&storage).build(&spec).unwrap_err();

        assert!(err.to_string().contains("docs/v6/broken.md"));
    }

    #[test]
    fn test_malformed_frontmatter_names_path() {
        let storage = getting_started().with_file("docs/v6/bad.md", "---\ntitle: [oops\n---\n");
        let spec = TreeSpec::new("docs/v6", "6", Category::Docs);

        let err = TreeBuilder::new(&storage).build(&spec).unwrap_err();

        assert!(matches!(err, TreeError::Frontmatter { .. }));
        assert!(err.to_string().contains("docs/v6/bad.md"));
        assert!(err.to_string().contains("while building docs/v6"));
    }

    #[test]
    fn test_duplicate_slug_fails() {
        let storage = MockStorage::new()
            .with_file("docs/v6/Foo_Bar.md", "")
            .with_file("docs/v6/foo-bar.md", "");
        let spec = TreeSpec::new("docs/v6", "6", Category::Docs);

        let err = TreeBuilder::new(&storage).build(&spec).unwrap_err();

        match err {
            TreeError::DuplicateSlug { slug, first, second } => {
                assert_eq!(slug, "/en/6/foo-bar/");
                assert_eq!(first, PathBuf::from("Foo_Bar.md"));
                assert_eq!(second, PathBuf::from("foo-bar.md"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_version_prefix_is_stripped() {
        let storage = MockStorage::new().with_file("docs/v5/guide.md", "");
        let spec = TreeSpec::new("docs/v5", "v5", Category::User);

        let docs = TreeBuilder::new(&storage).build(&spec).unwrap();

        assert_eq!(docs[0].slug, "/en/5/guide/");
        assert_eq!(docs[0].version, "5");
        assert_eq!(docs[0].category, Category::User);
    }

    #[test]
    fn test_build_from_filesystem() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("v6/02_admin")).unwrap();
        fs::write(root.join("v6/index.md"), "# Home").unwrap();
        fs::write(root.join("v6/02_admin/index.md"), "---\ntitle: Admin\n---\n").unwrap();
        fs::write(root.join("v6/02_admin/users.md"), "Users").unwrap();

        let storage = FsStorage::new(root.to_path_buf());
        let spec = TreeSpec::new("v6", "6", Category::Docs);
        let docs = TreeBuilder::new(&storage).build(&spec).unwrap();

        let users = find(&docs, "/en/6/admin/users/");
        assert_eq!(users.parent_slug, "/en/6/admin/");
        assert_eq!(users.file_absolute_path, root.join("v6/02_admin/users.md"));
        assert_eq!(find(&docs, "/en/6/admin/").title, "Admin");
    }
}
