//! Navigation queries over a [`Snapshot`].
//!
//! Every query returns freshly sorted, owned documents. Nothing handed out
//! points back into the snapshot.

use crate::document::Document;
use crate::slug::normalize_name;
use crate::sort;
use crate::store::Snapshot;

/// Which children a filtered query keeps.
///
/// Names are matched against `file_title` after [`normalize_name`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ChildrenFilter {
    /// Children of the named child folder instead of the document's own.
    Folder(String),
    /// Every child except the listed names.
    Exclude(Vec<String>),
    /// Only the listed names.
    Only(Vec<String>),
    /// Plain children.
    #[default]
    Default,
}

impl ChildrenFilter {
    /// Resolve possibly overlapping settings: folder > exclude > only > default.
    #[must_use]
    pub fn from_parts(folder_name: Option<&str>, exclude: &[String], only: &[String]) -> Self {
        if let Some(folder) = folder_name.filter(|f| !f.is_empty()) {
            Self::Folder(folder.to_owned())
        } else if !exclude.is_empty() {
            Self::Exclude(exclude.to_vec())
        } else if !only.is_empty() {
            Self::Only(only.to_vec())
        } else {
            Self::Default
        }
    }
}

/// Options for [`Hierarchy::get_children_filtered`].
///
/// Several filters may be set at once; only the highest-precedence one
/// applies (see [`ChildrenFilter::from_parts`]).
#[derive(Clone, Debug, Default)]
pub struct ChildrenOptions {
    pub folder_name: Option<String>,
    pub exclude: Vec<String>,
    pub only: Vec<String>,
    pub include_folders: bool,
    /// Reverse the final list.
    pub reverse: bool,
}

impl ChildrenOptions {
    /// Effective filter after precedence.
    #[must_use]
    pub fn filter(&self) -> ChildrenFilter {
        ChildrenFilter::from_parts(self.folder_name.as_deref(), &self.exclude, &self.only)
    }
}

/// Hierarchy queries borrowing one category snapshot.
pub struct Hierarchy<'a> {
    snapshot: &'a Snapshot,
}

impl<'a> Hierarchy<'a> {
    #[must_use]
    pub fn new(snapshot: &'a Snapshot) -> Self {
        Self { snapshot }
    }

    /// Children of a folder document.
    ///
    /// Non-index documents never have children. Child folders are included
    /// only when `include_folders` is set.
    #[must_use]
    pub fn get_children(&self, doc: &Document, include_folders: bool) -> Vec<Document> {
        if !doc.is_index {
            return Vec::new();
        }
        let children = self
            .snapshot
            .with_parent(&doc.slug)
            .filter(|child| child.slug != doc.slug)
            .filter(|child| include_folders || !child.is_index)
            .cloned()
            .collect();
        sort::sorted(children)
    }

    /// Every document sharing `doc`'s parent, `doc` included.
    #[must_use]
    pub fn get_siblings(&self, doc: &Document) -> Vec<Document> {
        let siblings = self
            .snapshot
            .with_parent(&doc.parent_slug)
            .cloned()
            .collect();
        sort::sorted(siblings)
    }

    /// Children with folder, exclude or only filtering.
    #[must_use]
    pub fn get_children_filtered(&self, doc: &Document, options: &ChildrenOptions) -> Vec<Document> {
        self.children_matching(doc, &options.filter(), options.include_folders, options.reverse)
    }

    /// Apply a resolved filter. `reverse` runs last regardless of the filter.
    #[must_use]
    pub fn children_matching(
        &self,
        doc: &Document,
        filter: &ChildrenFilter,
        include_folders: bool,
        reverse: bool,
    ) -> Vec<Document> {
        let mut children = match filter {
            ChildrenFilter::Folder(name) => {
                let wanted = normalize_name(name);
                self.get_children(doc, true)
                    .into_iter()
                    .find(|child| child.is_index && normalize_name(&child.file_title) == wanted)
                    .map(|folder| self.get_children(&folder, include_folders))
                    .unwrap_or_default()
            }
            ChildrenFilter::Exclude(names) => {
                let names = normalized(names);
                self.get_children(doc, include_folders)
                    .into_iter()
                    .filter(|child| !names.contains(&normalize_name(&child.file_title)))
                    .collect()
            }
            ChildrenFilter::Only(names) => {
                let names = normalized(names);
                self.get_children(doc, include_folders)
                    .into_iter()
                    .filter(|child| names.contains(&normalize_name(&child.file_title)))
                    .collect()
            }
            ChildrenFilter::Default => self.get_children(doc, include_folders),
        };

        if reverse {
            children.reverse();
        }
        children
    }
}

fn normalized(names: &[String]) -> Vec<String> {
    names.iter().map(|n| normalize_name(n.trim())).collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use docgraph_storage::MockStorage;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::document::Category;
    use crate::store::{DocumentStore, StoreConfig};
    use crate::testing::titles;

    fn snapshot() -> Arc<Snapshot> {
        let storage = MockStorage::new()
            .with_file("docs/v6/index.md", "")
            .with_file("docs/v6/01_guide/index.md", "")
            .with_file("docs/v6/01_guide/01_intro.md", "")
            .with_file("docs/v6/01_guide/02_setup.md", "")
            .with_file("docs/v6/01_guide/03_faq.md", "")
            .with_file("docs/v6/01_guide/04_how-tos/index.md", "")
            .with_file("docs/v6/01_guide/04_how-tos/01_backup.md", "")
            .with_file("docs/v6/01_guide/04_how-tos/02_restore.md", "")
            .with_file("docs/v6/01_guide/04_how-tos/deep/index.md", "")
            .with_file("docs/v6/02_reference.md", "");
        let config = StoreConfig {
            versions: vec!["6".to_owned()],
            ..StoreConfig::default()
        };
        DocumentStore::new(Arc::new(storage), config)
            .snapshot(Category::Docs)
            .unwrap()
    }

    fn get(snapshot: &Snapshot, slug: &str) -> Document {
        snapshot.get(slug).cloned().unwrap()
    }

    #[test]
    fn test_get_children_files_only() {
        let snapshot = snapshot();
        let hierarchy = Hierarchy::new(&snapshot);
        let guide = get(&snapshot, "/en/6/guide/");

        let children = hierarchy.get_children(&guide, false);

        assert_eq!(titles(&children), vec!["intro", "setup", "faq"]);
    }

    #[test]
    fn test_get_children_with_folders() {
        let snapshot = snapshot();
        let hierarchy = Hierarchy::new(&snapshot);
        let guide = get(&snapshot, "/en/6/guide/");

        let children = hierarchy.get_children(&guide, true);

        assert_eq!(titles(&children), vec!["intro", "setup", "faq", "how-tos"]);
    }

    #[test]
    fn test_root_is_not_its_own_child() {
        let snapshot = snapshot();
        let hierarchy = Hierarchy::new(&snapshot);
        let root = get(&snapshot, "/en/6/");

        let children = hierarchy.get_children(&root, true);

        assert!(children.iter().all(|c| c.slug != "/en/6/"));
        assert_eq!(titles(&children), vec!["guide", "reference"]);
    }

    #[test]
    fn test_non_index_has_no_children() {
        let snapshot = snapshot();
        let hierarchy = Hierarchy::new(&snapshot);

        for doc in snapshot.documents().iter().filter(|d| !d.is_index) {
            assert!(hierarchy.get_children(doc, false).is_empty());
            assert!(hierarchy.get_children(doc, true).is_empty());
            assert!(
                hierarchy
                    .get_children_filtered(
                        doc,
                        &ChildrenOptions {
                            include_folders: true,
                            ..Default::default()
                        }
                    )
                    .is_empty()
            );
        }
    }

    #[test]
    fn test_get_siblings_includes_self() {
        let snapshot = snapshot();
        let hierarchy = Hierarchy::new(&snapshot);
        let setup = get(&snapshot, "/en/6/guide/setup/");

        let siblings = hierarchy.get_siblings(&setup);

        assert_eq!(titles(&siblings), vec!["intro", "setup", "faq", "how-tos"]);
    }

    #[test]
    fn test_folder_name_is_normalized() {
        let snapshot = snapshot();
        let hierarchy = Hierarchy::new(&snapshot);
        let guide = get(&snapshot, "/en/6/guide/");

        let results: Vec<_> = ["How_Tos", "How-Tos", "How Tos"]
            .into_iter()
            .map(|name| {
                hierarchy.get_children_filtered(
                    &guide,
                    &ChildrenOptions {
                        folder_name: Some(name.to_owned()),
                        ..Default::default()
                    },
                )
            })
            .collect();

        assert_eq!(titles(&results[0]), vec!["backup", "restore"]);
        assert_eq!(results[0], results[1]);
        assert_eq!(results[1], results[2]);
    }

    #[test]
    fn test_folder_name_missing_yields_nothing() {
        let snapshot = snapshot();
        let hierarchy = Hierarchy::new(&snapshot);
        let guide = get(&snapshot, "/en/6/guide/");

        let children = hierarchy.get_children_filtered(
            &guide,
            &ChildrenOptions {
                folder_name: Some("nowhere".to_owned()),
                ..Default::default()
            },
        );

        assert!(children.is_empty());
    }

    #[test]
    fn test_folder_filter_respects_include_folders() {
        let snapshot = snapshot();
        let hierarchy = Hierarchy::new(&snapshot);
        let guide = get(&snapshot, "/en/6/guide/");

        let children = hierarchy.get_children_filtered(
            &guide,
            &ChildrenOptions {
                folder_name: Some("how tos".to_owned()),
                include_folders: true,
                ..Default::default()
            },
        );

        assert_eq!(titles(&children), vec!["backup", "restore", "deep"]);
    }

    #[test]
    fn test_exclude() {
        let snapshot = snapshot();
        let hierarchy = Hierarchy::new(&snapshot);
        let guide = get(&snapshot, "/en/6/guide/");

        let children = hierarchy.get_children_filtered(
            &guide,
            &ChildrenOptions {
                exclude: vec!["FAQ".to_owned(), " setup ".to_owned()],
                ..Default::default()
            },
        );

        assert_eq!(titles(&children), vec!["intro"]);
    }

    #[test]
    fn test_only() {
        let snapshot = snapshot();
        let hierarchy = Hierarchy::new(&snapshot);
        let guide = get(&snapshot, "/en/6/guide/");

        let children = hierarchy.get_children_filtered(
            &guide,
            &ChildrenOptions {
                only: vec!["faq".to_owned(), "How_Tos".to_owned()],
                include_folders: true,
                ..Default::default()
            },
        );

        assert_eq!(titles(&children), vec!["faq", "how-tos"]);
    }

    #[test]
    fn test_precedence_folder_over_exclude_over_only() {
        let snapshot = snapshot();
        let hierarchy = Hierarchy::new(&snapshot);
        let guide = get(&snapshot, "/en/6/guide/");

        let all_set = ChildrenOptions {
            folder_name: Some("how-tos".to_owned()),
            exclude: vec!["backup".to_owned()],
            only: vec!["restore".to_owned()],
            ..Default::default()
        };
        assert_eq!(
            titles(&hierarchy.get_children_filtered(&guide, &all_set)),
            vec!["backup", "restore"]
        );

        let exclude_and_only = ChildrenOptions {
            exclude: vec!["intro".to_owned()],
            only: vec!["intro".to_owned()],
            ..Default::default()
        };
        assert_eq!(
            titles(&hierarchy.get_children_filtered(&guide, &exclude_and_only)),
            vec!["setup", "faq"]
        );
    }

    #[test]
    fn test_reverse_applies_last() {
        let snapshot = snapshot();
        let hierarchy = Hierarchy::new(&snapshot);
        let guide = get(&snapshot, "/en/6/guide/");

        let plain = hierarchy.get_children_filtered(
            &guide,
            &ChildrenOptions {
                reverse: true,
                ..Default::default()
            },
        );
        let excluded = hierarchy.get_children_filtered(
            &guide,
            &ChildrenOptions {
                exclude: vec!["setup".to_owned()],
                reverse: true,
                ..Default::default()
            },
        );

        assert_eq!(titles(&plain), vec!["faq", "setup", "intro"]);
        assert_eq!(titles(&excluded), vec!["faq", "intro"]);
    }

    #[test]
    fn test_filter_from_parts() {
        assert_eq!(
            ChildrenFilter::from_parts(Some(""), &["a".to_owned()], &[]),
            ChildrenFilter::Exclude(vec!["a".to_owned()])
        );
        assert_eq!(ChildrenFilter::from_parts(None, &[], &[]), ChildrenFilter::Default);
    }
}
