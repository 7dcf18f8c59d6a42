//! Shared fixtures for unit tests.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::document::{Category, Document};
use crate::slug;

/// Build a `docs` document for version 6 from a path below `/content/v6`.
///
/// Identity fields follow the same rules as the tree builder, which keeps the
/// sorter and hierarchy tests independent of storage.
pub(crate) fn doc(rel_path: &str) -> Document {
    let path = PathBuf::from(rel_path);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let dir = path
        .parent()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default();
    let dir_name = dir.rsplit('/').next().unwrap_or_default().to_owned();
    let is_index = stem == "index";

    let (slug_path, name, parent_path) = if is_index {
        let parent = dir.rsplit_once('/').map(|(p, _)| p.to_owned()).unwrap_or_default();
        (dir.clone(), dir_name.clone(), parent)
    } else if dir.is_empty() {
        (stem.clone(), stem.clone(), dir.clone())
    } else {
        (format!("{dir}/{stem}"), stem.clone(), dir.clone())
    };

    let slug = slug::derive_slug(&slug_path, "6", None);
    let parent_slug = if is_index && dir.is_empty() {
        slug.clone()
    } else {
        slug::derive_slug(&parent_path, "6", None)
    };

    Document {
        slug,
        version: "6".to_owned(),
        category: Category::Docs,
        file_path: path.clone(),
        file_title: slug::strip_order_prefix(&name).to_owned(),
        file_absolute_path: PathBuf::from("/content/v6").join(&path),
        is_index,
        parent_slug,
        title: slug::derive_title(&stem, Some(&dir_name).filter(|d| !d.is_empty()).map(String::as_str)),
        content: String::new(),
        order: slug::derive_order(&name),
        optional_feature: None,
        summary: None,
        icon: None,
        icon_brand: None,
        introduction: None,
        hide_children: false,
        hide_self: false,
        unhide_self: false,
        extra: BTreeMap::new(),
    }
}

/// File titles of `docs`, in order.
pub(crate) fn titles(docs: &[Document]) -> Vec<&str> {
    docs.iter().map(|d| d.file_title.as_str()).collect()
}
