//! Document record and category namespace.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Serialize;

/// Separate document namespace. Documents of different categories never link.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Administrator and developer documentation.
    Docs,
    /// End-user documentation.
    User,
}

impl Category {
    /// All categories in display order.
    pub const ALL: [Self; 2] = [Self::Docs, Self::User];

    /// Lowercase name as used in configuration.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Docs => "docs",
            Self::User => "user",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown category name.
#[derive(Debug, thiserror::Error)]
#[error("unknown category '{0}', expected 'docs' or 'user'")]
pub struct ParseCategoryError(String);

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "docs" => Ok(Self::Docs),
            "user" => Ok(Self::User),
            other => Err(ParseCategoryError(other.to_owned())),
        }
    }
}

/// A single markdown source with its derived identity.
///
/// Identity fields (`slug`, `parent_slug`, `order`, `file_title`) are computed
/// from the source path. Frontmatter never overrides them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[allow(clippy::struct_excessive_bools)]
pub struct Document {
    /// Canonical identifier, e.g. `/en/6/getting-started/`.
    pub slug: String,
    /// Major version without a leading `v`.
    pub version: String,
    pub category: Category,
    /// Source path relative to its content root.
    pub file_path: PathBuf,
    /// File stem (or parent directory for index files), order prefix stripped.
    pub file_title: String,
    /// Full backend location of the source.
    pub file_absolute_path: PathBuf,
    /// Source is an `index.md` folder page.
    pub is_index: bool,
    pub parent_slug: String,
    pub title: String,
    /// Markdown body with frontmatter removed.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
    /// Feature module name for documents from an optional feature subtree.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optional_feature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub introduction: Option<String>,
    pub hide_children: bool,
    pub hide_self: bool,
    pub unhide_self: bool,
    /// Frontmatter keys without a dedicated field.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl Document {
    /// Root of its tree: the document is its own parent.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent_slug == self.slug
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_category_round_trip_names() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>().unwrap(), category);
        }
    }

    #[test]
    fn test_category_parse_unknown() {
        let err = "admin".parse::<Category>().unwrap_err();

        assert!(err.to_string().contains("admin"));
    }

    #[test]
    fn test_document_serializes_camel_case() {
        let doc = Document {
            slug: "/en/6/guide/".to_owned(),
            version: "6".to_owned(),
            category: Category::User,
            file_path: PathBuf::from("01_guide/index.md"),
            file_title: "guide".to_owned(),
            file_absolute_path: PathBuf::from("/content/user/v6/01_guide/index.md"),
            is_index: true,
            parent_slug: "/en/6/".to_owned(),
            title: "Guide".to_owned(),
            content: String::new(),
            order: Some(1),
            optional_feature: None,
            summary: None,
            icon: None,
            icon_brand: None,
            introduction: None,
            hide_children: false,
            hide_self: false,
            unhide_self: false,
            extra: BTreeMap::new(),
        };

        let json = serde_json::to_value(&doc).unwrap();

        assert_eq!(json["parentSlug"], "/en/6/");
        assert_eq!(json["isIndex"], true);
        assert_eq!(json["category"], "user");
        assert_eq!(json["order"], 1);
        assert!(json.get("optionalFeature").is_none());
        assert!(json.get("content").is_none());
    }
}
