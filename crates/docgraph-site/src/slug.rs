//! Path to identity derivation.
//!
//! Pure functions that turn relative source paths into slugs, titles and
//! explicit ordering numbers. Every document identity in the graph flows
//! through here, so the rules must stay deterministic:
//!
//! - `01_Getting_Started` → segment `getting-started`, order `1`, title `Getting Started`
//! - `v6` + `01_guide/02_setup` → `/en/6/guide/setup/`
//! - feature marker `optional_features` is inserted after the version, lowercased
//!   but otherwise untouched

use std::sync::LazyLock;

use regex::Regex;

/// Locale prefix of every slug.
pub const LOCALE: &str = "en";

static ORDER_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)_.").expect("invalid order prefix regex"));

/// Strip a leading `NN_` ordering prefix from a name.
///
/// Names without a prefix are returned unchanged. A prefix with nothing after
/// it (`01_`) is not a prefix and stays part of the name.
#[must_use]
pub fn strip_order_prefix(name: &str) -> &str {
    ORDER_PREFIX
        .captures(name)
        .and_then(|caps| caps.get(1))
        .map_or(name, |digits| &name[digits.end() + 1..])
}

/// Explicit order from a `NN_` prefix (`01_Foo` → `Some(1)`).
///
/// Returns `None` when the prefix is absent or does not fit in `u32`.
#[must_use]
pub fn derive_order(name: &str) -> Option<u32> {
    ORDER_PREFIX
        .captures(name)
        .and_then(|caps| caps.get(1))
        .and_then(|digits| digits.as_str().parse().ok())
}

/// Normalize a name for matching.
///
/// Hyphens and underscores become spaces and the result is lowercased, so
/// `How_Tos`, `how-tos` and `How Tos` compare equal.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    name.replace(['-', '_'], " ").to_lowercase()
}

/// Slug form of a single path segment.
#[must_use]
pub fn slug_segment(segment: &str) -> String {
    strip_order_prefix(segment).to_lowercase().replace('_', "-")
}

/// Version without a leading `v`.
#[must_use]
pub fn normalize_version(version: &str) -> &str {
    version.strip_prefix('v').unwrap_or(version)
}

/// Derive the canonical slug for a relative directory path.
///
/// The path is split on `/` and `\`, empty segments are dropped and every
/// remaining segment goes through [`slug_segment`]. The feature marker, when
/// given, is placed right after the version. It is lowercased so slugs stay
/// lowercase, but its underscores are kept.
///
/// ```
/// use docgraph_site::derive_slug;
///
/// assert_eq!(derive_slug("01_Guide/02_Setup", "v6", None), "/en/6/guide/setup/");
/// assert_eq!(derive_slug("", "6", None), "/en/6/");
/// assert_eq!(
///     derive_slug("ldap", "6", Some("optional_features")),
///     "/en/6/optional_features/ldap/"
/// );
/// ```
#[must_use]
pub fn derive_slug(dir_path: &str, version: &str, feature_marker: Option<&str>) -> String {
    let mut slug = format!("/{LOCALE}/{}/", normalize_version(version));
    if let Some(marker) = feature_marker {
        slug.push_str(&marker.to_lowercase());
        slug.push('/');
    }
    for segment in dir_path.split(['/', '\\']).filter(|s| !s.is_empty()) {
        slug.push_str(&slug_segment(segment));
        slug.push('/');
    }
    slug
}

/// Join already-normalized URL segments into a slug without transforming them.
///
/// Used for route parameter lookups where the segments come from a slug.
#[must_use]
pub fn join_slug<S: AsRef<str>>(version: &str, segments: &[S]) -> String {
    let mut slug = format!("/{LOCALE}/{}/", normalize_version(version));
    for segment in segments.iter().map(AsRef::as_ref) {
        let segment = segment.trim_matches('/');
        if !segment.is_empty() {
            slug.push_str(segment);
            slug.push('/');
        }
    }
    slug
}

/// Derive a human title from a file name.
///
/// Index files use their parent directory name when one is supplied. The
/// order prefix is stripped, underscores become spaces and each word is
/// capitalized naively (first letter upper, rest lower).
#[must_use]
pub fn derive_title(file_name: &str, parent_dir_name: Option<&str>) -> String {
    let basis = match parent_dir_name {
        Some(parent) if file_name == "index" => parent,
        _ => file_name,
    };

    strip_order_prefix(basis)
        .replace('_', " ")
        .split_whitespace()
        .map(capitalize_word)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Slug segment that immediately follows `marker`, if any.
///
/// `/en/6/optional_features/ldap/setup/` with marker `optional_features`
/// yields `ldap`. The marker is matched in its slug (lowercase) form.
#[must_use]
pub fn segment_after<'a>(slug: &'a str, marker: &str) -> Option<&'a str> {
    let marker = marker.to_lowercase();
    let mut segments = slug.split('/').filter(|s| !s.is_empty());
    segments.find(|s| *s == marker)?;
    segments.next()
}
