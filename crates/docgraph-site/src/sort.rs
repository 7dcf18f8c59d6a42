//! Sibling ordering.
//!
//! Documents are ordered by, in turn:
//!
//! 1. explicit `NN_` order when both sides carry one, folders before files on ties
//! 2. containing directory of the source
//! 3. explicit order before no order
//! 4. file title, numeric-aware for plain numbers and semver titles
//! 5. absolute source path, then slug
//!
//! Steps 1 to 3 are not transitive for every mix of ordered folders and
//! unordered files, so the input is first put into a canonical path order and
//! then merge-sorted. The output depends only on the set of documents, never on
//! the order they were listed in.

use std::cmp::Ordering;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::document::Document;

static SEMVER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d+\.\d+\.\d+(-(alpha|beta|rc)\d*)?$").expect("invalid semver regex")
});

/// Return a sorted copy of `docs`. The input is left untouched.
#[must_use]
pub fn sort_documents(docs: &[Document]) -> Vec<Document> {
    sorted(docs.to_vec())
}

/// Sort an owned list.
pub(crate) fn sorted(mut docs: Vec<Document>) -> Vec<Document> {
    // Canonical starting order so the result depends only on the set of documents
    docs.sort_by(|a, b| {
        a.file_absolute_path
            .cmp(&b.file_absolute_path)
            .then_with(|| a.slug.cmp(&b.slug))
    });
    merge_sort_by(docs, &compare_documents)
}

/// Compare two documents for display order.
#[must_use]
pub fn compare_documents(a: &Document, b: &Document) -> Ordering {
    if let (Some(order_a), Some(order_b)) = (a.order, b.order) {
        let by_order = order_a
            .cmp(&order_b)
            .then_with(|| b.is_index.cmp(&a.is_index));
        if by_order.is_ne() {
            return by_order;
        }
    }

    let by_dir = collate(
        &directory_of(&a.file_absolute_path),
        &directory_of(&b.file_absolute_path),
    );
    if by_dir.is_ne() {
        return by_dir;
    }

    match (a.order, b.order) {
        (Some(_), None) => return Ordering::Less,
        (None, Some(_)) => return Ordering::Greater,
        _ => {}
    }

    compare_titles(&a.file_title, &b.file_title)
        .then_with(|| a.file_absolute_path.cmp(&b.file_absolute_path))
        .then_with(|| a.slug.cmp(&b.slug))
}

fn directory_of(path: &Path) -> String {
    path.parent()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn compare_titles(a: &str, b: &str) -> Ordering {
    let both_numeric = is_number(a) && is_number(b);
    let both_semver = SEMVER.is_match(a) && SEMVER.is_match(b);
    if both_numeric || both_semver {
        natural_cmp(a, b)
    } else {
        collate(a, b)
    }
}

fn is_number(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Case-insensitive comparison with lowercase-before-uppercase on ties.
///
/// Falls back to code point order so that distinct strings never compare
/// equal.
pub(crate) fn collate(a: &str, b: &str) -> Ordering {
    let folded_a = a.chars().flat_map(char::to_lowercase);
    let folded_b = b.chars().flat_map(char::to_lowercase);
    folded_a
        .cmp(folded_b)
        .then_with(|| lowercase_first(a, b))
        .then_with(|| a.cmp(b))
}

fn lowercase_first(a: &str, b: &str) -> Ordering {
    a.chars()
        .zip(b.chars())
        .find(|(x, y)| x != y)
        .map_or(Ordering::Equal, |(x, y)| {
            match (x.is_lowercase(), y.is_lowercase()) {
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                _ => Ordering::Equal,
            }
        })
}

/// Compare strings treating runs of ASCII digits as numbers.
///
/// `"2.0.0"` sorts before `"10.0.0"` and `"1.0.0-beta2"` before `"1.0.0-beta10"`.
pub(crate) fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut rest_a = a;
    let mut rest_b = b;
    loop {
        match (rest_a.is_empty(), rest_b.is_empty()) {
            (true, true) => return a.cmp(b),
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            (false, false) => {}
        }

        let (chunk_a, tail_a) = split_chunk(rest_a);
        let (chunk_b, tail_b) = split_chunk(rest_b);
        let ord = if is_number(chunk_a) && is_number(chunk_b) {
            compare_digits(chunk_a, chunk_b)
        } else {
            collate(chunk_a, chunk_b)
        };
        if ord.is_ne() {
            return ord;
        }
        rest_a = tail_a;
        rest_b = tail_b;
    }
}

/// Split off a leading run of digits or a leading run of non-digits.
fn split_chunk(s: &str) -> (&str, &str) {
    let digit = s.starts_with(|c: char| c.is_ascii_digit());
    let end = s
        .find(|c: char| c.is_ascii_digit() != digit)
        .unwrap_or(s.len());
    s.split_at(end)
}

fn compare_digits(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Stable top-down merge sort.
///
/// `slice::sort_by` may panic when a comparator is not a strict total order,
/// and the mixed order/directory rules above can be intransitive for unusual
/// sibling names. A plain merge never panics and stays stable.
fn merge_sort_by<T>(mut items: Vec<T>, cmp: &impl Fn(&T, &T) -> Ordering) -> Vec<T> {
    if items.len() <= 1 {
        return items;
    }
    let right = items.split_off(items.len() / 2);
    let left = merge_sort_by(items, cmp);
    let right = merge_sort_by(right, cmp);

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();
    loop {
        let take_right = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => cmp(r, l).is_lt(),
            (Some(_), None) => false,
            (None, Some(_)) => true,
            (None, None) => break,
        };
        let next = if take_right { right.next() } else { left.next() };
        merged.extend(next);
    }
    merged
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::testing::{doc, titles};

    #[test]
    fn test_explicit_order_is_numeric() {
        let docs = vec![
            doc("03_third.md"),
            doc("01_first.md"),
            doc("10_tenth.md"),
            doc("02_second.md"),
        ];

        let sorted = sort_documents(&docs);

        assert_eq!(titles(&sorted), vec!["first", "second", "third", "tenth"]);
    }

    #[test]
    fn test_sort_does_not_mutate_input() {
        let docs = vec![doc("02_b.md"), doc("01_a.md")];
        let before = docs.clone();

        let _ = sort_documents(&docs);

        assert_eq!(docs, before);
    }

    #[test]
    fn test_sort_is_idempotent() {
        let docs = vec![
            doc("zeta.md"),
            doc("02_guide/index.md"),
            doc("Alpha.md"),
            doc("01_intro.md"),
            doc("alpha.md"),
        ];

        let once = sort_documents(&docs);
        let twice = sort_documents(&once);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_sort_is_independent_of_input_order() {
        let docs = vec![
            doc("b.md"),
            doc("01_x/index.md"),
            doc("a.md"),
            doc("02_y.md"),
            doc("1.0.0.md"),
        ];
        let mut reversed = docs.clone();
        reversed.reverse();

        assert_eq!(sort_documents(&docs), sort_documents(&reversed));
    }

    #[test]
    fn test_folder_before_file_on_equal_order() {
        let docs = vec![doc("01_setup.md"), doc("01_setup/index.md")];

        let sorted = sort_documents(&docs);

        assert!(sorted[0].is_index);
        assert!(!sorted[1].is_index);
    }

    #[test]
    fn test_ordered_before_unordered_in_same_directory() {
        let docs = vec![doc("aardvark.md"), doc("05_zebra.md")];

        let sorted = sort_documents(&docs);

        assert_eq!(titles(&sorted), vec!["zebra", "aardvark"]);
    }

    #[test]
    fn test_semver_titles_sort_numerically() {
        let docs = vec![doc("3.2.1.md"), doc("1.0.0.md"), doc("10.0.0.md"), doc("2.0.0.md")];

        let sorted = sort_documents(&docs);

        assert_eq!(titles(&sorted), vec!["1.0.0", "2.0.0", "3.2.1", "10.0.0"]);
    }

    #[test]
    fn test_semver_prerelease_titles() {
        let docs = vec![doc("1.0.0-rc10.md"), doc("1.0.0-rc2.md")];

        let sorted = sort_documents(&docs);

        assert_eq!(titles(&sorted), vec!["1.0.0-rc2", "1.0.0-rc10"]);
    }

    #[test]
    fn test_plain_numeric_titles_sort_numerically() {
        let docs = vec![doc("10.md"), doc("9.md"), doc("100.md")];

        let sorted = sort_documents(&docs);

        assert_eq!(titles(&sorted), vec!["9", "10", "100"]);
    }

    #[test]
    fn test_mixed_titles_use_collation() {
        let docs = vec![doc("item10.md"), doc("item9.md"), doc("Beta.md"), doc("alpha.md")];

        let sorted = sort_documents(&docs);

        // No numeric awareness outside number and semver titles
        assert_eq!(titles(&sorted), vec!["alpha", "Beta", "item10", "item9"]);
    }

    #[test]
    fn test_unordered_folders_sort_by_directory() {
        let docs = vec![doc("zeta/index.md"), doc("Alpha/index.md"), doc("beta/index.md")];

        let sorted = sort_documents(&docs);

        assert_eq!(titles(&sorted), vec!["Alpha", "beta", "zeta"]);
    }

    #[test]
    fn test_collate() {
        assert_eq!(collate("apple", "Banana"), Ordering::Less);
        assert_eq!(collate("apple", "Apple"), Ordering::Less);
        assert_eq!(collate("Apple", "apple"), Ordering::Greater);
        assert_eq!(collate("same", "same"), Ordering::Equal);
    }

    #[test]
    fn test_natural_cmp() {
        assert_eq!(natural_cmp("2", "10"), Ordering::Less);
        assert_eq!(natural_cmp("2.0.0", "10.0.0"), Ordering::Less);
        assert_eq!(natural_cmp("1.10.0", "1.9.0"), Ordering::Greater);
        assert_eq!(natural_cmp("007", "7"), Ordering::Less);
    }

    #[test]
    fn test_merge_sort_is_stable() {
        let items = vec![(1, 'a'), (0, 'b'), (1, 'c'), (0, 'd')];

        let sorted = merge_sort_by(items, &|x: &(i32, char), y: &(i32, char)| x.0.cmp(&y.0));

        assert_eq!(sorted, vec![(0, 'b'), (0, 'd'), (1, 'a'), (1, 'c')]);
    }
}
