//! YAML frontmatter splitting.
//!
//! A markdown source may start with a YAML mapping fenced by `---` lines:
//!
//! ```text
//! ---
//! title: Installing
//! hideChildren: true
//! owner: platform-team
//! ---
//! # Body starts here
//! ```
//!
//! Known keys are lifted into typed fields of [`Frontmatter`]; every other key
//! is kept as a string in [`Frontmatter::extra`].

use std::collections::BTreeMap;

use serde_yaml::Value;

/// Errors emitted while splitting or parsing frontmatter.
#[derive(Debug, thiserror::Error)]
pub enum FrontmatterError {
    /// Opening fence without a closing `---` line.
    #[error("unterminated YAML frontmatter block: expected closing '---'")]
    Unterminated,
    /// YAML failed to parse.
    #[error("frontmatter parse error: {0}")]
    Parse(#[source] serde_yaml::Error),
    /// Top-level YAML node was not a mapping.
    #[error("frontmatter must be a YAML mapping at the top level")]
    InvalidRootType,
}

/// Metadata block of a markdown source.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Frontmatter {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub introduction: Option<String>,
    pub icon: Option<String>,
    pub icon_brand: Option<String>,
    pub hide_children: bool,
    pub hide_self: bool,
    pub unhide_self: bool,
    /// Every key not listed above, stringified.
    pub extra: BTreeMap<String, String>,
}

/// Split raw markdown into frontmatter and body.
///
/// Sources without an opening fence yield an empty [`Frontmatter`] and the
/// full input as body. The opening fence must be the first line; only a UTF-8
/// BOM may precede it.
///
/// # Errors
///
/// Returns [`FrontmatterError`] when the fence is not closed, the YAML is
/// malformed, or the YAML root is not a mapping.
pub fn split_frontmatter(input: &str) -> Result<(Frontmatter, &str), FrontmatterError> {
    let Some((block, body_start)) = find_yaml_block(input)? else {
        return Ok((Frontmatter::default(), input));
    };
    let frontmatter = parse_yaml_block(block)?;
    Ok((frontmatter, &input[body_start..]))
}

fn parse_yaml_block(block: &str) -> Result<Frontmatter, FrontmatterError> {
    if block.trim().is_empty() {
        return Ok(Frontmatter::default());
    }

    let value: Value = serde_yaml::from_str(block).map_err(FrontmatterError::Parse)?;
    let mapping = match value {
        Value::Null => return Ok(Frontmatter::default()),
        Value::Mapping(mapping) => mapping,
        _ => return Err(FrontmatterError::InvalidRootType),
    };

    let mut frontmatter = Frontmatter::default();
    for (key, value) in mapping {
        let Some(key) = scalar_to_string(&key) else {
            continue;
        };
        match key.as_str() {
            "title" => frontmatter.title = scalar_to_string(&value),
            "summary" => frontmatter.summary = scalar_to_string(&value),
            "introduction" => frontmatter.introduction = scalar_to_string(&value),
            "icon" => frontmatter.icon = scalar_to_string(&value),
            "iconBrand" => frontmatter.icon_brand = scalar_to_string(&value),
            "hideChildren" => frontmatter.hide_children = is_truthy(&value),
            "hideSelf" => frontmatter.hide_self = is_truthy(&value),
            "unhideSelf" => frontmatter.unhide_self = is_truthy(&value),
            _ => {
                frontmatter.extra.insert(key, stringify(&value));
            }
        }
    }
    Ok(frontmatter)
}

/// String form of a scalar YAML value. `None` for null and collections.
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

/// Stringify any YAML value for the `extra` map.
///
/// Collections are rendered as compact JSON.
fn stringify(value: &Value) -> String {
    scalar_to_string(value).unwrap_or_else(|| match value {
        Value::Null => String::new(),
        other => serde_json::to_string(other).unwrap_or_default(),
    })
}

/// Locate the fenced YAML block.
///
/// Returns the block text and the byte offset where the body begins.
fn find_yaml_block(input: &str) -> Result<Option<(&str, usize)>, FrontmatterError> {
    let bom_len = if input.starts_with('\u{feff}') {
        '\u{feff}'.len_utf8()
    } else {
        0
    };

    let Some((first, block_start)) = next_line(input, bom_len) else {
        return Ok(None);
    };
    if !is_fence(first) {
        return Ok(None);
    }

    let mut scan = block_start;
    while let Some((line, after)) = next_line(input, scan) {
        if is_fence(line) {
            let block = input[block_start..scan].trim_end_matches(['\r', '\n']);
            return Ok(Some((block, after)));
        }
        scan = after;
    }
    Err(FrontmatterError::Unterminated)
}

fn next_line(input: &str, start: usize) -> Option<(&str, usize)> {
    if start >= input.len() {
        return None;
    }
    match input[start..].find('\n') {
        Some(pos) => Some((&input[start..start + pos], start + pos + 1)),
        None => Some((&input[start..], input.len())),
    }
}

fn is_fence(line: &str) -> bool {
    line.trim_end_matches('\r') == "---"
}
