//! `[CHILDREN ...]` marker parsing.
//!
//! Markdown bodies may embed a listing of the current folder's children:
//!
//! ```text
//! [CHILDREN]
//! [CHILDREN folder="How_Tos" reverse]
//! [CHILDREN exclude="faq, changelog" includeFolders]
//! [CHILDREN only='install' includeFolders=false]
//! ```
//!
//! This module only turns the marker text into a [`ChildrenMarker`]; producing
//! HTML from the resulting children is left to the renderer.

use std::ops::Range;

use crate::document::Document;
use crate::hierarchy::{ChildrenFilter, Hierarchy};

const OPENING: &str = "[CHILDREN";

/// Error returned for a malformed marker.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarkerError {
    #[error("marker must start with '[CHILDREN'")]
    NotAMarker,
    #[error("marker is missing its closing ']'")]
    Unterminated,
    #[error("unterminated quoted value for '{0}'")]
    UnterminatedQuote(String),
    #[error("unknown marker attribute '{0}'")]
    UnknownAttribute(String),
    #[error("marker attribute '{0}' requires a value")]
    MissingValue(String),
    #[error("invalid value '{value}' for marker attribute '{name}'")]
    InvalidValue { name: String, value: String },
    #[error("unexpected character '{0}' in marker")]
    UnexpectedChar(char),
}

/// Parsed marker settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChildrenMarker {
    pub filter: ChildrenFilter,
    pub include_folders: bool,
    pub reverse: bool,
}

impl ChildrenMarker {
    /// Children of `doc` selected by this marker.
    #[must_use]
    pub fn query(&self, hierarchy: &Hierarchy<'_>, doc: &Document) -> Vec<Document> {
        hierarchy.children_matching(doc, &self.filter, self.include_folders, self.reverse)
    }
}

/// A marker found in content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerMatch {
    /// Byte range of the marker text, brackets included.
    pub range: Range<usize>,
    pub marker: Result<ChildrenMarker, MarkerError>,
}

/// Parse a single marker such as `[CHILDREN folder="x" reverse]`.
///
/// Surrounding whitespace is ignored. Anything after the closing bracket is
/// an error.
///
/// # Errors
///
/// Returns [`MarkerError`] describing the first problem found.
pub fn parse_marker(input: &str) -> Result<ChildrenMarker, MarkerError> {
    let input = input.trim();
    let rest = input.strip_prefix(OPENING).ok_or(MarkerError::NotAMarker)?;
    if !opens_marker(rest) {
        return Err(MarkerError::NotAMarker);
    }

    let mut parser = Parser::new(rest);
    let attributes = parser.attributes()?;
    if let Some(c) = parser.remaining().trim_start().chars().next() {
        return Err(MarkerError::UnexpectedChar(c));
    }
    build_marker(attributes)
}

/// Locate every marker in `content`.
///
/// Malformed markers are reported in place so callers can surface them.
/// An unterminated marker extends to the end of the content.
#[must_use]
pub fn find_markers(content: &str) -> Vec<MarkerMatch> {
    let mut found = Vec::new();
    let mut offset = 0;

    while let Some(pos) = content[offset..].find(OPENING) {
        let start = offset + pos;
        let after = &content[start + OPENING.len()..];
        if !opens_marker(after) {
            offset = start + OPENING.len();
            continue;
        }

        let mut parser = Parser::new(after);
        let marker = parser.attributes().and_then(build_marker);
        let end = match &marker {
            Err(MarkerError::Unterminated | MarkerError::UnterminatedQuote(_)) => content.len(),
            _ => start + OPENING.len() + parser.pos,
        };
        found.push(MarkerMatch {
            range: start..end,
            marker,
        });
        offset = end.max(start + OPENING.len());
    }

    found
}

/// `[CHILDREN` must be followed by whitespace, `]` or the end of input.
fn opens_marker(rest: &str) -> bool {
    rest.is_empty() || rest.starts_with(|c: char| c == ']' || c.is_whitespace())
}

/// Raw attribute: name and optional value.
type Attribute = (String, Option<String>);

fn build_marker(attributes: Vec<Attribute>) -> Result<ChildrenMarker, MarkerError> {
    let mut folder = None;
    let mut exclude = Vec::new();
    let mut only = Vec::new();
    let mut marker = ChildrenMarker::default();

    for (name, value) in attributes {
        match name.to_ascii_lowercase().as_str() {
            "folder" | "foldername" => folder = Some(require_value(&name, value)?),
            "exclude" => exclude = split_list(&require_value(&name, value)?),
            "only" => only = split_list(&require_value(&name, value)?),
            "includefolders" => marker.include_folders = flag_value(&name, value)?,
            "reverse" => marker.reverse = flag_value(&name, value)?,
            _ => return Err(MarkerError::UnknownAttribute(name)),
        }
    }

    marker.filter = ChildrenFilter::from_parts(folder.as_deref(), &exclude, &only);
    Ok(marker)
}

fn require_value(name: &str, value: Option<String>) -> Result<String, MarkerError> {
    value.ok_or_else(|| MarkerError::MissingValue(name.to_owned()))
}

fn flag_value(name: &str, value: Option<String>) -> Result<bool, MarkerError> {
    match value.as_deref() {
        None => Ok(true),
        Some(v) if v.eq_ignore_ascii_case("true") => Ok(true),
        Some(v) if v.eq_ignore_ascii_case("false") => Ok(false),
        Some(v) => Err(MarkerError::InvalidValue {
            name: name.to_owned(),
            value: v.to_owned(),
        }),
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Cursor over the text following `[CHILDREN`.
struct Parser<'s> {
    src: &'s str,
    pos: usize,
}

impl<'s> Parser<'s> {
    fn new(src: &'s str) -> Self {
        Self { src, pos: 0 }
    }

    fn remaining(&self) -> &'s str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'s str {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.bump();
        }
        &self.src[start..self.pos]
    }

    /// Parse attributes up to and including the closing `]`.
    fn attributes(&mut self) -> Result<Vec<Attribute>, MarkerError> {
        let mut attributes = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                None => return Err(MarkerError::Unterminated),
                Some(']') => {
                    self.bump();
                    return Ok(attributes);
                }
                Some(c) if c.is_ascii_alphabetic() => {
                    let name = self
                        .take_while(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
                        .to_owned();
                    self.skip_whitespace();
                    let value = if self.peek() == Some('=') {
                        self.bump();
                        self.skip_whitespace();
                        Some(self.value(&name)?)
                    } else {
                        None
                    };
                    attributes.push((name, value));
                }
                Some(c) => return Err(MarkerError::UnexpectedChar(c)),
            }
        }
    }

    fn value(&mut self, name: &str) -> Result<String, MarkerError> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.bump();
                let value = self.take_while(|c| c != quote).to_owned();
                if self.bump().is_none() {
                    return Err(MarkerError::UnterminatedQuote(name.to_owned()));
                }
                Ok(value)
            }
            _ => {
                let value = self.take_while(|c| !c.is_whitespace() && c != ']');
                if value.is_empty() {
                    Err(MarkerError::MissingValue(name.to_owned()))
                } else {
                    Ok(value.to_owned())
                }
            }
        }
    }
}
