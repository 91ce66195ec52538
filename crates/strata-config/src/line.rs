//! Structured source lines.
//!
//! Every stage of the pipeline works on [`Line`] values instead of raw text:
//! the indentation column is kept apart from the content so that re-indenting
//! a block is plain column arithmetic.

use crate::error::{CascadeError, Result};
use std::fmt;

/// One physical row of a cascade source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// Column of the first non-space character
    pub indent: usize,
    /// Text after the indentation, without trailing whitespace
    pub content: String,
    /// Index of the cascade source this row belongs to
    pub origin: usize,
}

impl Line {
    pub fn new(indent: usize, content: impl Into<String>, origin: usize) -> Self {
        Self {
            indent,
            content: content.into(),
            origin,
        }
    }

    /// Parse a raw text row.
    ///
    /// Fails if the indentation contains a tab, since tabs have no defined
    /// column width.
    pub fn parse(raw: &str, origin: usize) -> Result<Self> {
        let content = raw.trim_start_matches([' ', '\t']);
        let leading = &raw[..raw.len() - content.len()];
        if leading.contains('\t') {
            return Err(CascadeError::TabIndentation {
                line: raw.to_string(),
            });
        }
        Ok(Self::new(leading.len(), content.trim_end(), origin))
    }

    /// `- item` rows (and a bare `-`) start or continue a block sequence.
    pub fn is_list_item(&self) -> bool {
        self.content == "-" || self.content.starts_with("- ")
    }

    /// Split into key and the rest of the row (starting at the `:`).
    pub fn key_value(&self) -> Option<(&str, &str)> {
        key_separator(&self.content).map(|colon| self.content.split_at(colon))
    }

    /// Copy of this row moved `delta` columns, clamped at column 0.
    pub fn shifted(&self, delta: isize) -> Line {
        Line {
            indent: self.indent.saturating_add_signed(delta),
            content: self.content.clone(),
            origin: self.origin,
        }
    }

    pub fn with_origin(mut self, origin: usize) -> Line {
        self.origin = origin;
        self
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:width$}{}", "", self.content, width = self.indent)
    }
}

/// Render rows back to text, one per line.
pub fn render_lines(lines: &[Line]) -> String {
    lines
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Byte offset of the `:` that ends the key of `content`.
///
/// The key ends at the first colon followed by whitespace or the end of the
/// row. Colons inside quoted spans do not count; if a quote is left open the
/// first plain colon is used so the sanitizer can report the broken key.
pub fn key_separator(content: &str) -> Option<usize> {
    let bytes = content.as_bytes();
    let ends_key = |i: usize| matches!(bytes.get(i + 1), None | Some(b' ') | Some(b'\t'));

    let mut quote: Option<u8> = None;
    for (i, &b) in bytes.iter().enumerate() {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'\'' => quote = Some(b),
            None if b == b':' && ends_key(i) => return Some(i),
            None => {}
        }
    }

    if quote.is_some() {
        return (0..bytes.len()).find(|&i| bytes[i] == b':' && ends_key(i));
    }
    None
}

/// True when the value part of a key row opens a literal or folded block scalar.
pub fn opens_block_scalar(rest: &str) -> bool {
    let value = rest.trim_start_matches(':').trim();
    let mut value = value.split(" #").next().unwrap_or(value).trim_end();
    // Anchor and tag properties may precede the indicator.
    while value.starts_with(['&', '!']) {
        value = value.split_once(' ').map_or("", |(_, after)| after.trim_start());
    }
    !value.is_empty()
        && (value.starts_with('|') || value.starts_with('>'))
        && value[1..]
            .chars()
            .all(|c| c == '-' || c == '+' || c.is_ascii_digit())
}

/// Marks the rows that belong to a block scalar body.
///
/// A body is every row below a `key: |` (or `>`) row that is indented deeper
/// than the key. Body rows are text, not structure.
pub fn block_scalar_rows(lines: &[Line]) -> Vec<bool> {
    let mut owner: Option<usize> = None;
    lines
        .iter()
        .map(|line| {
            if let Some(indent) = owner {
                if line.indent > indent {
                    return true;
                }
                owner = None;
            }
            if line.key_value().is_some_and(|(_, rest)| opens_block_scalar(rest)) {
                owner = Some(line.indent);
            }
            false
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_measures_indent() {
        let line = Line::parse("    key: value  ", 3).unwrap();
        assert_eq!(line.indent, 4);
        assert_eq!(line.content, "key: value");
        assert_eq!(line.origin, 3);
    }

    #[test]
    fn test_parse_rejects_tab_indentation() {
        let err = Line::parse("  \tkey: value", 0).unwrap_err();
        assert!(matches!(err, CascadeError::TabIndentation { .. }));
    }

    #[test]
    fn test_display_round_trip() {
        let line = Line::parse("      ccc:", 0).unwrap();
        assert_eq!(line.to_string(), "      ccc:");
    }

    #[test]
    fn test_shifted_clamps_at_zero() {
        let line = Line::new(2, "a: 1", 0);
        assert_eq!(line.shifted(4).indent, 6);
        assert_eq!(line.shifted(-2).indent, 0);
        assert_eq!(line.shifted(-5).indent, 0);
    }

    #[test]
    fn test_key_separator() {
        assert_eq!(key_separator("key: value"), Some(3));
        assert_eq!(key_separator("key:"), Some(3));
        assert_eq!(key_separator("url: http://example.com"), Some(3));
        assert_eq!(key_separator("\"a: b\": c"), Some(6));
        assert_eq!(key_separator("- \"not: a key\""), None);
        assert_eq!(key_separator("just text"), None);
        assert_eq!(key_separator("key:value"), None);
    }

    #[test]
    fn test_key_separator_with_open_quote() {
        assert_eq!(key_separator("\"a.b: 1"), Some(4));
    }

    #[test]
    fn test_is_list_item() {
        assert!(Line::new(0, "- a", 0).is_list_item());
        assert!(Line::new(4, "-", 0).is_list_item());
        assert!(!Line::new(0, "-a: 1", 0).is_list_item());
    }

    #[test]
    fn test_opens_block_scalar() {
        assert!(opens_block_scalar(": |"));
        assert!(opens_block_scalar(": >-"));
        assert!(opens_block_scalar(": |2 # comment"));
        assert!(!opens_block_scalar(": > not a block"));
        assert!(!opens_block_scalar(": value"));
        assert!(!opens_block_scalar(":"));
        assert!(opens_block_scalar(": &text |"));
        assert!(opens_block_scalar(": !!str >-"));
        assert!(!opens_block_scalar(": &text"));
    }

    #[test]
    fn test_block_scalar_rows() {
        let lines = vec![
            Line::new(0, "script: |", 0),
            Line::new(2, "run: &cmd", 0),
            Line::new(4, "nested", 0),
            Line::new(0, "next: 1", 0),
            Line::new(2, "child: 2", 0),
        ];
        assert_eq!(block_scalar_rows(&lines), vec![false, true, true, false, false]);
    }
}
