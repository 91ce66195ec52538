//! Reading sources and sanitizing keys.
//!
//! Quoted keys may contain characters the flattener would otherwise read as
//! path separators. The sanitizer swaps those characters for private-use
//! placeholders before flattening; [`expand_key`] and [`restore_key`] swap
//! them back once the key has been split into segments.

use crate::error::{CascadeError, Result};
use crate::line::{Line, block_scalar_rows, key_separator, opens_block_scalar};
use crate::types::{QUOTED_DOT, QUOTED_SEPARATOR, Separator, USER_DOT};

/// Blank rows, `#` comment rows and `---` document markers carry no content.
pub fn is_ignorable(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed.is_empty() || trimmed.starts_with('#') || trimmed == "---"
}

/// Split one source into structured rows, dropping blank and comment rows.
///
/// Inside a block scalar body every row is kept. Blank body rows are placed
/// one column right of the owning key so they stay inside the body.
pub fn read_source(text: &str, origin: usize) -> Result<Vec<Line>> {
    let mut lines = Vec::new();
    let mut block_scalar: Option<usize> = None;

    for raw in text.lines() {
        if let Some(indent) = block_scalar {
            if raw.trim().is_empty() {
                lines.push(Line::new(indent + 1, "", origin));
                continue;
            }
            let line = Line::parse(raw, origin)?;
            if line.indent > indent {
                lines.push(line);
                continue;
            }
            block_scalar = None;
        }

        if is_ignorable(raw) {
            continue;
        }
        let line = Line::parse(raw, origin)?;
        if line.key_value().is_some_and(|(_, rest)| opens_block_scalar(rest)) {
            block_scalar = Some(line.indent);
        }
        lines.push(line);
    }

    Ok(lines)
}

/// Escape dots (and separator characters) in quoted keys and mark unquoted
/// dots as user dots.
///
/// Rows inside a block scalar body are left untouched.
pub fn sanitize(lines: &[Line], separator: Separator) -> Result<Vec<Line>> {
    let mut sanitized = Vec::with_capacity(lines.len());

    for (line, body) in lines.iter().zip(block_scalar_rows(lines)) {
        if body {
            sanitized.push(line.clone());
            continue;
        }
        let Some(colon) = key_separator(&line.content) else {
            sanitized.push(line.clone());
            continue;
        };

        let (key, rest) = line.content.split_at(colon);
        let key = sanitize_key(key, line, separator)?;
        sanitized.push(Line::new(line.indent, format!("{key}{rest}"), line.origin));
    }

    Ok(sanitized)
}

fn sanitize_key(key: &str, line: &Line, separator: Separator) -> Result<String> {
    let mut sanitized = String::with_capacity(key.len());
    let mut rest = key;

    while let Some(start) = rest.find(['"', '\'']) {
        let quote = rest[start..].chars().next().unwrap_or('"');
        let after = &rest[start + 1..];
        let Some(len) = after.find(quote) else {
            return Err(CascadeError::UnclosedQuote {
                line: line.to_string(),
            });
        };

        let quoted = &after[..len];
        let other = if quote == '"' { '\'' } else { '"' };
        if quoted.contains(other) {
            return Err(CascadeError::NestedQuotes {
                line: line.to_string(),
            });
        }

        push_unquoted(&mut sanitized, &rest[..start]);
        push_quoted(&mut sanitized, quoted, separator);
        rest = &after[len + 1..];
    }

    push_unquoted(&mut sanitized, rest);
    Ok(sanitized)
}

fn push_unquoted(out: &mut String, text: &str) {
    out.extend(text.chars().map(|c| if c == '.' { USER_DOT } else { c }));
}

fn push_quoted(out: &mut String, text: &str, separator: Separator) {
    out.extend(text.chars().map(|c| match c {
        '.' => QUOTED_DOT,
        c if c == separator.as_char() => QUOTED_SEPARATOR,
        c => c,
    }));
}

/// Turn a single key segment (or a nested mapping key) back into its literal text.
pub fn restore_key(segment: &str, separator: Separator) -> String {
    segment
        .chars()
        .map(|c| match c {
            QUOTED_DOT | USER_DOT => '.',
            QUOTED_SEPARATOR => separator.as_char(),
            c => c,
        })
        .collect()
}

/// Split a flattened key into its literal path segments.
///
/// User dots become real dots before splitting, so with the default `.`
/// separator `a.b` nests while `"a.b"` stays one segment.
pub fn expand_key(key: &str, separator: Separator) -> Vec<String> {
    let key: String = key
        .chars()
        .map(|c| if c == USER_DOT { '.' } else { c })
        .collect();
    key.split(separator.as_char())
        .map(|segment| restore_key(segment, separator))
        .collect()
}

/// Make placeholders visible for display.
pub fn reveal_placeholders(text: &str) -> String {
    text.replace(USER_DOT, "_DOT__DOT_")
        .replace(QUOTED_DOT, "_DOT_")
        .replace(QUOTED_SEPARATOR, "_SEP_")
}
