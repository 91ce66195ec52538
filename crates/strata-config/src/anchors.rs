//! Anchor extraction.
//!
//! An anchor is declared with `key: &name` and owns every following row that
//! is indented deeper than the declaring row. Anchors are collected across
//! the whole concatenated cascade, so a later file can alias an anchor
//! declared by an earlier one.

use crate::error::{CascadeError, Result};
use crate::line::{Line, block_scalar_rows, key_separator};
use indexmap::IndexMap;
use std::collections::HashSet;
use std::ops::Range;

/// A named block of rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub name: String,
    /// Column of the declaring row
    pub indent: usize,
    /// Rows owned by the anchor, at their original columns
    pub block: Vec<Line>,
}

impl Anchor {
    /// Columns between the declaring row and its block (2 when the block is empty).
    pub fn step(&self) -> usize {
        self.block
            .first()
            .map(|line| line.indent.saturating_sub(self.indent))
            .filter(|step| *step > 0)
            .unwrap_or(2)
    }
}

/// Anchors by name, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnchorMap {
    anchors: IndexMap<String, Anchor>,
}

impl AnchorMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Anchor> {
        self.anchors.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.anchors.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Anchor> {
        self.anchors.values()
    }

    /// Add an anchor.
    ///
    /// A second declaration of a name appends its rows to the first one,
    /// shifted so they sit at the columns they would have under the first
    /// declaring row.
    pub fn declare(&mut self, anchor: Anchor) {
        match self.anchors.get_mut(&anchor.name) {
            Some(existing) => {
                let delta = existing.indent as isize - anchor.indent as isize;
                existing
                    .block
                    .extend(anchor.block.iter().map(|line| line.shifted(delta)));
            }
            None => {
                self.anchors.insert(anchor.name.clone(), anchor);
            }
        }
    }

    /// Reject anchors that reach themselves through other anchors.
    fn check_cycles(&self) -> Result<()> {
        let mut done = HashSet::new();
        for name in self.anchors.keys() {
            let mut chain = Vec::new();
            self.visit(name, &mut chain, &mut done)?;
        }
        Ok(())
    }

    fn visit<'a>(
        &'a self,
        name: &'a str,
        chain: &mut Vec<&'a str>,
        done: &mut HashSet<&'a str>,
    ) -> Result<()> {
        if done.contains(name) {
            return Ok(());
        }
        let Some(anchor) = self.anchors.get(name) else {
            return Ok(());
        };

        chain.push(name);
        let body = block_scalar_rows(&anchor.block);
        for (line, _) in anchor.block.iter().zip(body).filter(|(_, body)| !body) {
            let Some(site) = AliasSite::parse(&line.content) else {
                continue;
            };
            let target = site.name();
            if chain.contains(&target) {
                return Err(CascadeError::CircularReference {
                    anchor: target.to_string(),
                    line: line.to_string(),
                });
            }
            self.visit(target, chain, done)?;
        }
        chain.pop();
        done.insert(name);
        Ok(())
    }
}

/// A row that refers to an anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasSite<'a> {
    /// `<<: *name`
    Merge { name: &'a str },
    /// `key: *name`
    Inline { key: &'a str, name: &'a str },
}

impl<'a> AliasSite<'a> {
    /// A trailing `# comment` after the alias is allowed.
    pub fn parse(content: &'a str) -> Option<Self> {
        if let Some(rest) = content.strip_prefix("<<:") {
            let name = alias_name(rest)?;
            return Some(AliasSite::Merge { name });
        }

        let colon = key_separator(content)?;
        let (key, rest) = content.split_at(colon);
        let name = alias_name(&rest[1..])?;
        Some(AliasSite::Inline { key, name })
    }

    pub fn name(&self) -> &'a str {
        match self {
            AliasSite::Merge { name } | AliasSite::Inline { name, .. } => name,
        }
    }

    pub fn is_merge(&self) -> bool {
        matches!(self, AliasSite::Merge { .. })
    }
}

/// Name of the `*name` alias that makes up `value`.
fn alias_name(value: &str) -> Option<&str> {
    let rest = value.trim().strip_prefix('*')?;
    let (name, trailing) = rest.split_at(rest.find(char::is_whitespace).unwrap_or(rest.len()));
    let trailing = trailing.trim_start();
    if name.is_empty() || !(trailing.is_empty() || trailing.starts_with('#')) {
        return None;
    }
    Some(name)
}

/// Name and byte range of a `&name` marker in the value part of a row.
fn anchor_marker(content: &str) -> Option<(&str, Range<usize>)> {
    let colon = key_separator(content)?;
    let value = &content[colon + 1..];
    let offset = colon + 1 + (value.len() - value.trim_start().len());
    let declared = content[offset..].strip_prefix('&')?;
    let len = declared
        .find(char::is_whitespace)
        .unwrap_or(declared.len());
    if len == 0 {
        return None;
    }
    Some((&declared[..len], offset..offset + 1 + len))
}

/// Name of the anchor declared on this row, if any.
pub fn declared_anchor(line: &Line) -> Option<&str> {
    anchor_marker(&line.content).map(|(name, _)| name)
}

/// Copy of the row with its `&name` marker removed.
pub fn strip_anchor(line: &Line) -> Line {
    let Some((_, range)) = anchor_marker(&line.content) else {
        return line.clone();
    };
    let before = line.content[..range.start].trim_end();
    let after = line.content[range.end..].trim_start();
    let content = if after.is_empty() {
        before.to_string()
    } else {
        format!("{before} {after}")
    };
    Line::new(line.indent, content, line.origin)
}

/// Remove every `&name` marker outside block scalar bodies.
pub fn strip_anchors(lines: &[Line]) -> Vec<Line> {
    lines
        .iter()
        .zip(block_scalar_rows(lines))
        .map(|(line, body)| if body { line.clone() } else { strip_anchor(line) })
        .collect()
}

/// Collect every anchor block in `lines`.
///
/// Fails with [`CascadeError::CircularReference`] when a block aliases its
/// own anchor, or when anchors alias each other in a loop. In a redeclared
/// anchor a `<<: *name` row refers to the content accumulated so far and is
/// dropped instead.
pub fn retrieve_anchors(lines: &[Line]) -> Result<AnchorMap> {
    let mut anchors = AnchorMap::new();
    let body = block_scalar_rows(lines);

    for (index, line) in lines.iter().enumerate() {
        if body[index] {
            continue;
        }
        let Some(name) = declared_anchor(line) else {
            continue;
        };
        let redeclared = anchors.contains(name);

        let mut block = Vec::new();
        for (inner, in_body) in lines[index + 1..].iter().zip(&body[index + 1..]) {
            if inner.indent <= line.indent {
                break;
            }
            if *in_body {
                block.push(inner.clone());
                continue;
            }
            if let Some(site) = AliasSite::parse(&inner.content) {
                if site.name() == name {
                    if redeclared && site.is_merge() {
                        continue;
                    }
                    return Err(CascadeError::CircularReference {
                        anchor: name.to_string(),
                        line: inner.to_string(),
                    });
                }
            }
            block.push(strip_anchor(inner));
        }

        tracing::debug!(anchor = name, rows = block.len(), redeclared, "Found anchor");
        anchors.declare(Anchor {
            name: name.to_string(),
            indent: line.indent,
            block,
        });
    }

    anchors.check_cycles()?;
    Ok(anchors)
}
