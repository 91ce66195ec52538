//! Alias resolution.
//!
//! Merge keys (`<<: *name`) are replaced by the anchor's block; inline
//! aliases (`key: *name`) keep their key and get the block nested under it.
//! Aliases inside anchor blocks are expanded before the block is spliced, so
//! the output contains no alias of any depth.

use crate::anchors::{AliasSite, Anchor, AnchorMap};
use crate::error::{CascadeError, Result};
use crate::line::{Line, block_scalar_rows};

/// Anchors may alias other anchors at most this deep.
pub const MAX_ALIAS_DEPTH: usize = 64;

/// Replace every alias in `lines` with the block of the anchor it names.
pub fn replace_aliases(lines: &[Line], anchors: &AnchorMap) -> Result<Vec<Line>> {
    let mut out = Vec::with_capacity(lines.len());
    let mut stack = Vec::new();
    expand(lines, anchors, &mut stack, &mut out)?;
    Ok(out)
}

fn expand<'a>(
    lines: &[Line],
    anchors: &'a AnchorMap,
    stack: &mut Vec<&'a str>,
    out: &mut Vec<Line>,
) -> Result<()> {
    for (line, body) in lines.iter().zip(block_scalar_rows(lines)) {
        if body {
            out.push(line.clone());
            continue;
        }
        let Some(site) = AliasSite::parse(&line.content) else {
            out.push(line.clone());
            continue;
        };

        let anchor = anchors
            .get(site.name())
            .ok_or_else(|| CascadeError::UnknownAlias {
                alias: site.name().to_string(),
                line: line.to_string(),
            })?;

        let delta = match site {
            AliasSite::Merge { .. } => {
                line.indent as isize - anchor.indent as isize - anchor.step() as isize
            }
            AliasSite::Inline { key, .. } => {
                let column = line.indent + list_marker_width(key);
                out.push(Line::new(line.indent, format!("{key}:"), line.origin));
                column as isize - anchor.indent as isize
            }
        };

        for spliced in resolved_block(anchor, line, anchors, stack)? {
            out.push(spliced.shifted(delta).with_origin(line.origin));
        }
    }

    Ok(())
}

/// The anchor's block with its own aliases already expanded.
fn resolved_block<'a>(
    anchor: &'a Anchor,
    site: &Line,
    anchors: &'a AnchorMap,
    stack: &mut Vec<&'a str>,
) -> Result<Vec<Line>> {
    if stack.contains(&anchor.name.as_str()) || stack.len() >= MAX_ALIAS_DEPTH {
        return Err(CascadeError::CircularReference {
            anchor: anchor.name.clone(),
            line: site.to_string(),
        });
    }

    stack.push(&anchor.name);
    let mut block = Vec::with_capacity(anchor.block.len());
    let result = expand(&anchor.block, anchors, stack, &mut block);
    stack.pop();
    result?;
    Ok(block)
}

/// Width of the `- ` markers in front of a key that sits in a list item.
fn list_marker_width(key: &str) -> usize {
    let mut rest = key;
    while let Some(after) = rest.strip_prefix("- ") {
        rest = after.trim_start_matches(' ');
    }
    key.len() - rest.len()
}
