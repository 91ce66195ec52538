//! Hierarchy flattening.
//!
//! Rewrites indentation nesting into full-path keys:
//!
//! ```text
//! a:                a:
//!   b:        =>    a.b:
//!     c: 1          a.b.c: 1
//! ```
//!
//! Every key row is emitted at column 0, so the output flattens to itself.
//! Sequences and block scalar bodies are carried through untouched.

use crate::line::{Line, opens_block_scalar};
use crate::types::Separator;

/// Flatten `lines` into rows keyed by their full path.
pub fn blow_up_hierarchy(lines: &[Line], separator: Separator) -> Vec<Line> {
    let mut out = Vec::with_capacity(lines.len());
    let mut path: Vec<String> = Vec::new();
    let mut steps: Vec<usize> = Vec::new();
    let mut indent = 0;
    let mut index = 0;

    while index < lines.len() {
        let line = &lines[index];

        if line.is_list_item() {
            let list_indent = line.indent;
            while index < lines.len() && continues_list(&lines[index], list_indent) {
                out.push(lines[index].clone());
                index += 1;
            }
            continue;
        }

        let Some((key, rest)) = line.key_value() else {
            out.push(line.clone());
            index += 1;
            continue;
        };

        if line.indent > indent && !path.is_empty() {
            steps.push(line.indent - indent);
        } else if line.indent == 0 {
            path.clear();
            steps.clear();
        } else {
            // Peer or ancestor: drop the previous key, then one segment per level climbed.
            path.pop();
            let mut level = indent;
            while level > line.indent {
                let Some(step) = steps.pop() else {
                    break;
                };
                level = level.saturating_sub(step);
                path.pop();
            }
        }

        path.push(key.trim_end().to_string());
        out.push(Line::new(
            0,
            format!("{}{}", separator.join(&path), rest),
            line.origin,
        ));
        indent = line.indent;
        index += 1;

        if opens_block_scalar(rest) {
            while index < lines.len() && lines[index].indent > line.indent {
                out.push(lines[index].clone());
                index += 1;
            }
        }
    }

    tracing::trace!(rows = out.len(), "Flattened hierarchy");
    out
}

fn continues_list(line: &Line, list_indent: usize) -> bool {
    line.indent > list_indent || (line.indent == list_indent && line.is_list_item())
}
