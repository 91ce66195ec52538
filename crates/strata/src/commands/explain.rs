//! Explain command implementation.
//!
//! Renders the intermediate result of every pipeline stage as Markdown, for
//! documenting how a cascade is resolved.

use std::fmt::Write;
use std::path::PathBuf;

use anyhow::Result;
use strata_config::{
    CascadeError, CascadeSource, Line, Preprocessed, assemble, preprocess, render_lines,
    reveal_placeholders, to_json,
};
use strata_error_reporting::DiagnosticMessage;

use super::{CascadeArgs, write_output};

/// Arguments for the explain command
#[derive(Debug)]
pub struct ExplainArgs {
    pub cascade: CascadeArgs,
    /// Output file path
    pub output: Option<PathBuf>,
}

/// Execute the explain command
pub fn execute(args: ExplainArgs) -> Result<()> {
    let (sources, options) = args.cascade.prepare()?;
    let mut diagnostics = Vec::new();
    let report = |err: CascadeError| args.cascade.report(err);
    let preprocessed = preprocess(&sources, &options, &mut diagnostics).map_err(report)?;
    let document = assemble(&preprocessed, &options, &mut diagnostics).map_err(report)?;
    args.cascade.print_diagnostics(&diagnostics);

    let result = serde_json::to_string_pretty(&to_json(&document))?;
    let markdown = walkthrough(&sources, &preprocessed, &result, &diagnostics);
    write_output(args.output.as_deref(), &markdown)
}

fn code_block(out: &mut String, lang: &str, body: &str) {
    let _ = writeln!(out, "```{}", lang);
    let _ = writeln!(out, "{}", body.trim_end_matches('\n'));
    let _ = writeln!(out, "```");
    out.push('\n');
}

fn stage(out: &mut String, title: &str, description: &str, lines: &[Line]) {
    let _ = writeln!(out, "## {}\n", title);
    let _ = writeln!(out, "{}\n", description);
    code_block(out, "yaml", &reveal_placeholders(&render_lines(lines)));
}

/// Build the Markdown walkthrough.
pub fn walkthrough(
    sources: &[CascadeSource],
    preprocessed: &Preprocessed,
    result: &str,
    diagnostics: &[DiagnosticMessage],
) -> String {
    let mut out = String::from("# Cascade walkthrough\n\n");

    let _ = writeln!(out, "## Sources\n");
    for (origin, source) in sources.iter().enumerate() {
        match source {
            CascadeSource::Loaded { name, text } => {
                let _ = writeln!(out, "### {}. `{}`\n", origin + 1, name);
                code_block(&mut out, "yaml", text);
            }
            CascadeSource::Missing { name, .. } => {
                let _ = writeln!(out, "### {}. `{}` (not found, ignored)\n", origin + 1, name);
            }
        }
    }

    stage(
        &mut out,
        "Comments and blank lines stripped",
        "All sources are concatenated in cascade order.",
        &preprocessed.stripped,
    );
    stage(
        &mut out,
        "Keys sanitized",
        "Dots inside quoted keys are shown as `_DOT_`, other dots in keys as `_DOT__DOT_`.",
        &preprocessed.sanitized,
    );

    let _ = writeln!(out, "## Anchors\n");
    if preprocessed.anchors.is_empty() {
        let _ = writeln!(out, "No anchors declared.\n");
    } else {
        for anchor in preprocessed.anchors.iter() {
            let _ = writeln!(
                out,
                "- `&{}` at column {}, {} row(s)",
                anchor.name,
                anchor.indent,
                anchor.block.len()
            );
        }
        out.push('\n');
    }

    stage(
        &mut out,
        "Anchors stripped",
        "The `&name` markers are removed from the declaring rows.",
        &preprocessed.anchors_stripped,
    );
    stage(
        &mut out,
        "Aliases replaced",
        "Every `<<: *name` and `key: *name` is replaced by the anchor's block.",
        &preprocessed.resolved,
    );
    stage(
        &mut out,
        "Hierarchy blown up",
        "Every key is rewritten to its full path.",
        &preprocessed.flattened,
    );

    let _ = writeln!(out, "## Result\n");
    code_block(&mut out, "json", result);

    if !diagnostics.is_empty() {
        let _ = writeln!(out, "## Diagnostics\n");
        for diagnostic in diagnostics {
            code_block(&mut out, "", &diagnostic.to_text());
        }
    }

    out
}
