//! Render command implementation.
//!
//! Runs the cascade and writes the merged document as JSON. Fatal errors and
//! warnings go to stderr; only the document goes to stdout.

use std::path::PathBuf;

use anyhow::Result;
use tracing::info;

use super::{CascadeArgs, write_output};

/// Arguments for the render command
#[derive(Debug)]
pub struct RenderArgs {
    pub cascade: CascadeArgs,
    /// Output file path
    pub output: Option<PathBuf>,
    /// Single-line JSON
    pub compact: bool,
    /// Treat warnings as a failure
    pub deny_warnings: bool,
}

/// Execute the render command
pub fn execute(args: RenderArgs) -> Result<()> {
    let (sources, options) = args.cascade.prepare()?;
    let output =
        strata_config::cascade(&sources, &options).map_err(|err| args.cascade.report(err))?;
    args.cascade.print_diagnostics(&output.diagnostics);

    let warnings = output.warnings().count();
    if args.deny_warnings && warnings > 0 {
        anyhow::bail!("{} warning(s) reported and --deny-warnings is set", warnings);
    }

    let json = output.to_json();
    let mut text = if args.compact {
        serde_json::to_string(&json)?
    } else {
        serde_json::to_string_pretty(&json)?
    };
    text.push('\n');

    write_output(args.output.as_deref(), &text)?;
    if let Some(path) = &args.output {
        info!(output = %path.display(), sources = sources.len(), "Rendered cascade");
    }
    Ok(())
}
