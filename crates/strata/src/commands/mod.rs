//! Command implementations for the strata CLI
//!
//! Each command loads its sources through [`SourceLoader`] and delegates to
//! strata-config for the actual cascade.

pub mod explain;
pub mod render;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use strata_config::{CascadeError, CascadeOptions, CascadeSource, Separator};
use strata_error_reporting::DiagnosticMessage;

use crate::loader::SourceLoader;

/// Arguments shared by every command that runs a cascade
#[derive(Args, Debug)]
pub struct CascadeArgs {
    /// Source files in cascade order; later files win (`.yml` is appended unless the name ends in `.yml` or `.yaml`)
    #[arg(required = true, value_name = "SOURCE")]
    pub sources: Vec<String>,

    /// Directory that relative source names are resolved against
    #[arg(short = 'd', long, default_value = ".")]
    pub dir: PathBuf,

    /// Row applied after every source (e.g. `server.port: 8080`)
    #[arg(long = "override", value_name = "LINE")]
    pub overrides: Vec<String>,

    /// Character joining the segments of flattened keys
    #[arg(long, default_value_t = '.')]
    pub separator: char,

    /// Do not print warnings
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Print errors and warnings as JSON, one object per line
    #[arg(long = "json-errors")]
    pub json_errors: bool,
}

impl CascadeArgs {
    /// Load the sources and build the pipeline options.
    pub fn prepare(&self) -> Result<(Vec<CascadeSource>, CascadeOptions)> {
        let separator = Separator::new(self.separator).map_err(|err| self.report(err))?;
        let options = CascadeOptions {
            separator,
            overrides: self.overrides.clone(),
        };
        let sources = SourceLoader::new(&self.dir).load_all(&self.sources);
        Ok((sources, options))
    }

    /// Print a fatal pipeline error as a diagnostic and turn it into a failure.
    pub fn report(&self, err: CascadeError) -> anyhow::Error {
        self.emit(&err.to_diagnostic());
        anyhow::anyhow!("cascade failed [{}]", err.code())
    }

    /// Print recovered problems unless `--quiet` is set.
    pub fn print_diagnostics(&self, diagnostics: &[DiagnosticMessage]) {
        if self.quiet {
            return;
        }
        for diagnostic in diagnostics {
            self.emit(diagnostic);
        }
    }

    fn emit(&self, diagnostic: &DiagnosticMessage) {
        if self.json_errors {
            eprintln!("{}", diagnostic.to_json());
        } else {
            eprint!("{}", diagnostic.to_text());
        }
    }
}

/// Write `text` to `path`, or to stdout when there is no path.
pub fn write_output(path: Option<&Path>, text: &str) -> Result<()> {
    match path {
        Some(path) => fs::write(path, text)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            print!("{}", text);
            Ok(())
        }
    }
}
