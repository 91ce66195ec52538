//! The cascade pipeline.
//!
//! [`preprocess`] runs the line-level stages over the concatenated cascade and
//! keeps every intermediate result; [`assemble`] decodes, merges and
//! substitutes. [`cascade`] does both.

use crate::aliases::replace_aliases;
use crate::anchors::{AnchorMap, retrieve_anchors, strip_anchors};
use crate::decode::decode_documents;
use crate::error::Result;
use crate::flatten::blow_up_hierarchy;
use crate::line::Line;
use crate::materialize;
use crate::merge::MergedDocument;
use crate::sanitize::{read_source, sanitize};
use crate::types::{ConfigValue, Separator};
use crate::variables::{ValueIndex, substitute};
use strata_error_reporting::{DiagnosticMessage, DiagnosticMessageBuilder};

/// One entry of a cascade, as handed over by the loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CascadeSource {
    Loaded { name: String, text: String },
    /// The loader could not produce text for this entry
    Missing { name: String, reason: String },
}

impl CascadeSource {
    pub fn loaded(name: impl Into<String>, text: impl Into<String>) -> Self {
        CascadeSource::Loaded {
            name: name.into(),
            text: text.into(),
        }
    }

    pub fn missing(name: impl Into<String>, reason: impl Into<String>) -> Self {
        CascadeSource::Missing {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            CascadeSource::Loaded { name, .. } | CascadeSource::Missing { name, .. } => name,
        }
    }
}

/// Options for one cascade run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CascadeOptions {
    pub separator: Separator,
    /// Literal rows applied after every source
    pub overrides: Vec<String>,
}

impl CascadeOptions {
    pub fn with_separator(mut self, separator: Separator) -> Self {
        self.separator = separator;
        self
    }

    pub fn with_override(mut self, line: impl Into<String>) -> Self {
        self.overrides.push(line.into());
        self
    }
}

/// The rows of the whole cascade after each line-level stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preprocessed {
    /// Without blank rows, comments and document markers
    pub stripped: Vec<Line>,
    pub sanitized: Vec<Line>,
    pub anchors: AnchorMap,
    pub anchors_stripped: Vec<Line>,
    /// Every alias replaced by its anchor block
    pub resolved: Vec<Line>,
    pub flattened: Vec<Line>,
}

/// Run the line-level stages over every loaded source plus the overrides.
///
/// Sources that failed to load are skipped with a warning. Overrides get the
/// origin after the last source.
pub fn preprocess(
    sources: &[CascadeSource],
    options: &CascadeOptions,
    diagnostics: &mut Vec<DiagnosticMessage>,
) -> Result<Preprocessed> {
    let separator = options.separator;
    let mut stripped = Vec::new();

    for (origin, source) in sources.iter().enumerate() {
        match source {
            CascadeSource::Loaded { name, text } => {
                let lines = read_source(text, origin)?;
                tracing::debug!(source = %name, origin, rows = lines.len(), "Read cascade source");
                stripped.extend(lines);
            }
            CascadeSource::Missing { name, reason } => {
                tracing::warn!(source = %name, %reason, "Cascade source not found, ignoring it");
                diagnostics.push(
                    DiagnosticMessageBuilder::warning("Missing source")
                        .with_code("S-4-1")
                        .problem(format!("File {} not found, ignoring it.", name))
                        .add_info(reason.clone())
                        .build(),
                );
            }
        }
    }

    if !options.overrides.is_empty() {
        stripped.extend(read_source(&options.overrides.join("\n"), sources.len())?);
    }

    let sanitized = sanitize(&stripped, separator)?;
    let anchors = retrieve_anchors(&sanitized)?;
    tracing::debug!(anchors = anchors.len(), "Retrieved anchors");
    let anchors_stripped = strip_anchors(&sanitized);
    let resolved = replace_aliases(&anchors_stripped, &anchors)?;
    let flattened = blow_up_hierarchy(&resolved, separator);
    tracing::debug!(rows = flattened.len(), "Preprocessed cascade");

    Ok(Preprocessed {
        stripped,
        sanitized,
        anchors,
        anchors_stripped,
        resolved,
        flattened,
    })
}

/// Decode the flattened rows, merge the layers and substitute variables.
pub fn assemble(
    preprocessed: &Preprocessed,
    options: &CascadeOptions,
    diagnostics: &mut Vec<DiagnosticMessage>,
) -> Result<ConfigValue> {
    let separator = options.separator;
    let documents = decode_documents(&preprocessed.flattened, separator)?;
    let index = ValueIndex::build(&documents, separator);

    let mut merged = MergedDocument::new();
    for document in &documents {
        merged.merge(document, separator);
    }

    let mut root = merged.into_root();
    for token in substitute(&mut root, &index) {
        tracing::warn!(%token, "Unresolved variable");
        diagnostics.push(
            DiagnosticMessageBuilder::warning("Unresolved variable")
                .with_code("S-4-2")
                .problem(format!(
                    "No substitution value found for {}, nothing was replaced.",
                    token
                ))
                .add_hint("Define the path in one of the cascaded files or pass it as an override?")
                .build(),
        );
    }

    Ok(root)
}

/// Result of a cascade run.
#[derive(Debug, Clone, PartialEq)]
pub struct CascadeOutput {
    pub document: ConfigValue,
    /// Recovered problems, in the order they were found
    pub diagnostics: Vec<DiagnosticMessage>,
}

impl CascadeOutput {
    pub fn to_json(&self) -> serde_json::Value {
        materialize::to_json(&self.document)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &DiagnosticMessage> {
        self.diagnostics.iter().filter(|d| d.is_warning())
    }
}

/// Cascade `sources` (in order, later wins) into one document.
pub fn cascade(sources: &[CascadeSource], options: &CascadeOptions) -> Result<CascadeOutput> {
    let mut diagnostics = Vec::new();
    let preprocessed = preprocess(sources, options, &mut diagnostics)?;
    let document = assemble(&preprocessed, options, &mut diagnostics)?;
    Ok(CascadeOutput {
        document,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CascadeError;
    use serde_json::json;

    #[test]
    fn test_missing_source_is_a_warning() {
        let sources = vec![
            CascadeSource::missing("iDoNotExist", "No such file or directory"),
            CascadeSource::loaded("a", "a: 1\n"),
        ];
        let output = cascade(&sources, &CascadeOptions::default()).unwrap();
        assert_eq!(output.to_json(), json!({"a": 1}));
        let warnings: Vec<_> = output.warnings().collect();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code.as_deref(), Some("S-4-1"));
    }

    #[test]
    fn test_overrides_are_the_last_layer() {
        let sources = vec![CascadeSource::loaded("a", "a:\n  b: 1\n  c: 2\n")];
        let options = CascadeOptions::default().with_override("a.b: 3");
        let output = cascade(&sources, &options).unwrap();
        assert_eq!(output.to_json(), json!({"a": {"b": 3, "c": 2}}));
        assert_eq!(output.document.get_path(&["a", "b"]).unwrap().origin, 1);
    }

    #[test]
    fn test_unresolved_variable_is_a_warning() {
        let sources = vec![CascadeSource::loaded("a", "x: ${nope}\n")];
        let output = cascade(&sources, &CascadeOptions::default()).unwrap();
        assert_eq!(output.to_json(), json!({"x": "${nope}"}));
        let warning = output.warnings().next().unwrap();
        assert_eq!(warning.code.as_deref(), Some("S-4-2"));
        assert!(warning.to_text().contains("No substitution value found for ${nope}"));
    }

    #[test]
    fn test_preprocess_keeps_every_stage() {
        let sources = vec![CascadeSource::loaded(
            "a",
            "# comment\nbase: &base\n  x: 1\nuse:\n  <<: *base\n",
        )];
        let mut diagnostics = Vec::new();
        let pre = preprocess(&sources, &CascadeOptions::default(), &mut diagnostics).unwrap();
        assert_eq!(pre.stripped.len(), 4);
        assert_eq!(pre.anchors.len(), 1);
        assert_eq!(pre.anchors_stripped[0].content, "base:");
        assert_eq!(pre.resolved.len(), 4);
        let flattened: Vec<_> = pre.flattened.iter().map(|l| l.content.as_str()).collect();
        assert_eq!(flattened, vec!["base:", "base.x: 1", "use:", "use.x: 1"]);
    }

    #[test]
    fn test_fatal_error_aborts() {
        let sources = vec![CascadeSource::loaded("a", "a:\n  <<: *nowhere\n")];
        let err = cascade(&sources, &CascadeOptions::default()).unwrap_err();
        assert!(matches!(err, CascadeError::UnknownAlias { .. }));
    }
}
