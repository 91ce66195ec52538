//! Fatal pipeline errors.

use strata_error_reporting::{DiagnosticMessage, DiagnosticMessageBuilder};
use thiserror::Error;

/// Result type alias for cascade operations.
pub type Result<T> = std::result::Result<T, CascadeError>;

/// Errors that abort a cascade run.
///
/// Every variant that stems from a source row carries the row's literal text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CascadeError {
    /// A quote was opened in a key but never closed.
    #[error("Key contains incomplete quoted section: \"{line}\"")]
    UnclosedQuote { line: String },

    /// A quoted span of a key contains the other quote character.
    #[error("Key cannot contain nested quotes: \"{line}\"")]
    NestedQuotes { line: String },

    /// Indentation containing a tab character.
    #[error("Indentation cannot contain tab characters: \"{line}\"")]
    TabIndentation { line: String },

    /// An alias names an anchor that was never declared.
    #[error("Alias {alias} does not have an anchor reference. Line content = '{line}'")]
    UnknownAlias { alias: String, line: String },

    /// An anchor block refers back to itself, directly or through other anchors.
    #[error("Circular reference detected \"{anchor}\". Line content = '{line}'")]
    CircularReference { anchor: String, line: String },

    /// A flattened entry is not valid YAML.
    #[error("Value of '{line}' could not be decoded: {message}")]
    Decode { line: String, message: String },

    /// The path separator collides with the source syntax.
    #[error("{separator:?} cannot be used as a path separator")]
    InvalidSeparator { separator: char },
}

impl CascadeError {
    /// Stable error code (see the catalog in `strata-error-reporting`).
    pub fn code(&self) -> &'static str {
        match self {
            CascadeError::InvalidSeparator { .. } => "S-0-1",
            CascadeError::UnclosedQuote { .. } => "S-1-1",
            CascadeError::NestedQuotes { .. } => "S-1-2",
            CascadeError::TabIndentation { .. } => "S-1-3",
            CascadeError::UnknownAlias { .. } => "S-2-1",
            CascadeError::CircularReference { .. } => "S-2-2",
            CascadeError::Decode { .. } => "S-3-1",
        }
    }

    /// The offending source row, if the error came from one.
    pub fn line(&self) -> Option<&str> {
        match self {
            CascadeError::UnclosedQuote { line }
            | CascadeError::NestedQuotes { line }
            | CascadeError::TabIndentation { line }
            | CascadeError::UnknownAlias { line, .. }
            | CascadeError::CircularReference { line, .. }
            | CascadeError::Decode { line, .. } => Some(line),
            CascadeError::InvalidSeparator { .. } => None,
        }
    }

    /// Errors raised while reading keys and indentation.
    pub fn is_syntax_error(&self) -> bool {
        matches!(
            self,
            CascadeError::UnclosedQuote { .. }
                | CascadeError::NestedQuotes { .. }
                | CascadeError::TabIndentation { .. }
        )
    }

    pub fn to_diagnostic(&self) -> DiagnosticMessage {
        let title = strata_error_reporting::get_error_info(self.code())
            .map(|info| info.title.clone())
            .unwrap_or_else(|| "Cascade error".to_string());

        let mut builder = DiagnosticMessageBuilder::error(title)
            .with_code(self.code())
            .problem(self.to_string());
        if let Some(line) = self.line() {
            builder = builder.at_line(line);
        }

        builder = match self {
            CascadeError::UnclosedQuote { .. } => builder.add_hint("Close the quote before the `:`?"),
            CascadeError::NestedQuotes { .. } => {
                builder.add_hint("Use a single kind of quote inside one key?")
            }
            CascadeError::TabIndentation { .. } => builder.add_hint("Indent with spaces?"),
            CascadeError::UnknownAlias { alias, .. } => {
                builder.add_hint(format!("Declare `&{}` in an earlier or later file?", alias))
            }
            CascadeError::CircularReference { anchor, .. } => builder.add_info(format!(
                "The block of `&{}` ends up including itself",
                anchor
            )),
            CascadeError::Decode { message, .. } => builder.add_detail(message.clone()),
            CascadeError::InvalidSeparator { .. } => {
                builder.add_hint("Pick a punctuation character such as `.`, `_` or `/`?")
            }
        };

        builder.build()
    }
}
