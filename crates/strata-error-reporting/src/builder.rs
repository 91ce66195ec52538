//! Builder API for diagnostic messages.
//!
//! The builder encodes the tidyverse structure: a title, then the problem,
//! then details, then hints.

use crate::diagnostic::{DetailItem, DetailKind, DiagnosticKind, DiagnosticMessage, MessageContent};

/// Builder for [`DiagnosticMessage`].
///
/// # Example
///
/// ```
/// use strata_error_reporting::DiagnosticMessageBuilder;
///
/// let msg = DiagnosticMessageBuilder::error("Circular anchor reference")
///     .with_code("S-2-2")
///     .problem("Anchor `base` refers back to itself")
///     .at_line("  <<: *base")
///     .add_info("Reference chain: base -> base")
///     .build();
///
/// assert_eq!(msg.line.as_deref(), Some("  <<: *base"));
/// ```
#[derive(Debug, Clone)]
pub struct DiagnosticMessageBuilder {
    message: DiagnosticMessage,
}

impl DiagnosticMessageBuilder {
    pub fn new(kind: DiagnosticKind, title: impl Into<String>) -> Self {
        Self {
            message: DiagnosticMessage::new(kind, title),
        }
    }

    pub fn error(title: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Error, title)
    }

    pub fn warning(title: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Warning, title)
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.message.code = Some(code.into());
        self
    }

    pub fn problem(mut self, problem: impl Into<MessageContent>) -> Self {
        self.message.problem = Some(problem.into());
        self
    }

    /// Attach the literal text of the offending line.
    pub fn at_line(mut self, line: impl Into<String>) -> Self {
        self.message.line = Some(line.into());
        self
    }

    /// Add an error detail (✖ bullet).
    pub fn add_detail(mut self, detail: impl Into<MessageContent>) -> Self {
        self.message.details.push(DetailItem {
            kind: DetailKind::Error,
            content: detail.into(),
        });
        self
    }

    /// Add an info detail (ℹ bullet).
    pub fn add_info(mut self, info: impl Into<MessageContent>) -> Self {
        self.message.details.push(DetailItem {
            kind: DetailKind::Info,
            content: info.into(),
        });
        self
    }

    pub fn add_hint(mut self, hint: impl Into<MessageContent>) -> Self {
        self.message.hints.push(hint.into());
        self
    }

    pub fn build(self) -> DiagnosticMessage {
        self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_collects_in_order() {
        let msg = DiagnosticMessageBuilder::warning("Missing source")
            .with_code("S-4-1")
            .problem("`b.yml` could not be read")
            .add_detail("No such file or directory")
            .add_info("The remaining sources were merged")
            .add_hint("Check the --dir option?")
            .build();

        assert_eq!(msg.kind, DiagnosticKind::Warning);
        assert_eq!(msg.code.as_deref(), Some("S-4-1"));
        assert_eq!(msg.details.len(), 2);
        assert_eq!(msg.details[0].kind, DetailKind::Error);
        assert_eq!(msg.details[1].kind, DetailKind::Info);
        assert_eq!(msg.hints.len(), 1);
    }

    #[test]
    fn test_builder_error_renders_code() {
        let msg = DiagnosticMessageBuilder::error("Unknown alias")
            .with_code("S-2-1")
            .build();
        assert!(msg.is_error());
        assert!(msg.to_text().starts_with("Error [S-2-1]: Unknown alias"));
    }
}
