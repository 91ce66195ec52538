//! Core diagnostic message types.
//!
//! A cascade run reports fatal errors and recovered warnings with the same
//! structure, rendered either as tidyverse-style text or as JSON.

use serde::{Deserialize, Serialize};

/// The kind of diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// An error that prevents completion
    Error,
    /// A problem that was recovered from; the run still produces a document
    Warning,
}

impl DiagnosticKind {
    fn label(self) -> &'static str {
        match self {
            DiagnosticKind::Error => "Error",
            DiagnosticKind::Warning => "Warning",
        }
    }

    fn as_json_str(self) -> &'static str {
        match self {
            DiagnosticKind::Error => "error",
            DiagnosticKind::Warning => "warning",
        }
    }
}

/// How detail items should be presented (tidyverse x/i bullet style).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DetailKind {
    /// Error detail (✖ bullet in tidyverse style)
    Error,
    /// Info detail (i bullet in tidyverse style)
    Info,
}

impl DetailKind {
    fn bullet(self) -> &'static str {
        match self {
            DetailKind::Error => "✖",
            DetailKind::Info => "ℹ",
        }
    }

    fn as_json_str(self) -> &'static str {
        match self {
            DetailKind::Error => "error",
            DetailKind::Info => "info",
        }
    }
}

/// The content of a message or detail item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageContent {
    /// Plain text content
    Plain(String),
    /// Markdown content
    Markdown(String),
}

impl MessageContent {
    /// Get the raw string content for display
    pub fn as_str(&self) -> &str {
        match self {
            MessageContent::Plain(s) => s,
            MessageContent::Markdown(s) => s,
        }
    }

    /// Convert to JSON value with type information
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::json;
        match self {
            MessageContent::Plain(s) => json!({
                "type": "plain",
                "content": s
            }),
            MessageContent::Markdown(s) => json!({
                "type": "markdown",
                "content": s
            }),
        }
    }
}

impl From<String> for MessageContent {
    fn from(s: String) -> Self {
        MessageContent::Markdown(s)
    }
}

impl From<&str> for MessageContent {
    fn from(s: &str) -> Self {
        MessageContent::Markdown(s.to_string())
    }
}

/// A detail item in a diagnostic message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailItem {
    /// The kind of detail (error or info)
    pub kind: DetailKind,
    /// The content of the detail
    pub content: MessageContent,
}

/// A diagnostic message following tidyverse-style structure.
///
/// Structure:
/// 1. **Code**: Optional error code (e.g., "S-2-1") for searchability
/// 2. **Title**: Brief error message
/// 3. **Kind**: Error or Warning
/// 4. **Problem**: What went wrong
/// 5. **Details**: Specific information (bulleted)
/// 6. **Hints**: Optional guidance for fixing (ends with ?)
/// 7. **Line**: The literal source line the problem was found on, if any
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticMessage {
    /// Optional error code (e.g., "S-2-1")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Brief title for the error
    pub title: String,

    /// The kind of diagnostic (Error or Warning)
    pub kind: DiagnosticKind,

    /// The problem statement
    pub problem: Option<MessageContent>,

    /// Specific details
    pub details: Vec<DetailItem>,

    /// Optional hints for fixing (ends with ?)
    pub hints: Vec<MessageContent>,

    /// Literal text of the offending line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<String>,
}

impl DiagnosticMessage {
    /// Create a new diagnostic message with just a title and kind.
    pub fn new(kind: DiagnosticKind, title: impl Into<String>) -> Self {
        Self {
            code: None,
            title: title.into(),
            kind,
            problem: None,
            details: Vec::new(),
            hints: Vec::new(),
            line: None,
        }
    }

    /// Create an error diagnostic.
    pub fn error(title: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Error, title)
    }

    /// Create a warning diagnostic.
    pub fn warning(title: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Warning, title)
    }

    /// Set the error code.
    ///
    /// Error codes follow the format `S-<subsystem>-<number>` (e.g., "S-1-1").
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Get the documentation URL for this message, if it has an error code.
    ///
    /// # Example
    ///
    /// ```
    /// use strata_error_reporting::DiagnosticMessage;
    ///
    /// let msg = DiagnosticMessage::error("Unknown alias").with_code("S-2-1");
    /// assert!(msg.docs_url().is_some());
    /// ```
    pub fn docs_url(&self) -> Option<&str> {
        self.code
            .as_ref()
            .and_then(|code| crate::catalog::get_docs_url(code))
    }

    pub fn is_error(&self) -> bool {
        self.kind == DiagnosticKind::Error
    }

    pub fn is_warning(&self) -> bool {
        self.kind == DiagnosticKind::Warning
    }

    /// Render this diagnostic message as text following tidyverse style.
    ///
    /// Format:
    /// ```text
    /// Error [S-2-1]: title
    ///   │ offending line
    /// Problem statement here
    /// ✖ Error detail
    /// ℹ Info detail
    /// ? Hint
    /// ```
    pub fn to_text(&self) -> String {
        use std::fmt::Write;

        let mut result = String::new();

        match &self.code {
            Some(code) => {
                let _ = writeln!(result, "{} [{}]: {}", self.kind.label(), code, self.title);
            }
            None => {
                let _ = writeln!(result, "{}: {}", self.kind.label(), self.title);
            }
        }

        if let Some(line) = &self.line {
            let _ = writeln!(result, "  │ {}", line);
        }

        if let Some(problem) = &self.problem {
            let _ = writeln!(result, "{}", problem.as_str());
        }

        for detail in &self.details {
            let _ = writeln!(result, "{} {}", detail.kind.bullet(), detail.content.as_str());
        }

        for hint in &self.hints {
            let _ = writeln!(result, "? {}", hint.as_str());
        }

        result
    }

    /// Render this diagnostic message as a JSON value.
    ///
    /// Coded messages also carry the subsystem and docs URL from the catalog.
    ///
    /// # Example
    ///
    /// ```
    /// use strata_error_reporting::DiagnosticMessage;
    ///
    /// let msg = DiagnosticMessage::warning("Missing source").with_code("S-4-1");
    /// let json = msg.to_json();
    /// assert_eq!(json["kind"], "warning");
    /// assert_eq!(json["subsystem"], "cascade");
    /// ```
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::json;

        let mut obj = json!({
            "kind": self.kind.as_json_str(),
            "title": self.title,
        });

        if let Some(code) = &self.code {
            obj["code"] = json!(code);
            if let Some(subsystem) = crate::catalog::get_subsystem(code) {
                obj["subsystem"] = json!(subsystem);
            }
            if let Some(url) = self.docs_url() {
                obj["docs_url"] = json!(url);
            }
        }

        if let Some(problem) = &self.problem {
            obj["problem"] = problem.to_json();
        }

        if !self.details.is_empty() {
            let details: Vec<_> = self
                .details
                .iter()
                .map(|d| {
                    json!({
                        "kind": d.kind.as_json_str(),
                        "content": d.content.to_json()
                    })
                })
                .collect();
            obj["details"] = json!(details);
        }

        if !self.hints.is_empty() {
            let hints: Vec<_> = self.hints.iter().map(|h| h.to_json()).collect();
            obj["hints"] = json!(hints);
        }

        if let Some(line) = &self.line {
            obj["line"] = json!(line);
        }

        obj
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_message_is_bare() {
        let msg = DiagnosticMessage::error("Boom");
        assert_eq!(msg.kind, DiagnosticKind::Error);
        assert!(msg.code.is_none());
        assert!(msg.details.is_empty());
        assert!(msg.line.is_none());
    }

    #[test]
    fn test_to_text_without_code() {
        let msg = DiagnosticMessage::warning("Nothing to merge");
        assert_eq!(msg.to_text(), "Warning: Nothing to merge\n");
    }

    #[test]
    fn test_to_text_with_everything() {
        let mut msg = DiagnosticMessage::error("Unknown alias").with_code("S-2-1");
        msg.line = Some("  <<: *nope".to_string());
        msg.problem = Some("Alias `nope` has no anchor".into());
        msg.details.push(DetailItem {
            kind: DetailKind::Info,
            content: "Declared anchors: base".into(),
        });
        msg.hints.push("Did you mean `base`?".into());

        let text = msg.to_text();
        assert_eq!(
            text,
            "Error [S-2-1]: Unknown alias\n  │   <<: *nope\nAlias `nope` has no anchor\nℹ Declared anchors: base\n? Did you mean `base`?\n"
        );
    }

    #[test]
    fn test_to_json_fields() {
        let mut msg = DiagnosticMessage::warning("Unresolved variable").with_code("S-4-2");
        msg.line = Some("x: ${a.b}".to_string());

        let json = msg.to_json();
        assert_eq!(json["kind"], "warning");
        assert_eq!(json["code"], "S-4-2");
        assert_eq!(json["subsystem"], "cascade");
        assert_eq!(json["docs_url"], "https://strata.dev/docs/errors/S-4-2");
        assert_eq!(json["line"], "x: ${a.b}");
        assert!(json.get("details").is_none());
    }

    #[test]
    fn test_to_json_details_and_hints() {
        let mut msg = DiagnosticMessage::error("Circular Anchor Reference").with_code("S-2-2");
        msg.details.push(DetailItem {
            kind: DetailKind::Info,
            content: "Reference chain: base -> base".into(),
        });
        msg.hints.push(MessageContent::Plain("Remove the alias?".to_string()));

        let json = msg.to_json();
        assert_eq!(json["kind"], "error");
        assert_eq!(json["details"][0]["kind"], "info");
        assert_eq!(json["details"][0]["content"]["type"], "markdown");
        assert_eq!(json["hints"][0]["type"], "plain");
        assert!(json.get("line").is_none());
    }

    #[test]
    fn test_uncatalogued_code_has_no_subsystem() {
        let json = DiagnosticMessage::error("Odd").with_code("S-9-9").to_json();
        assert_eq!(json["code"], "S-9-9");
        assert!(json.get("subsystem").is_none());
        assert!(json.get("docs_url").is_none());
    }

    #[test]
    fn test_message_content_conversion() {
        let content: MessageContent = "text".into();
        assert_eq!(content, MessageContent::Markdown("text".to_string()));
        assert_eq!(content.to_json()["type"], "markdown");
    }
}
