//! Error reporting and diagnostic messages for strata.
//!
//! Every stage of the cascade pipeline reports problems through the same
//! structured message type, whether the problem aborts the run (an error
//! converted from the pipeline's error enum) or is recovered from (a warning
//! pushed into a diagnostics collector).
//!
//! # Types
//!
//! - [`DiagnosticMessage`]: The main message structure
//! - [`MessageContent`]: Content representation (Plain or Markdown)
//! - [`DetailItem`]: Individual detail bullets with error/info kinds
//! - [`DiagnosticKind`]: Error or Warning
//!
//! # Example
//!
//! ```
//! use strata_error_reporting::DiagnosticMessageBuilder;
//!
//! let warning = DiagnosticMessageBuilder::warning("Unresolved variable")
//!     .with_code("S-4-2")
//!     .problem("No value was found for `${var.i.able}`")
//!     .add_hint("Define `var.i.able` in one of the cascaded files?")
//!     .build();
//!
//! assert!(warning.to_text().contains("Warning [S-4-2]: Unresolved variable"));
//! ```

pub mod builder;
pub mod catalog;
pub mod diagnostic;

pub use builder::DiagnosticMessageBuilder;
pub use catalog::{ERROR_CATALOG, ErrorCodeInfo, get_docs_url, get_error_info, get_subsystem};
pub use diagnostic::{DetailItem, DetailKind, DiagnosticKind, DiagnosticMessage, MessageContent};
