//! The strata error-code catalog.
//!
//! Codes read `S-<stage>-<n>`. The stage number follows the pipeline: 0 for
//! options, 1 for reading and sanitizing, 2 for anchors and aliases, 3 for
//! decoding and 4 for the cascade itself (missing sources, unresolved
//! variables). `error_catalog.json` is embedded into the binary and parsed on
//! first lookup.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Catalog entry for one code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorCodeInfo {
    /// Pipeline stage name: `internal`, `sanitize`, `anchors`, `decode` or `cascade`
    pub subsystem: String,

    /// Title shown after the code
    pub title: String,

    /// One-sentence explanation
    pub message_template: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub docs_url: Option<String>,

    /// First strata release that reports the code
    pub since_version: String,
}

/// Every known code, keyed by code.
///
/// # Panics
///
/// Panics on first use if the embedded catalog is not valid JSON.
pub static ERROR_CATALOG: Lazy<HashMap<String, ErrorCodeInfo>> = Lazy::new(|| {
    serde_json::from_str(include_str!("../error_catalog.json"))
        .expect("error_catalog.json is embedded at build time")
});

/// Catalog entry for `code`.
///
/// ```
/// use strata_error_reporting::catalog::get_error_info;
///
/// let info = get_error_info("S-2-2").unwrap();
/// assert_eq!(info.title, "Circular Anchor Reference");
/// assert!(get_error_info("S-9-9").is_none());
/// ```
pub fn get_error_info(code: &str) -> Option<&ErrorCodeInfo> {
    ERROR_CATALOG.get(code)
}

pub fn get_docs_url(code: &str) -> Option<&str> {
    get_error_info(code).and_then(|info| info.docs_url.as_deref())
}

/// Pipeline stage that reports `code`.
pub fn get_subsystem(code: &str) -> Option<&str> {
    get_error_info(code).map(|info| info.subsystem.as_str())
}
