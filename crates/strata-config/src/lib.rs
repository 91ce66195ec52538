//! Cascading configuration for strata.
//!
//! This crate turns an ordered list of indentation-structured YAML sources into
//! one merged document. The sources may use anchors and aliases across file
//! boundaries, dotted keys, quoted keys containing dots, and `${path}`
//! variables; later sources override earlier ones.
//!
//! # Pipeline
//!
//! 1. **Sanitize**: quoted dots become placeholders ([`sanitize`])
//! 2. **Anchors**: `&name` blocks are collected ([`retrieve_anchors`])
//! 3. **Aliases**: `<<: *name` and `key: *name` are spliced ([`replace_aliases`])
//! 4. **Flatten**: nesting becomes full-path keys ([`blow_up_hierarchy`])
//! 5. **Merge**: every layer is decoded and folded in order ([`MergedDocument`])
//! 6. **Substitute**: `${path}` tokens are looked up ([`ValueIndex`])
//!
//! # Example
//!
//! ```
//! use strata_config::{CascadeOptions, CascadeSource, cascade};
//!
//! let sources = vec![
//!     CascadeSource::loaded("base", "server:\n  host: localhost\n  port: 80\n"),
//!     CascadeSource::loaded("prod", "server:\n  port: 443\n"),
//! ];
//! let output = cascade(&sources, &CascadeOptions::default()).unwrap();
//! assert_eq!(output.to_json()["server"]["port"], 443);
//! assert_eq!(output.to_json()["server"]["host"], "localhost");
//! ```

mod aliases;
mod anchors;
mod decode;
mod error;
mod flatten;
mod line;
mod materialize;
mod merge;
mod pipeline;
mod sanitize;
mod types;
mod variables;

pub use error::{CascadeError, Result};

pub use line::{Line, key_separator, render_lines};

pub use types::{
    ConfigValue,
    ConfigValueKind,
    QUOTED_DOT,
    QUOTED_SEPARATOR,
    Separator,
    USER_DOT,
    scalar_text,
};

pub use sanitize::{expand_key, read_source, restore_key, reveal_placeholders, sanitize};

pub use anchors::{AliasSite, Anchor, AnchorMap, retrieve_anchors, strip_anchors};

pub use aliases::{MAX_ALIAS_DEPTH, replace_aliases};

pub use flatten::blow_up_hierarchy;

pub use decode::{Entry, config_value_from_yaml, decode_documents, group_entries};

pub use merge::{CascadeDocument, MergedDocument, merge_into};

pub use variables::{MAX_VARIABLE_DEPTH, ValueIndex, substitute};

pub use materialize::to_json;

pub use pipeline::{
    CascadeOptions,
    CascadeOutput,
    CascadeSource,
    Preprocessed,
    assemble,
    cascade,
    preprocess,
};
