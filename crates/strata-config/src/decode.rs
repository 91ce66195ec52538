//! Decoding flattened rows into values.
//!
//! After flattening, every key row sits at column 0 and owns the rows below
//! it up to the next key row (sequence items, block scalar bodies, wrapped
//! flow values). Each such entry is decoded on its own with `yaml-rust2`.

use crate::error::{CascadeError, Result};
use crate::line::Line;
use crate::merge::CascadeDocument;
use crate::sanitize::restore_key;
use crate::types::{ConfigValue, Separator, scalar_text};
use indexmap::IndexMap;
use yaml_rust2::{Yaml, YamlLoader};

/// One flattened key together with the rows that belong to its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Full path key, still carrying sanitizer placeholders
    pub key: String,
    /// Everything from the `:` on
    pub value_text: String,
    pub continuation: Vec<Line>,
    pub origin: usize,
    /// The key row as it was written after flattening
    pub line: String,
}

impl Entry {
    /// YAML text of a one-key document holding this entry's value.
    fn document_text(&self) -> String {
        let mut text = format!("v{}\n", self.value_text);
        for line in &self.continuation {
            text.push_str(&line.to_string());
            text.push('\n');
        }
        text
    }
}

fn is_key_row(line: &Line) -> bool {
    line.indent == 0 && !line.is_list_item() && line.key_value().is_some()
}

/// Group flattened rows into entries.
pub fn group_entries(lines: &[Line]) -> Vec<Entry> {
    let mut entries: Vec<Entry> = Vec::new();

    for line in lines {
        if is_key_row(line) {
            if let Some((key, rest)) = line.key_value() {
                entries.push(Entry {
                    key: key.to_string(),
                    value_text: rest.to_string(),
                    continuation: Vec::new(),
                    origin: line.origin,
                    line: line.to_string(),
                });
            }
            continue;
        }

        match entries.last_mut() {
            Some(entry) => entry.continuation.push(line.clone()),
            None => tracing::debug!(line = %line, "Skipping row without a key"),
        }
    }

    entries
}

/// Decode the value of one entry. `None` means the value is null.
pub fn decode_entry(entry: &Entry, separator: Separator) -> Result<Option<ConfigValue>> {
    let docs = YamlLoader::load_from_str(&entry.document_text()).map_err(|e| {
        CascadeError::Decode {
            line: entry.line.clone(),
            message: e.to_string(),
        }
    })?;

    let Some(Yaml::Hash(mut hash)) = docs.into_iter().next() else {
        return Err(CascadeError::Decode {
            line: entry.line.clone(),
            message: "expected a single key".to_string(),
        });
    };

    match hash.remove(&Yaml::String("v".to_string())) {
        None | Some(Yaml::Null) => Ok(None),
        Some(yaml) => Ok(Some(config_value_from_yaml(yaml, entry.origin, separator))),
    }
}

/// Convert a decoded YAML node, restoring placeholders in mapping keys.
pub fn config_value_from_yaml(yaml: Yaml, origin: usize, separator: Separator) -> ConfigValue {
    match yaml {
        Yaml::Hash(hash) => {
            let mut map = IndexMap::with_capacity(hash.len());
            for (key, value) in hash {
                let key = restore_key(&scalar_text(&key), separator);
                map.insert(key, config_value_from_yaml(value, origin, separator));
            }
            ConfigValue::new_map(map, origin)
        }
        Yaml::Array(items) => ConfigValue::new_array(
            items
                .into_iter()
                .map(|item| config_value_from_yaml(item, origin, separator))
                .collect(),
            origin,
        ),
        Yaml::BadValue | Yaml::Alias(_) => ConfigValue::new_scalar(Yaml::Null, origin),
        scalar => ConfigValue::new_scalar(scalar, origin),
    }
}

/// Decode flattened rows into one document per cascade source, in order.
///
/// Null entries (keys that only introduce nested keys) are dropped.
pub fn decode_documents(lines: &[Line], separator: Separator) -> Result<Vec<CascadeDocument>> {
    let mut documents: Vec<CascadeDocument> = Vec::new();

    for entry in group_entries(lines) {
        let Some(value) = decode_entry(&entry, separator)? else {
            continue;
        };

        let same_origin = documents
            .last()
            .is_some_and(|doc| doc.origin == entry.origin);
        if !same_origin {
            documents.push(CascadeDocument::new(entry.origin));
        }
        if let Some(document) = documents.last_mut() {
            document.entries.push((entry.key, value));
        }
    }

    tracing::debug!(documents = documents.len(), "Decoded flattened entries");
    Ok(documents)
}
