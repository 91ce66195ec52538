//! Cascade merging.
//!
//! Documents are folded left to right. Mappings merge key by key; any other
//! value (scalars and whole sequences) is replaced by the later layer.

use crate::sanitize::expand_key;
use crate::types::{ConfigValue, ConfigValueKind, Separator};
use indexmap::IndexMap;

/// The decoded entries of one cascade source, keyed by flattened path.
#[derive(Debug, Clone, PartialEq)]
pub struct CascadeDocument {
    pub origin: usize,
    pub entries: Vec<(String, ConfigValue)>,
}

impl CascadeDocument {
    pub fn new(origin: usize) -> Self {
        Self {
            origin,
            entries: Vec::new(),
        }
    }

    /// Expand every flattened key into nested maps and merge them in order.
    pub fn to_tree(&self, separator: Separator) -> ConfigValue {
        let mut root = ConfigValue::empty_map(self.origin);
        for (key, value) in &self.entries {
            merge_into(&mut root, nest(&expand_key(key, separator), value.clone()));
        }
        root
    }
}

/// Wrap `value` in one single-key map per path segment.
pub fn nest(segments: &[String], value: ConfigValue) -> ConfigValue {
    let origin = value.origin;
    segments.iter().rev().fold(value, |inner, segment| {
        let mut map = IndexMap::new();
        map.insert(segment.clone(), inner);
        ConfigValue::new_map(map, origin)
    })
}

/// Merge `incoming` over `target`.
pub fn merge_into(target: &mut ConfigValue, incoming: ConfigValue) {
    let origin = incoming.origin;
    match incoming.value {
        ConfigValueKind::Map(entries) if target.is_map() => {
            if let ConfigValueKind::Map(existing) = &mut target.value {
                for (key, value) in entries {
                    match existing.get_mut(&key) {
                        Some(slot) => merge_into(slot, value),
                        None => {
                            existing.insert(key, value);
                        }
                    }
                }
            }
            target.origin = origin;
        }
        value => *target = ConfigValue { value, origin },
    }
}

/// Running fold of the cascade.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedDocument {
    root: ConfigValue,
}

impl MergedDocument {
    pub fn new() -> Self {
        Self {
            root: ConfigValue::empty_map(0),
        }
    }

    pub fn merge(&mut self, document: &CascadeDocument, separator: Separator) {
        tracing::trace!(
            origin = document.origin,
            entries = document.entries.len(),
            "Merging cascade layer"
        );
        merge_into(&mut self.root, document.to_tree(separator));
    }

    pub fn root(&self) -> &ConfigValue {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut ConfigValue {
        &mut self.root
    }

    pub fn into_root(self) -> ConfigValue {
        self.root
    }
}

impl Default for MergedDocument {
    fn default() -> Self {
        Self::new()
    }
}
