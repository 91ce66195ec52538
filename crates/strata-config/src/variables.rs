//! `${path}` variable substitution.
//!
//! Values are looked up in an index of every `path: value` definition in the
//! cascade (overrides included), not in the merged tree, so a variable can
//! refer to a key that a later layer replaced by a different shape.

use crate::merge::CascadeDocument;
use crate::sanitize::expand_key;
use crate::types::{ConfigValue, ConfigValueKind, Separator, scalar_text};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;
use yaml_rust2::Yaml;

static TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$\{([^}]*)\}").expect("valid regex"));

/// Indexed values may refer to other variables at most this deep.
pub const MAX_VARIABLE_DEPTH: usize = 32;

/// Scalar value of every defined path. Later definitions win.
#[derive(Debug, Clone, Default)]
pub struct ValueIndex {
    values: HashMap<String, Yaml>,
}

impl ValueIndex {
    pub fn build(documents: &[CascadeDocument], separator: Separator) -> Self {
        let mut index = Self::default();
        for document in documents {
            for (key, value) in &document.entries {
                let path = separator.join(&expand_key(key, separator));
                index.insert(path, value, separator);
            }
        }
        tracing::debug!(paths = index.len(), "Built variable index");
        index
    }

    fn insert(&mut self, path: String, value: &ConfigValue, separator: Separator) {
        match &value.value {
            ConfigValueKind::Scalar(yaml) => {
                self.values.insert(path, yaml.clone());
            }
            ConfigValueKind::Map(entries) => {
                for (key, child) in entries {
                    self.insert(format!("{path}{separator}{key}"), child, separator);
                }
            }
            ConfigValueKind::Array(_) => {}
        }
    }

    pub fn get(&self, path: &str) -> Option<&Yaml> {
        self.values.get(path)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn lookup(&self, path: &str, stack: &mut Vec<String>, unresolved: &mut Vec<String>) -> Option<Yaml> {
        if stack.iter().any(|seen| seen == path) || stack.len() >= MAX_VARIABLE_DEPTH {
            tracing::warn!(path, "Variable refers back to itself");
            return None;
        }
        match self.values.get(path)? {
            Yaml::String(text) if text.contains("${") => {
                stack.push(path.to_string());
                let expanded = self.expand(text, stack, unresolved);
                stack.pop();
                Some(expanded)
            }
            other => Some(other.clone()),
        }
    }

    /// Replace the tokens in `text`.
    ///
    /// Text that is exactly one token takes the indexed value with its type;
    /// tokens inside longer text take the value's textual form.
    fn expand(&self, text: &str, stack: &mut Vec<String>, unresolved: &mut Vec<String>) -> Yaml {
        if let Some(caps) = TOKEN.captures(text) {
            if caps.get(0).is_some_and(|m| m.as_str() == text) {
                return match self.lookup(&caps[1], stack, unresolved) {
                    Some(value) => value,
                    None => {
                        note_unresolved(unresolved, text);
                        Yaml::String(text.to_string())
                    }
                };
            }
        }

        let replaced = TOKEN.replace_all(text, |caps: &Captures| {
            match self.lookup(&caps[1], stack, unresolved) {
                Some(value) => scalar_text(&value),
                None => {
                    note_unresolved(unresolved, &caps[0]);
                    caps[0].to_string()
                }
            }
        });
        Yaml::String(replaced.into_owned())
    }
}

fn note_unresolved(unresolved: &mut Vec<String>, token: &str) {
    if !unresolved.iter().any(|t| t == token) {
        unresolved.push(token.to_string());
    }
}

/// Substitute every token in the string values and mapping keys of `value`.
///
/// Keys always take the textual form of the substituted value.
/// Returns the distinct tokens that had no value; those stay in place.
pub fn substitute(value: &mut ConfigValue, index: &ValueIndex) -> Vec<String> {
    let mut unresolved = Vec::new();
    substitute_value(value, index, &mut unresolved);
    unresolved
}

fn substitute_value(value: &mut ConfigValue, index: &ValueIndex, unresolved: &mut Vec<String>) {
    match &mut value.value {
        ConfigValueKind::Scalar(yaml) => {
            if let Yaml::String(text) = yaml {
                if text.contains("${") {
                    let mut stack = Vec::new();
                    let expanded = index.expand(text, &mut stack, unresolved);
                    *yaml = expanded;
                }
            }
        }
        ConfigValueKind::Array(items) => {
            for item in items {
                substitute_value(item, index, unresolved);
            }
        }
        ConfigValueKind::Map(entries) => {
            if entries.keys().any(|key| key.contains("${")) {
                *entries = std::mem::take(entries)
                    .into_iter()
                    .map(|(key, child)| (substitute_key(key, index, unresolved), child))
                    .collect();
            }
            for child in entries.values_mut() {
                substitute_value(child, index, unresolved);
            }
        }
    }
}

fn substitute_key(key: String, index: &ValueIndex, unresolved: &mut Vec<String>) -> String {
    if !key.contains("${") {
        return key;
    }
    let mut stack = Vec::new();
    scalar_text(&index.expand(&key, &mut stack, unresolved))
}
