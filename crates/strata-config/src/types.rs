//! Core type definitions for cascading and merging.

use crate::error::{CascadeError, Result};
use indexmap::IndexMap;
use std::fmt;
use yaml_rust2::Yaml;

/// Placeholder for a `.` inside a quoted key.
pub const QUOTED_DOT: char = '\u{E000}';

/// Placeholder for an unquoted `.` written by the user in a key.
pub const USER_DOT: char = '\u{E001}';

/// Placeholder for a separator character inside a quoted key (when the separator is not `.`).
pub const QUOTED_SEPARATOR: char = '\u{E002}';

/// Character joining the segments of a dotted key path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Separator(char);

impl Separator {
    pub const DOT: Separator = Separator('.');

    /// Validate a separator character.
    ///
    /// Whitespace, `:`, `#`, quotes and the sanitizer placeholders are rejected
    /// because they already mean something in a source row.
    pub fn new(separator: char) -> Result<Self> {
        let reserved = separator.is_whitespace()
            || matches!(separator, ':' | '#' | '"' | '\'' | '&' | '*' | '-')
            || matches!(separator, QUOTED_DOT | USER_DOT | QUOTED_SEPARATOR);
        if reserved {
            return Err(CascadeError::InvalidSeparator { separator });
        }
        Ok(Separator(separator))
    }

    pub fn as_char(self) -> char {
        self.0
    }

    pub fn join<S: AsRef<str>>(self, segments: &[S]) -> String {
        let mut joined = String::new();
        for (i, segment) in segments.iter().enumerate() {
            if i > 0 {
                joined.push(self.0);
            }
            joined.push_str(segment.as_ref());
        }
        joined
    }
}

impl Default for Separator {
    fn default() -> Self {
        Separator::DOT
    }
}

impl fmt::Display for Separator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A decoded value together with the cascade layer that supplied it.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigValue {
    /// The underlying value
    pub value: ConfigValueKind,

    /// Index of the cascade source the value came from
    pub origin: usize,
}

/// The kind of configuration value.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValueKind {
    /// Atomic values (String, Integer, Real, Boolean, Null).
    Scalar(Yaml),

    /// Sequences are replaced wholesale when merged.
    Array(Vec<ConfigValue>),

    /// Mappings merge key-by-key.
    Map(IndexMap<String, ConfigValue>),
}

impl ConfigValue {
    pub fn new_scalar(yaml: Yaml, origin: usize) -> Self {
        Self {
            value: ConfigValueKind::Scalar(yaml),
            origin,
        }
    }

    pub fn new_array(items: Vec<ConfigValue>, origin: usize) -> Self {
        Self {
            value: ConfigValueKind::Array(items),
            origin,
        }
    }

    pub fn new_map(entries: IndexMap<String, ConfigValue>, origin: usize) -> Self {
        Self {
            value: ConfigValueKind::Map(entries),
            origin,
        }
    }

    pub fn empty_map(origin: usize) -> Self {
        Self::new_map(IndexMap::new(), origin)
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self.value, ConfigValueKind::Scalar(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self.value, ConfigValueKind::Array(_))
    }

    pub fn is_map(&self) -> bool {
        matches!(self.value, ConfigValueKind::Map(_))
    }

    pub fn as_yaml(&self) -> Option<&Yaml> {
        match &self.value {
            ConfigValueKind::Scalar(yaml) => Some(yaml),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_yaml().and_then(Yaml::as_str)
    }

    pub fn as_array(&self) -> Option<&[ConfigValue]> {
        match &self.value {
            ConfigValueKind::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, ConfigValue>> {
        match &self.value {
            ConfigValueKind::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Look up a child of a map value.
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.as_map().and_then(|map| map.get(key))
    }

    /// Follow a path of map keys.
    pub fn get_path(&self, path: &[&str]) -> Option<&ConfigValue> {
        path.iter().try_fold(self, |current, key| current.get(key))
    }
}

/// Textual form of a scalar, as it would be written in a source row.
pub fn scalar_text(yaml: &Yaml) -> String {
    match yaml {
        Yaml::String(s) | Yaml::Real(s) => s.clone(),
        Yaml::Integer(i) => i.to_string(),
        Yaml::Boolean(b) => b.to_string(),
        Yaml::Null => "null".to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar(s: &str) -> ConfigValue {
        ConfigValue::new_scalar(Yaml::String(s.into()), 0)
    }

    fn map(entries: Vec<(&str, ConfigValue)>) -> ConfigValue {
        let map: IndexMap<String, ConfigValue> = entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        ConfigValue::new_map(map, 0)
    }

    #[test]
    fn test_separator_rejects_reserved_characters() {
        for c in [' ', ':', '#', '"', '\'', '\t', QUOTED_DOT, USER_DOT] {
            assert!(Separator::new(c).is_err(), "{:?} should be rejected", c);
        }
        assert_eq!(Separator::new('_').unwrap().as_char(), '_');
        assert_eq!(Separator::default(), Separator::DOT);
    }

    #[test]
    fn test_separator_join() {
        let sep = Separator::new('/').unwrap();
        assert_eq!(sep.join(&["a", "b", "c"]), "a/b/c");
        assert_eq!(sep.join::<&str>(&[]), "");
    }

    #[test]
    fn test_get_path() {
        let config = map(vec![("a", map(vec![("b", scalar("deep"))]))]);
        assert_eq!(config.get_path(&["a", "b"]).and_then(ConfigValue::as_str), Some("deep"));
        assert!(config.get_path(&["a", "missing"]).is_none());
        assert!(config.get_path(&["a", "b", "c"]).is_none());
        assert_eq!(config.get_path(&[]), Some(&config));
    }

    #[test]
    fn test_kind_predicates() {
        assert!(scalar("x").is_scalar());
        assert!(ConfigValue::new_array(vec![], 0).is_array());
        assert!(ConfigValue::empty_map(0).is_map());
    }

    #[test]
    fn test_scalar_text() {
        assert_eq!(scalar_text(&Yaml::Integer(3)), "3");
        assert_eq!(scalar_text(&Yaml::Real("1.5".into())), "1.5");
        assert_eq!(scalar_text(&Yaml::Boolean(false)), "false");
        assert_eq!(scalar_text(&Yaml::String("a b".into())), "a b");
    }
}
