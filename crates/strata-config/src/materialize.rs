//! Conversion of merged values to JSON.

use crate::types::{ConfigValue, ConfigValueKind, scalar_text};
use serde_json::{Map, Number, Value};
use yaml_rust2::Yaml;

/// Convert a value tree to JSON, keeping key order.
pub fn to_json(value: &ConfigValue) -> Value {
    match &value.value {
        ConfigValueKind::Scalar(yaml) => scalar_to_json(yaml),
        ConfigValueKind::Array(items) => Value::Array(items.iter().map(to_json).collect()),
        ConfigValueKind::Map(entries) => Value::Object(
            entries
                .iter()
                .map(|(key, child)| (key.clone(), to_json(child)))
                .collect::<Map<String, Value>>(),
        ),
    }
}

fn scalar_to_json(yaml: &Yaml) -> Value {
    match yaml {
        Yaml::String(s) => Value::String(s.clone()),
        Yaml::Integer(i) => Value::from(*i),
        Yaml::Boolean(b) => Value::Bool(*b),
        // .inf and .nan have no JSON number form
        Yaml::Real(_) => yaml
            .as_f64()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(scalar_text(yaml))),
        _ => Value::Null,
    }
}
