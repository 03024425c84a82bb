//! Read-capability contract shared by real and recording configurations.
//!
//! Spell layers and actions only ever see `&dyn ConfigurationSection`, so the
//! same initialization code runs unchanged against stored data
//! ([`ValueConfiguration`]) or against the interrogation recorder. Each
//! accessor takes the caller's default and returns a value of the accessor's
//! type; the [`ValueKind`] of the accessor is what the recorder reports as the
//! observed type.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Semantic type implied by the accessor used to read a key.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Boolean,
    Integer,
    Double,
    String,
    Enumeration,
    StringList,
    List,
    Section,
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Boolean => "boolean",
            ValueKind::Integer => "integer",
            ValueKind::Double => "double",
            ValueKind::String => "string",
            ValueKind::Enumeration => "enumeration",
            ValueKind::StringList => "string_list",
            ValueKind::List => "list",
            ValueKind::Section => "section",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ValueKind::Integer | ValueKind::Double)
    }

    pub fn is_textual(&self) -> bool {
        matches!(self, ValueKind::String | ValueKind::Enumeration)
    }

    pub fn is_list(&self) -> bool {
        matches!(self, ValueKind::List | ValueKind::StringList)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named set of accepted string values, e.g. `target_type`.
///
/// Enumerations get their own type key in the catalog so editors can offer the
/// option list instead of a free-form string.
#[derive(Clone, Copy, Debug)]
pub struct EnumType {
    pub name: &'static str,
    pub options: &'static [&'static str],
}

impl EnumType {
    pub const fn new(name: &'static str, options: &'static [&'static str]) -> Self {
        Self { name, options }
    }

    /// Case-insensitive lookup returning the canonical spelling.
    pub fn parse(&self, raw: &str) -> Option<&'static str> {
        self.options
            .iter()
            .copied()
            .find(|option| option.eq_ignore_ascii_case(raw.trim()))
    }
}

/// Everything a spell layer or action may ask of its configuration.
pub trait ConfigurationSection {
    fn get_string(&self, key: &str, default: Option<&str>) -> Option<String>;

    fn get_int(&self, key: &str, default: i64) -> i64;

    fn get_double(&self, key: &str, default: f64) -> f64;

    fn get_boolean(&self, key: &str, default: bool) -> bool;

    fn get_enum(&self, key: &str, kind: &EnumType, default: Option<&str>) -> Option<String>;

    /// Missing lists read as empty.
    fn get_string_list(&self, key: &str) -> Vec<String>;

    fn get_list(&self, key: &str) -> Vec<Value>;

    /// Nested sections are always returned, empty when absent.
    fn get_section(&self, key: &str) -> Box<dyn ConfigurationSection>;

    fn contains(&self, key: &str) -> bool;

    /// Keys directly present in this section.
    fn keys(&self) -> Vec<String>;
}

#[derive(Clone, Debug, Default)]
/// Configuration backed by stored JSON data.
///
/// Mistyped values fall back to the caller's default rather than erroring,
/// matching how spell configs are read at runtime.
pub struct ValueConfiguration {
    values: Map<String, Value>,
}

impl ValueConfiguration {
    pub fn new(values: Map<String, Value>) -> Self {
        Self { values }
    }

    /// Build from any JSON value; non-objects produce an empty section.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(values) => Self { values },
            _ => Self::default(),
        }
    }
}

impl ConfigurationSection for ValueConfiguration {
    fn get_string(&self, key: &str, default: Option<&str>) -> Option<String> {
        match self.values.get(key) {
            Some(Value::String(value)) => Some(value.clone()),
            Some(Value::Number(value)) => Some(value.to_string()),
            Some(Value::Bool(value)) => Some(value.to_string()),
            _ => default.map(str::to_string),
        }
    }

    fn get_int(&self, key: &str, default: i64) -> i64 {
        match self.values.get(key) {
            Some(Value::Number(value)) => value
                .as_i64()
                .or_else(|| value.as_f64().map(|v| v as i64))
                .unwrap_or(default),
            Some(Value::String(value)) => value.trim().parse().unwrap_or(default),
            _ => default,
        }
    }

    fn get_double(&self, key: &str, default: f64) -> f64 {
        match self.values.get(key) {
            Some(Value::Number(value)) => value.as_f64().unwrap_or(default),
            Some(Value::String(value)) => value.trim().parse().unwrap_or(default),
            _ => default,
        }
    }

    fn get_boolean(&self, key: &str, default: bool) -> bool {
        match self.values.get(key) {
            Some(Value::Bool(value)) => *value,
            Some(Value::String(value)) => match value.trim() {
                "true" => true,
                "false" => false,
                _ => default,
            },
            _ => default,
        }
    }

    fn get_enum(&self, key: &str, kind: &EnumType, default: Option<&str>) -> Option<String> {
        self.values
            .get(key)
            .and_then(Value::as_str)
            .and_then(|raw| kind.parse(raw))
            .or(default)
            .map(str::to_string)
    }

    fn get_string_list(&self, key: &str) -> Vec<String> {
        match self.values.get(key) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| match item {
                    Value::String(value) => Some(value.clone()),
                    Value::Number(value) => Some(value.to_string()),
                    _ => None,
                })
                .collect(),
            // A bare string is a one-element list.
            Some(Value::String(value)) => vec![value.clone()],
            _ => Vec::new(),
        }
    }

    fn get_list(&self, key: &str) -> Vec<Value> {
        match self.values.get(key) {
            Some(Value::Array(items)) => items.clone(),
            _ => Vec::new(),
        }
    }

    fn get_section(&self, key: &str) -> Box<dyn ConfigurationSection> {
        let section = self.values.get(key).cloned().unwrap_or(Value::Null);
        Box::new(ValueConfiguration::from_value(section))
    }

    fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    fn keys(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }
}
