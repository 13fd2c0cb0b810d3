//! The in-memory configuration tree.
//!
//! Documents are parsed by `serde_json` or `toml` and converted into
//! [`ConfigValue`], so the rest of the crate works on one value model
//! regardless of the source format.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Number;

/// A nested mapping from key to value. Read-only once loaded.
pub type ConfigTable = BTreeMap<String, ConfigValue>;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<ConfigValue>),
    Table(ConfigTable),
}

impl ConfigValue {
    pub fn as_table(&self) -> Option<&ConfigTable> {
        match self {
            ConfigValue::Table(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_table(&self) -> bool {
        matches!(self, ConfigValue::Table(_))
    }
}

/// Strings print verbatim; arrays and tables print as compact JSON.
impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Null => write!(f, "null"),
            ConfigValue::Bool(b) => write!(f, "{b}"),
            ConfigValue::Number(n) => write!(f, "{n}"),
            ConfigValue::String(s) => write!(f, "{s}"),
            ConfigValue::Array(_) | ConfigValue::Table(_) => {
                let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
                write!(f, "{json}")
            }
        }
    }
}

impl From<serde_json::Value> for ConfigValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => ConfigValue::Null,
            serde_json::Value::Bool(b) => ConfigValue::Bool(b),
            serde_json::Value::Number(n) => ConfigValue::Number(n),
            serde_json::Value::String(s) => ConfigValue::String(s),
            serde_json::Value::Array(a) => {
                ConfigValue::Array(a.into_iter().map(ConfigValue::from).collect())
            }
            serde_json::Value::Object(o) => ConfigValue::Table(
                o.into_iter()
                    .map(|(k, v)| (k, ConfigValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<toml::Value> for ConfigValue {
    fn from(value: toml::Value) -> Self {
        match value {
            toml::Value::String(s) => ConfigValue::String(s),
            toml::Value::Integer(i) => ConfigValue::Number(Number::from(i)),
            // JSON numbers cannot hold NaN or infinities.
            toml::Value::Float(x) => Number::from_f64(x)
                .map(ConfigValue::Number)
                .unwrap_or_else(|| ConfigValue::String(x.to_string())),
            toml::Value::Boolean(b) => ConfigValue::Bool(b),
            toml::Value::Datetime(dt) => ConfigValue::String(dt.to_string()),
            toml::Value::Array(a) => {
                ConfigValue::Array(a.into_iter().map(ConfigValue::from).collect())
            }
            toml::Value::Table(t) => ConfigValue::Table(table_from_toml(t)),
        }
    }
}

pub(crate) fn table_from_toml(table: toml::Table) -> ConfigTable {
    table
        .into_iter()
        .map(|(k, v)| (k, ConfigValue::from(v)))
        .collect()
}
