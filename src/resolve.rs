//! Dot-path lookups over a loaded [`ConfigTable`].
//!
//! [`resolve`] is the query behind [`Gonfik::config`](crate::Gonfik::config).
//! Its walk stops at the first value that is not a mapping and reports that
//! value as found, even when segments remain:
//!
//! ```text
//! {"test": {"foo": {"bar": "config"}}}
//!
//! test.foo.bar      -> Some("config")
//! test.foo.bar.baz  -> Some("config")   walk ended early at a leaf
//! test.foo          -> Some("")         path ran out inside a mapping
//! test.foo.missing  -> None
//! ```
//!
//! [`lookup`] is the strict variant: every segment must be consumed, and
//! mappings are returned as values.

use crate::value::{ConfigTable, ConfigValue};

/// Resolve `key_path` to the string form of the first non-mapping value on
/// its walk.
///
/// Returns `None` when a segment is missing or the path is empty, and
/// `Some("")` when every segment named a mapping.
pub fn resolve(tree: &ConfigTable, key_path: &str) -> Option<String> {
    if key_path.is_empty() {
        return None;
    }

    let mut current = tree;
    for segment in key_path.split('.') {
        match current.get(segment)? {
            ConfigValue::Table(next) => current = next,
            leaf => return Some(leaf.to_string()),
        }
    }
    Some(String::new())
}

/// Navigate by dotted key, consuming every segment.
pub fn lookup<'a>(tree: &'a ConfigTable, key_path: &str) -> Option<&'a ConfigValue> {
    if key_path.is_empty() {
        return None;
    }

    let (path, leaf) = match key_path.rsplit_once('.') {
        Some((p, l)) => (Some(p), l),
        None => (None, key_path),
    };

    let table = match path {
        Some(path) => {
            let mut current = tree;
            for segment in path.split('.') {
                current = current.get(segment)?.as_table()?;
            }
            current
        }
        None => tree,
    };

    table.get(leaf)
}

/// Every leaf as a `(dotted_key, formatted_value)` pair, in key order.
///
/// Arrays, nulls and empty mappings count as leaves.
pub fn flatten(tree: &ConfigTable) -> Vec<(String, String)> {
    let mut out = Vec::new();
    collect(tree, "", &mut out);
    out
}

fn collect(table: &ConfigTable, prefix: &str, out: &mut Vec<(String, String)>) {
    for (key, value) in table {
        let dotted = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            ConfigValue::Table(sub) if !sub.is_empty() => collect(sub, &dotted, out),
            other => out.push((dotted, other.to_string())),
        }
    }
}
