use std::path::{Path, PathBuf};

use confique::Config;
use serde::Deserialize;

use crate::builder::GonfikBuilder;
use crate::error::GonfikError;
use crate::overrides::OverrideReport;
use crate::registry;
use crate::resolve;
use crate::value::{ConfigTable, ConfigValue};

/// How the override pass went for a loaded configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum OverrideOutcome {
    /// Overrides were disabled on the builder.
    Skipped,
    Applied(OverrideReport),
    /// The pass failed; loading went ahead without it. Holds the rendered
    /// error, which was also logged.
    Failed(String),
}

/// A loaded configuration document.
///
/// Read-only after construction, so it can be shared across threads and
/// queried without locking.
#[derive(Debug, Clone, PartialEq)]
pub struct Gonfik {
    tree: ConfigTable,
    file_name: PathBuf,
    overrides: OverrideOutcome,
}

impl Gonfik {
    pub fn builder() -> GonfikBuilder {
        GonfikBuilder::new()
    }

    /// The process-wide configuration, loaded on first use.
    ///
    /// See [`global`](crate::global), including its requirement that the
    /// first call happen before other threads touch the environment.
    pub fn global() -> Result<&'static Gonfik, GonfikError> {
        registry::global()
    }

    /// Wrap an already-parsed tree. `file_name` is kept for diagnostics.
    pub fn new(tree: ConfigTable, file_name: impl Into<PathBuf>) -> Self {
        Self {
            tree,
            file_name: file_name.into(),
            overrides: OverrideOutcome::Skipped,
        }
    }

    pub(crate) fn with_overrides(mut self, overrides: OverrideOutcome) -> Self {
        self.overrides = overrides;
        self
    }

    /// Look up a dotted key and return its value as a string.
    ///
    /// `None` means not found. The walk stops at the first non-mapping value,
    /// so `"port.extra"` still finds `port`; a path that ends on a mapping is
    /// found with an empty string. See [`resolve`](crate::resolve::resolve).
    ///
    /// Numbers keep the form the document gave them: `8080` prints as
    /// `8080`, but a JSON `1.0` prints as `1.0`, not `1`. Callers comparing
    /// numeric settings as strings should write integers without a fraction,
    /// or use [`get`](Self::get) and compare the number.
    pub fn config(&self, key_path: &str) -> Option<String> {
        resolve::resolve(&self.tree, key_path)
    }

    /// Strict lookup returning the raw value, mappings included.
    pub fn get(&self, key_path: &str) -> Option<&ConfigValue> {
        resolve::lookup(&self.tree, key_path)
    }

    /// All leaves as dotted key / formatted value pairs.
    pub fn entries(&self) -> Vec<(String, String)> {
        resolve::flatten(&self.tree)
    }

    /// Deserialize the mapping at `key_path` (or the whole document for an
    /// empty path) into a confique config struct, filling its defaults.
    pub fn extract<C: Config>(&self, key_path: &str) -> Result<C, GonfikError>
    where
        C::Layer: for<'de> Deserialize<'de>,
    {
        let json = if key_path.is_empty() {
            serde_json::to_value(&self.tree)
        } else {
            let table = resolve::lookup(&self.tree, key_path)
                .and_then(ConfigValue::as_table)
                .ok_or_else(|| GonfikError::KeyNotFound(key_path.into()))?;
            serde_json::to_value(table)
        }
        .map_err(|e| GonfikError::InvalidValue {
            key: key_path.into(),
            reason: e.to_string(),
        })?;

        let layer: C::Layer =
            serde_json::from_value(json).map_err(|e| GonfikError::InvalidValue {
                key: key_path.into(),
                reason: e.to_string(),
            })?;

        C::builder()
            .preloaded(layer)
            .load()
            .map_err(GonfikError::from)
    }

    pub fn tree(&self) -> &ConfigTable {
        &self.tree
    }

    /// The path the document was read from.
    pub fn file_name(&self) -> &Path {
        &self.file_name
    }

    pub fn overrides(&self) -> &OverrideOutcome {
        &self.overrides
    }

    /// The non-fatal override failure, if the pass failed.
    pub fn override_error(&self) -> Option<&str> {
        match &self.overrides {
            OverrideOutcome::Failed(msg) => Some(msg),
            _ => None,
        }
    }
}
