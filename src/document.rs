//! Loading the structured document.
//!
//! The selected path is always anchored at the working directory: a leading
//! `/` is dropped before joining, so the default `/config/application.json`
//! reads `<cwd>/config/application.json`. This keeps the document next to the
//! `<cwd>/config/*.env` override files.
//!
//! The format follows the extension. `.toml` parses as TOML, anything else as
//! JSON. Either way the document root must be a mapping.

use std::fs::File;
use std::io::Read;
use std::path::{Component, Path, PathBuf};

use crate::error::GonfikError;
use crate::value::{self, ConfigTable, ConfigValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Toml,
}

impl DocumentFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => DocumentFormat::Toml,
            _ => DocumentFormat::Json,
        }
    }
}

/// Join `path` under `cwd`, ignoring any root or prefix component of `path`.
pub fn anchor(cwd: &Path, path: &Path) -> PathBuf {
    let relative: PathBuf = path
        .components()
        .filter(|c| !matches!(c, Component::RootDir | Component::Prefix(_)))
        .collect();
    cwd.join(relative)
}

/// Open, read, and parse the document at `path`.
///
/// `path` is used as given; callers anchor it first.
pub fn load_document(path: &Path) -> Result<ConfigTable, GonfikError> {
    let mut file = File::open(path).map_err(|e| GonfikError::DocumentOpen {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|e| GonfikError::DocumentRead {
            path: path.to_path_buf(),
            source: e,
        })?;
    drop(file);

    parse_document(&content, DocumentFormat::from_path(path), path)
}

/// Parse document text. `path` is only used in error messages.
pub fn parse_document(
    content: &str,
    format: DocumentFormat,
    path: &Path,
) -> Result<ConfigTable, GonfikError> {
    match format {
        DocumentFormat::Json => {
            let value: serde_json::Value =
                serde_json::from_str(content).map_err(|e| GonfikError::DocumentParse {
                    path: path.to_path_buf(),
                    source: e,
                })?;
            match ConfigValue::from(value) {
                ConfigValue::Table(table) => Ok(table),
                _ => Err(GonfikError::DocumentNotTable {
                    path: path.to_path_buf(),
                }),
            }
        }
        DocumentFormat::Toml => {
            let table: toml::Table =
                toml::from_str(content).map_err(|e| GonfikError::DocumentParseToml {
                    path: path.to_path_buf(),
                    source: e,
                })?;
            Ok(value::table_from_toml(table))
        }
    }
}
