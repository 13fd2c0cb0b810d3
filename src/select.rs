//! Choosing which document to load.
//!
//! The directory comes from `CONFIG_DIR` (default `/config`). The filename is
//! picked by `CONFIG_IS_PROD`: exactly `"true"` reads `CONFIG_PROD_FILE`,
//! anything else (including unset, `"TRUE"` or `"1"`) reads
//! `CONFIG_DEV_FILE`. Either branch falls back to `application.json` when
//! its variable is unset or empty.

use std::path::PathBuf;

use crate::env::{self, EnvSource};

pub const DEFAULT_CONFIG_DIR: &str = "/config";
pub const DEFAULT_FILE_NAME: &str = "application.json";

/// The directory and filename chosen for the structured document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub dir: PathBuf,
    pub file_name: String,
}

impl Selection {
    /// `dir` joined with `file_name`, not yet anchored to the working directory.
    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }
}

pub fn select_file(env: &impl EnvSource) -> Selection {
    Selection {
        dir: select_dir(env),
        file_name: select_file_name(env),
    }
}

pub fn select_dir(env: &impl EnvSource) -> PathBuf {
    env::non_empty(env, env::CONFIG_DIR)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_DIR))
}

pub fn select_file_name(env: &impl EnvSource) -> String {
    let key = if is_prod(env) {
        env::CONFIG_PROD_FILE
    } else {
        env::CONFIG_DEV_FILE
    };
    env::non_empty(env, key).unwrap_or_else(|| DEFAULT_FILE_NAME.to_string())
}

/// Strict comparison: only the literal `"true"` counts.
pub fn is_prod(env: &impl EnvSource) -> bool {
    env.var(env::CONFIG_IS_PROD).as_deref() == Some("true")
}
