//! `.env` override files.
//!
//! Before the document path is chosen, key=value files are injected into the
//! process environment, so they can set `CONFIG_DIR`, `CONFIG_IS_PROD` and
//! friends. Candidates, lowest priority first:
//!
//! 1. `<cwd>/gonfik.env`
//! 2. `<cwd>/config/*.env`, alphabetically
//!
//! Every file is parsed once up front, so a malformed file leaves the
//! environment untouched. The files are then applied one at a time: a later
//! file wins over an earlier one for the same key, and `${VAR}` in a later
//! file sees what earlier files set. Variables present in the process
//! environment before the pass are never replaced.
//!
//! Applying writes the process environment, which is why the entry points
//! are `unsafe`. See [`apply_overrides_in`] for the contract.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::error::GonfikError;

pub const OVERRIDE_FILE: &str = "gonfik.env";
pub const OVERRIDE_DIR: &str = "config";

/// What one override pass did.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct OverrideReport {
    /// Files that were read, in load order.
    pub files: Vec<PathBuf>,
    /// Variables that were set in the process environment.
    pub applied: Vec<String>,
}

/// List override files under `cwd`, lowest priority first.
///
/// Missing files and a missing directory produce no candidates.
pub fn candidate_files(
    cwd: &Path,
    file_name: &str,
    dir_name: &str,
) -> Result<Vec<PathBuf>, GonfikError> {
    let mut files = Vec::new();

    let root_file = cwd.join(file_name);
    if root_file.is_file() {
        files.push(root_file);
    }

    let dir = cwd.join(dir_name);
    let dir_str = dir.to_str().ok_or_else(|| GonfikError::OverrideGlob {
        pattern: dir.display().to_string(),
        reason: "path is not valid UTF-8".into(),
    })?;
    let pattern = format!("{}/*.env", glob::Pattern::escape(dir_str));

    let paths = glob::glob(&pattern).map_err(|e| GonfikError::OverrideGlob {
        pattern: pattern.clone(),
        reason: e.to_string(),
    })?;
    for entry in paths {
        let path = entry.map_err(|e| GonfikError::OverrideGlob {
            pattern: pattern.clone(),
            reason: e.to_string(),
        })?;
        if path.is_file() {
            files.push(path);
        }
    }

    Ok(files)
}

/// Parse every file in order into one map; later files win.
///
/// Nothing is written to the environment, so `${VAR}` here only sees the
/// process environment and earlier lines of the same file.
pub fn read_overrides(files: &[PathBuf]) -> Result<BTreeMap<String, String>, GonfikError> {
    let mut merged = BTreeMap::new();
    for path in files {
        let iter = dotenvy::from_path_iter(path).map_err(|e| map_dotenv_error(path, e))?;
        for item in iter {
            let (key, value) = item.map_err(|e| map_dotenv_error(path, e))?;
            merged.insert(key, value);
        }
    }
    Ok(merged)
}

/// Run one override pass rooted at `cwd`.
///
/// # Safety
///
/// This calls [`std::env::set_var`]. No other thread may read or write the
/// process environment while it runs, which includes `std::env::var` and
/// libc calls such as `getenv` made by other libraries. Calling it from
/// `main` before spawning threads is sound; tests must run it serially with
/// every other test that touches the environment.
pub unsafe fn apply_overrides_in(
    cwd: &Path,
    file_name: &str,
    dir_name: &str,
) -> Result<OverrideReport, GonfikError> {
    let files = candidate_files(cwd, file_name, dir_name)?;
    tracing::debug!(?files, "override candidates");

    let merged = read_overrides(&files)?;
    let preset: BTreeSet<String> = merged
        .keys()
        .filter(|key| std::env::var_os(key).is_some())
        .cloned()
        .collect();

    let mut applied = Vec::new();
    for path in &files {
        // Parsed again so substitution sees the variables set by earlier files.
        let iter = dotenvy::from_path_iter(path).map_err(|e| map_dotenv_error(path, e))?;
        for item in iter {
            let (key, value) = item.map_err(|e| map_dotenv_error(path, e))?;
            if preset.contains(&key) {
                continue;
            }
            // SAFETY: the caller guarantees no concurrent environment access.
            unsafe { std::env::set_var(&key, value) };
            if !applied.contains(&key) {
                applied.push(key);
            }
        }
    }

    Ok(OverrideReport { files, applied })
}

/// Run one override pass rooted at the current working directory with the
/// default file and directory names.
///
/// # Safety
///
/// Same contract as [`apply_overrides_in`].
pub unsafe fn apply_overrides() -> Result<OverrideReport, GonfikError> {
    let cwd = std::env::current_dir()
        .map_err(|e| GonfikError::WorkingDirectoryUnavailable { source: e })?;
    // SAFETY: forwarded from the caller.
    unsafe { apply_overrides_in(&cwd, OVERRIDE_FILE, OVERRIDE_DIR) }
}

fn map_dotenv_error(path: &Path, err: dotenvy::Error) -> GonfikError {
    match err {
        dotenvy::Error::LineParse(_, index) => GonfikError::OverrideParse {
            path: path.to_path_buf(),
            index,
        },
        dotenvy::Error::Io(source) => GonfikError::OverrideRead {
            path: path.to_path_buf(),
            source,
        },
        other => GonfikError::OverrideRead {
            path: path.to_path_buf(),
            source: std::io::Error::other(other.to_string()),
        },
    }
}
