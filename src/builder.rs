use std::path::PathBuf;

use crate::document;
use crate::env::{EnvSource, ProcessEnv};
use crate::error::GonfikError;
use crate::handle::{Gonfik, OverrideOutcome};
use crate::overrides::{self, OVERRIDE_DIR, OVERRIDE_FILE};
use crate::select::{self, Selection};

/// Builder for an explicit, non-singleton configuration load.
///
/// Anything left unset (or set to an empty string) falls back to the
/// environment-driven defaults: `CONFIG_DIR` for the directory,
/// `CONFIG_IS_PROD` with `CONFIG_PROD_FILE`/`CONFIG_DEV_FILE` for the file
/// name.
///
/// Loading runs in a fixed order:
///
/// 1. Select the document path from the current environment.
/// 2. Apply `.env` override files (unless [`no_overrides`](Self::no_overrides)).
/// 3. Select again, since overrides may have changed the variables read in 1.
/// 4. Read and parse the selected document.
#[derive(Debug, Clone)]
pub struct GonfikBuilder {
    config_dir: Option<PathBuf>,
    file_name: Option<String>,
    working_dir: Option<PathBuf>,
    override_file: String,
    override_dir: String,
    overrides_enabled: bool,
}

impl Default for GonfikBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GonfikBuilder {
    pub(crate) fn new() -> Self {
        Self {
            config_dir: None,
            file_name: None,
            working_dir: None,
            override_file: OVERRIDE_FILE.to_string(),
            override_dir: OVERRIDE_DIR.to_string(),
            overrides_enabled: true,
        }
    }

    /// Directory holding the document (default: `CONFIG_DIR`, then `/config`).
    pub fn config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config_dir = Some(dir.into());
        self
    }

    /// Document file name (default: picked from `CONFIG_IS_PROD`).
    pub fn file_name(mut self, name: &str) -> Self {
        self.file_name = Some(name.to_string());
        self
    }

    /// Directory that override files and the document path are resolved
    /// against (default: the process working directory).
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Override file at the working-directory root (default: `gonfik.env`).
    pub fn override_file(mut self, name: &str) -> Self {
        self.override_file = name.to_string();
        self
    }

    /// Directory scanned for `*.env` files (default: `config`).
    pub fn override_dir(mut self, name: &str) -> Self {
        self.override_dir = name.to_string();
        self
    }

    /// Skip `.env` override files entirely.
    pub fn no_overrides(mut self) -> Self {
        self.overrides_enabled = false;
        self
    }

    fn effective_working_dir(&self) -> Result<PathBuf, GonfikError> {
        match &self.working_dir {
            Some(dir) => Ok(dir.clone()),
            None => std::env::current_dir()
                .map_err(|e| GonfikError::WorkingDirectoryUnavailable { source: e }),
        }
    }

    /// Explicit values win; missing or empty ones come from `env`.
    fn selection(&self, env: &impl EnvSource) -> Selection {
        let dir = match &self.config_dir {
            Some(dir) if !dir.as_os_str().is_empty() => dir.clone(),
            _ => select::select_dir(env),
        };
        let file_name = match &self.file_name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => select::select_file_name(env),
        };
        Selection { dir, file_name }
    }

    fn apply_overrides(&self, cwd: &std::path::Path) -> OverrideOutcome {
        if !self.overrides_enabled {
            return OverrideOutcome::Skipped;
        }
        // SAFETY: `load` documents that it must not run alongside other
        // environment access; this is only reached from `load`.
        let result =
            unsafe { overrides::apply_overrides_in(cwd, &self.override_file, &self.override_dir) };
        match result {
            Ok(report) => OverrideOutcome::Applied(report),
            Err(e) => {
                tracing::warn!(error = %e, "override files not loaded");
                OverrideOutcome::Failed(e.to_string())
            }
        }
    }

    /// Load the configuration.
    ///
    /// Override failures are logged and recorded on the result; document
    /// failures are returned.
    ///
    /// Unless [`no_overrides`](Self::no_overrides) is set, this writes the
    /// variables from override files into the process environment. Call it
    /// while no other thread reads or writes the environment, for example
    /// early in `main` before spawning threads. Concurrent environment
    /// access during the override pass is undefined behavior on most
    /// platforms. With `no_overrides` the environment is only read.
    pub fn load(self) -> Result<Gonfik, GonfikError> {
        let cwd = self.effective_working_dir()?;

        let before = self.selection(&ProcessEnv);
        let overrides = self.apply_overrides(&cwd);
        let selection = self.selection(&ProcessEnv);
        if selection != before {
            tracing::debug!(
                before = %before.path().display(),
                after = %selection.path().display(),
                "override files changed the document selection"
            );
        }

        let path = document::anchor(&cwd, &selection.path());
        tracing::debug!(path = %path.display(), "loading configuration document");
        let tree = document::load_document(&path)?;
        tracing::info!(path = %path.display(), keys = tree.len(), "configuration loaded");

        Ok(Gonfik::new(tree, path).with_overrides(overrides))
    }
}
