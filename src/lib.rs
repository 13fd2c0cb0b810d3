//! Environment-selected configuration with dot-path queries.
//!
//! Gonfik loads one structured document (JSON, or TOML by extension) chosen
//! from environment variables, optionally after injecting `.env` override
//! files into the environment, and answers lookups like `database.host`.
//!
//! ```ignore
//! let config = gonfik::global()?;
//! let host = config.config("database.host").unwrap_or_default();
//! ```
//!
//! # Choosing the document
//!
//! | Variable | Effect |
//! |----------|--------|
//! | `CONFIG_DIR` | Directory holding the document. Default `/config`. |
//! | `CONFIG_IS_PROD` | Exactly `true` selects the production file. |
//! | `CONFIG_PROD_FILE` | File name on the production branch. |
//! | `CONFIG_DEV_FILE` | File name on every other branch. |
//!
//! An unset or empty file variable falls back to `application.json`. The
//! `CONFIG_IS_PROD` comparison is strict: `TRUE`, `1` and unset all mean dev.
//!
//! The resulting path is resolved under the working directory, leading `/`
//! included, so the default document is `<cwd>/config/application.json`.
//!
//! # Override files
//!
//! Before the document is chosen, `<cwd>/gonfik.env` and then
//! `<cwd>/config/*.env` are read. Later files win over earlier ones and may
//! refer to their variables as `${VAR}`; variables already set in the process
//! are left alone. The document is then chosen again against the updated
//! environment, so override files may set `CONFIG_DIR` and friends.
//!
//! Override variables are written with `std::env::set_var`, so the first
//! [`global`] call (or any [`GonfikBuilder::load`] with overrides enabled)
//! must happen before other threads use the environment, typically at the
//! top of `main`.
//!
//! A broken override file does not stop loading. It is logged at `warn` and
//! available from [`Gonfik::override_error`].
//!
//! # Lookups
//!
//! [`Gonfik::config`] walks the dotted path and stops at the first value that
//! is not a mapping:
//!
//! ```text
//! {"test": {"foo": {"bar": "config"}}}
//!
//! test.foo.bar      -> Some("config")
//! test.foo.bar.baz  -> Some("config")
//! test.foo          -> Some("")
//! test.foo.missing  -> None
//! ```
//!
//! [`Gonfik::get`] is the strict form returning the raw [`ConfigValue`], and
//! [`Gonfik::extract`] deserializes a section into a `confique` config struct
//! with its defaults filled in.
//!
//! # One load per process
//!
//! [`global`] loads on the first successful call and returns the same handle
//! afterwards; concurrent first callers cause a single load. A failed load is
//! not cached: callers that were waiting on it all receive the same
//! [`GonfikError::InitFailed`], and the next call tries again. For explicit,
//! non-global loads use [`Gonfik::builder`].

pub mod document;
pub mod env;
pub mod error;
pub mod overrides;
pub mod resolve;
pub mod select;
pub mod value;

mod builder;
mod handle;
mod registry;

#[cfg(test)]
mod fixtures;

pub use builder::GonfikBuilder;
pub use error::GonfikError;
pub use handle::{Gonfik, OverrideOutcome};
pub use overrides::OverrideReport;
pub use registry::{Registry, global};
pub use select::Selection;
pub use value::{ConfigTable, ConfigValue};
