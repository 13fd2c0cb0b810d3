//! Environment variable access.
//!
//! File selection reads a handful of named variables. Reads go through
//! [`EnvSource`] so selection logic can run against synthetic data in tests
//! instead of `std::env`.

use std::collections::HashMap;

/// Directory holding the structured document.
pub const CONFIG_DIR: &str = "CONFIG_DIR";
/// `"true"` (exactly) selects the production file.
pub const CONFIG_IS_PROD: &str = "CONFIG_IS_PROD";
/// Document filename used when `CONFIG_IS_PROD` is `"true"`.
pub const CONFIG_PROD_FILE: &str = "CONFIG_PROD_FILE";
/// Document filename used otherwise.
pub const CONFIG_DEV_FILE: &str = "CONFIG_DEV_FILE";

/// A source of named environment variables.
///
/// Returns `None` when the variable is unset. A variable set to the empty
/// string is reported as `Some("")`; deciding what empty means is up to the
/// caller.
pub trait EnvSource {
    fn var(&self, key: &str) -> Option<String>;
}

/// The live process environment. Every call reads fresh.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        // Non-UTF-8 values cannot name a file we would pick anyway.
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Read `key`, treating an empty value the same as an unset one.
pub fn non_empty(env: &impl EnvSource, key: &str) -> Option<String> {
    env.var(key).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn map_source_reports_presence() {
        let env = vars(&[("CONFIG_DIR", "/srv")]);
        assert_eq!(env.var("CONFIG_DIR").as_deref(), Some("/srv"));
        assert_eq!(env.var("CONFIG_DEV_FILE"), None);
    }

    #[test]
    fn empty_value_is_present_but_not_non_empty() {
        let env = vars(&[("CONFIG_DIR", "")]);
        assert_eq!(env.var("CONFIG_DIR").as_deref(), Some(""));
        assert_eq!(non_empty(&env, "CONFIG_DIR"), None);
    }

    #[test]
    fn whitespace_is_not_trimmed() {
        let env = vars(&[("CONFIG_DIR", " ")]);
        assert_eq!(non_empty(&env, "CONFIG_DIR").as_deref(), Some(" "));
    }

    #[test]
    #[serial]
    fn process_env_reads_fresh_values() {
        temp_env::with_var("GONFIK_TEST_ACCESSOR", Some("one"), || {
            assert_eq!(ProcessEnv.var("GONFIK_TEST_ACCESSOR").as_deref(), Some("one"));
        });
        temp_env::with_var("GONFIK_TEST_ACCESSOR", Some("two"), || {
            assert_eq!(ProcessEnv.var("GONFIK_TEST_ACCESSOR").as_deref(), Some("two"));
        });
        assert_eq!(ProcessEnv.var("GONFIK_TEST_ACCESSOR"), None);
    }
}
