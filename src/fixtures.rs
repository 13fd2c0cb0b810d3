#[cfg(test)]
pub mod test {
    use confique::Config;
    use std::path::{Path, PathBuf};

    use crate::value::{ConfigTable, ConfigValue};

    pub const SAMPLE_JSON: &str = r#"{"test":{"foo":{"bar":"config"}}}"#;

    pub const NESTED_JSON: &str = r#"{
        "name": "svc",
        "debug": true,
        "optional": null,
        "database": {
            "host": "localhost",
            "port": 5432,
            "ratio": 0.75,
            "replicas": ["r1", "r2"]
        }
    }"#;

    fn parse(json: &str) -> ConfigTable {
        let value: serde_json::Value = serde_json::from_str(json).unwrap();
        match ConfigValue::from(value) {
            ConfigValue::Table(t) => t,
            other => panic!("fixture is not an object: {other}"),
        }
    }

    pub fn sample_tree() -> ConfigTable {
        parse(SAMPLE_JSON)
    }

    pub fn nested_tree() -> ConfigTable {
        parse(NESTED_JSON)
    }

    /// RAII guard that switches the process working directory and restores
    /// it on drop. Tests using it must be `#[serial]`.
    pub struct CwdGuard {
        original: PathBuf,
    }

    impl CwdGuard {
        pub fn new(dir: &Path) -> Self {
            let original = std::env::current_dir().unwrap();
            std::env::set_current_dir(dir).unwrap();
            Self { original }
        }
    }

    impl Drop for CwdGuard {
        fn drop(&mut self) {
            let _ = std::env::set_current_dir(&self.original);
        }
    }

    #[derive(Config, Debug, PartialEq)]
    pub struct DatabaseConfig {
        /// Database host.
        #[config(default = "127.0.0.1")]
        pub host: String,

        /// Database port.
        #[config(default = 5432)]
        pub port: u16,

        /// Pool size.
        #[config(default = 5)]
        pub pool_size: usize,

        /// Read replicas.
        pub replicas: Option<Vec<String>>,
    }

    #[derive(Config, Debug, PartialEq)]
    pub struct AppConfig {
        pub name: String,

        #[config(default = false)]
        pub debug: bool,

        #[config(nested)]
        pub database: DatabaseConfig,
    }

    #[test]
    fn fixtures_parse() {
        assert!(sample_tree().contains_key("test"));
        assert!(nested_tree()["database"].is_table());
    }
}
