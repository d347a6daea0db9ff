//! Loader for runtime configuration with YAML + environment overlays.
//!
//! Every field has a default, so the service runs with no config file at
//! all. Environment variables use the `BRANDSCOPE_` prefix with `__` as the
//! nesting separator (`BRANDSCOPE_SERVER__BIND`, `BRANDSCOPE_DATABASE__URL`,
//! ...), and `${VAR}` placeholders inside string values are expanded after
//! all sources are merged.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

#[derive(Debug, Clone, Deserialize)]
pub struct BrandscopeConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub scrape: ScrapeConfig,
}

impl Default for BrandscopeConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            scrape: ScrapeConfig::default(),
        }
    }
}

/// Listen address for the HTTP surface.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

/// Where website records are persisted.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

/// Knobs for the outbound page fetch.
#[derive(Debug, Clone, Deserialize)]
pub struct ScrapeConfig {
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8080".into()
}
fn default_database_url() -> String {
    "sqlite://brandscope.db?mode=rwc".into()
}
fn default_timeout_ms() -> u64 {
    10_000
}
fn default_user_agent() -> String {
    "Mozilla/5.0".into()
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct BrandscopeConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for BrandscopeConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl BrandscopeConfigLoader {
    /// Start an empty loader; `BRANDSCOPE_` env overrides are always merged
    /// on top of whatever files are attached.
    ///
    /// ```
    /// use brandscope_config::BrandscopeConfigLoader;
    ///
    /// let config = BrandscopeConfigLoader::new()
    ///     .with_yaml_str("server:\n  bind: \"0.0.0.0:9000\"")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.server.bind, "0.0.0.0:9000");
    /// assert_eq!(config.scrape.timeout_ms, 10_000);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a YAML/TOML/JSON file; the `config` crate infers format by
    /// suffix. The file is optional so headless deployments can rely purely
    /// on environment variables.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into strongly
    /// typed config.
    ///
    /// `${VAR}` placeholders are expanded (recursively, with a depth cap)
    /// before the typed struct is materialised; unknown variables are left
    /// untouched.
    ///
    /// ```
    /// use brandscope_config::BrandscopeConfigLoader;
    ///
    /// let config = BrandscopeConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// scrape:
    ///   timeout_ms: 2500
    ///   user_agent: "brandscope-tests"
    /// "#,
    ///     )
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(config.scrape.timeout_ms, 2500);
    /// assert_eq!(config.scrape.user_agent, "brandscope-tests");
    /// assert_eq!(config.database.url, "sqlite://brandscope.db?mode=rwc");
    /// ```
    pub fn load(self) -> Result<BrandscopeConfig, ConfigError> {
        // The env source is merged last so overrides beat any file value.
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix("BRANDSCOPE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        // Merge to a loose value tree first so placeholders inside any
        // string leaf can be expanded, then materialise the typed struct.
        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: BrandscopeConfig =
            serde_json::from_value(v).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        Ok(typed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use serial_test::serial;
    use temp_env;

    #[test]
    fn expands_simple_string() {
        temp_env::with_var("FOO", Some("bar"), || {
            let mut v = json!("prefix-${FOO}-suffix");
            expand_env_in_value(&mut v);
            assert_eq!(v, json!("prefix-bar-suffix"));
        });
    }

    #[test]
    fn expands_recursively_across_env_values() {
        temp_env::with_vars(
            [
                ("DATA_ROOT", Some("/var/lib")),
                ("DB_FILE", Some("${DATA_ROOT}/brandscope.db")),
            ],
            || {
                let mut v = json!({ "url": "sqlite://${DB_FILE}" });
                expand_env_in_value(&mut v);
                assert_eq!(v, json!({ "url": "sqlite:///var/lib/brandscope.db" }));
            },
        );
    }

    #[test]
    fn stops_on_cycles_and_leaves_value_reasonable() {
        temp_env::with_vars([("A", Some("${B}")), ("B", Some("${A}"))], || {
            let mut v = json!("x=${A}-y");
            // The depth cap guarantees termination; the cycle stays unresolved.
            expand_env_in_value(&mut v);
            let s = v.as_str().unwrap();
            assert!(s.starts_with("x=") && s.ends_with("-y"));
            assert!(s.contains("${"));
        });
    }

    #[test]
    fn unknown_vars_are_left_as_is() {
        let mut v = json!("hi-${DOES_NOT_EXIST}");
        expand_env_in_value(&mut v);
        assert_eq!(v, json!("hi-${DOES_NOT_EXIST}"));
    }

    #[test]
    #[serial]
    fn loads_pure_defaults_without_any_source() {
        let config = BrandscopeConfigLoader::new().load().expect("defaults load");
        assert_eq!(config.server.bind, "127.0.0.1:8080");
        assert_eq!(config.database.url, "sqlite://brandscope.db?mode=rwc");
        assert_eq!(config.scrape.timeout_ms, 10_000);
        assert_eq!(config.scrape.user_agent, "Mozilla/5.0");
    }
}
