//! Producer configuration

use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;

/// Producer configuration, read from `PRODUCER_*` environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct ProducerConfig {
    /// Catalog file replacing the built-in catalog
    #[serde(default)]
    pub catalog: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            catalog: None,
            log_level: default_log_level(),
        }
    }
}

impl ProducerConfig {
    /// Load configuration from the environment
    pub fn load() -> Result<Self> {
        Self::from_environment(config::Environment::with_prefix("PRODUCER"))
    }

    fn from_environment(environment: config::Environment) -> Result<Self> {
        let config = config::Config::builder().add_source(environment).build()?;

        Ok(config.try_deserialize().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn environment(vars: &[(&str, &str)]) -> config::Environment {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        config::Environment::with_prefix("PRODUCER").source(Some(source))
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = ProducerConfig::from_environment(environment(&[])).unwrap();

        assert!(config.catalog.is_none());
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_reads_prefixed_variables() {
        let config = ProducerConfig::from_environment(environment(&[
            ("PRODUCER_CATALOG", "/etc/producer/catalog.toml"),
            ("PRODUCER_LOG_LEVEL", "debug"),
            ("UNRELATED_LOG_LEVEL", "trace"),
        ]))
        .unwrap();

        assert_eq!(config.catalog, Some(PathBuf::from("/etc/producer/catalog.toml")));
        assert_eq!(config.log_level, "debug");
    }
}
