//! Application configuration

use std::net::SocketAddr;

use anyhow::{Context, Result};
use config::{Config, Environment};
use serde::Deserialize;

/// Prefix for environment overrides, e.g. `COFFEE_EXPORT_SERVER_PORT`
pub const ENV_PREFIX: &str = "COFFEE_EXPORT";

/// Application configuration loaded from defaults and environment
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AppConfig {
    /// Interface the HTTP server binds to
    pub server_host: String,
    /// HTTP server port
    pub server_port: u16,
    /// Maximum normalized features accepted in one export
    pub max_features: usize,
    /// Maximum request body size in bytes
    pub max_body_bytes: usize,
    /// Logical dataset name, used for the `<dataset>.gdb` folder
    pub dataset_name: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".to_string(),
            server_port: 3000,
            max_features: 100_000,
            max_body_bytes: 16 * 1024 * 1024,
            dataset_name: "coffee_map".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::load(Environment::with_prefix(ENV_PREFIX))
    }

    fn load(environment: Environment) -> Result<Self> {
        let defaults = Self::default();
        let config = Config::builder()
            .set_default("server_host", defaults.server_host)?
            .set_default("server_port", i64::from(defaults.server_port))?
            .set_default("max_features", defaults.max_features as i64)?
            .set_default("max_body_bytes", defaults.max_body_bytes as i64)?
            .set_default("dataset_name", defaults.dataset_name)?
            .add_source(environment.try_parsing(true))
            .build()
            .context("Failed to load configuration")?;

        let config: Self = config
            .try_deserialize()
            .context("Invalid configuration values")?;

        if config.dataset_name.trim().is_empty() || config.dataset_name.contains('/') {
            anyhow::bail!("COFFEE_EXPORT_DATASET_NAME must be a non-empty name without '/'");
        }
        Ok(config)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.server_host, self.server_port)
            .parse()
            .with_context(|| {
                format!(
                    "Invalid server address {}:{}",
                    self.server_host, self.server_port
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let source = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<config::Map<String, String>>();
        Environment::with_prefix(ENV_PREFIX).source(Some(source))
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = AppConfig::load(env(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.socket_addr().unwrap().port(), 3000);
    }

    #[test]
    fn test_environment_overrides() {
        let config = AppConfig::load(env(&[
            ("COFFEE_EXPORT_SERVER_PORT", "8080"),
            ("COFFEE_EXPORT_MAX_FEATURES", "10"),
            ("COFFEE_EXPORT_DATASET_NAME", "midtown"),
        ]))
        .unwrap();
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.max_features, 10);
        assert_eq!(config.dataset_name, "midtown");
    }

    #[test]
    fn test_invalid_port_fails() {
        assert!(AppConfig::load(env(&[("COFFEE_EXPORT_SERVER_PORT", "not-a-port")])).is_err());
    }

    #[test]
    fn test_dataset_name_must_be_a_single_segment() {
        assert!(AppConfig::load(env(&[("COFFEE_EXPORT_DATASET_NAME", "a/b")])).is_err());
    }
}
