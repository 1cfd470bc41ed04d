//! Configuration file handling for jmri-cli

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use jmri_client::{ClientConfig, DEFAULT_PORT};
use serde::{Deserialize, Serialize};

/// Configuration file contents
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// JMRI web server host
    pub host: Option<String>,
    /// JMRI web server port
    pub port: Option<u16>,
    /// Throttle name used by `run-train`
    pub throttle_name: Option<String>,
    /// Session connect timeout in seconds
    pub connect_timeout_secs: Option<u64>,
    /// HTTP request timeout in seconds
    pub http_timeout_secs: Option<u64>,
}

impl Config {
    /// Load configuration from the default config file
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Get the default config file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("jmri-cli");

        Ok(config_dir.join("config.toml"))
    }

    /// Merge CLI arguments over config file values
    pub fn merge_with_args(
        &self,
        host: Option<&str>,
        port: Option<u16>,
        throttle_name: Option<&str>,
    ) -> ClientConfig {
        let mut config = ClientConfig::new(
            host.map(String::from)
                .or_else(|| self.host.clone())
                .unwrap_or_else(|| "localhost".to_string()),
            port.or(self.port).unwrap_or(DEFAULT_PORT),
        );

        if let Some(name) = throttle_name.map(String::from).or_else(|| self.throttle_name.clone()) {
            config = config.with_throttle_name(name);
        }
        if let Some(secs) = self.connect_timeout_secs {
            config = config.with_connect_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = self.http_timeout_secs {
            config = config.with_http_timeout(Duration::from_secs(secs));
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let merged = Config::default().merge_with_args(None, None, None);
        assert_eq!(merged.endpoint.host, "localhost");
        assert_eq!(merged.endpoint.port, 12080);
        assert_eq!(merged.throttle_name, "mycoolthrottle");
    }

    #[test]
    fn test_args_override_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "host = \"layout.local\"\nport = 8080\nthrottle_name = \"yard\"\nconnect_timeout_secs = 3"
        )
        .unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.port, Some(8080));

        let merged = config.merge_with_args(Some("10.0.0.5"), None, None);
        assert_eq!(merged.endpoint.host, "10.0.0.5");
        assert_eq!(merged.endpoint.port, 8080);
        assert_eq!(merged.throttle_name, "yard");
        assert_eq!(merged.connect_timeout, Duration::from_secs(3));

        let merged = config.merge_with_args(None, Some(9000), Some("mainline"));
        assert_eq!(merged.endpoint.host, "layout.local");
        assert_eq!(merged.endpoint.port, 9000);
        assert_eq!(merged.throttle_name, "mainline");
    }

    #[test]
    fn test_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = \"not a number\"").unwrap();
        assert!(Config::load_from(file.path()).is_err());
    }
}
