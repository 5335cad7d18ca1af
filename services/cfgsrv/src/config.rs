//! Service configuration
//!
//! Loaded with figment: YAML file first, then `CFGSRV_`-prefixed environment
//! variables on top. Every field carries a serde default so a missing file
//! yields a runnable configuration.

use std::path::Path;

use figment::{
    providers::{Env, Format, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{CfgSrvError, Result};

/// Default configuration file location
pub const DEFAULT_CONFIG_PATH: &str = "config/cfgsrv.yaml";

/// Complete service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CfgsrvConfig {
    #[serde(default)]
    pub service: ServiceSection,

    #[serde(default)]
    pub api: ApiSection,

    #[serde(default)]
    pub database: DatabaseSection,

    #[serde(default)]
    pub logging: LoggingSection,

    #[serde(default)]
    pub import: ImportSection,
}

/// Service identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceSection {
    #[serde(default = "default_service_name")]
    pub name: String,

    pub description: Option<String>,
}

impl Default for ServiceSection {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            description: None,
        }
    }
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSection {
    #[serde(default = "default_api_host")]
    pub host: String,

    #[serde(default = "default_api_port")]
    pub port: u16,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            host: default_api_host(),
            port: default_api_port(),
        }
    }
}

/// Database location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSection {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSection {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Optional directory for daily-rolling log files
    pub dir: Option<String>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: None,
        }
    }
}

/// Import strictness policy
///
/// Both knobs default off, preserving the lenient behavior documents were
/// authored against: duplicate `device:tag` keys resolve last-write-wins and
/// unresolved references insert as null. Turning a knob on rejects the
/// document instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportSection {
    #[serde(default)]
    pub strict_references: bool,

    #[serde(default)]
    pub strict_duplicates: bool,
}

impl CfgsrvConfig {
    /// Load configuration from the given file (or the default path) with
    /// environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let yaml_path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.into());

        // Double underscore separates sections so field names may contain
        // single underscores: CFGSRV_IMPORT__STRICT_REFERENCES.
        let config: Self = Figment::new()
            .merge(Yaml::file(yaml_path))
            .merge(Env::prefixed("CFGSRV_").split("__"))
            .extract()
            .map_err(|e| CfgSrvError::Config(format!("Failed to load configuration: {}", e)))?;

        Ok(config)
    }

    /// Validate the loaded configuration
    pub fn validate(&self) -> Result<()> {
        if self.api.port == 0 {
            return Err(CfgSrvError::Config("api.port must be non-zero".to_string()));
        }
        if self.database.path.trim().is_empty() {
            return Err(CfgSrvError::Config(
                "database.path must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_service_name() -> String {
    "cfgsrv".to_string()
}

fn default_api_host() -> String {
    "0.0.0.0".to_string()
}

fn default_api_port() -> u16 {
    6004
}

fn default_db_path() -> String {
    "data/fieldgate.db".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_runnable() {
        let config = CfgsrvConfig::default();
        assert_eq!(config.api.port, 6004);
        assert_eq!(config.database.path, "data/fieldgate.db");
        assert!(!config.import.strict_references);
        config.validate().unwrap();
    }

    #[test]
    fn validate_rejects_zero_port() {
        let mut config = CfgsrvConfig::default();
        config.api.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn yaml_sections_override_defaults() {
        let config: CfgsrvConfig = serde_yaml::from_str(
            r#"
api:
  port: 7100
import:
  strict_references: true
"#,
        )
        .unwrap();
        assert_eq!(config.api.port, 7100);
        assert!(config.import.strict_references);
        assert!(!config.import.strict_duplicates);
        // Untouched sections keep their defaults
        assert_eq!(config.logging.level, "info");
    }
}
