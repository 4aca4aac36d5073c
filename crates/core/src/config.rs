use std::collections::BTreeMap;
use std::env;
use std::fmt;
use thiserror::Error;
use tracing::warn;

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_UPDATE_CHECK: bool = true;
const DEFAULT_UPDATE_TIMEOUT_SECS: u64 = 5;

/// Names of the environment variables that may override detection.
pub mod keys {
    pub const INSTALL_CMD: &str = "PACKPLAN_INSTALL_CMD";
    pub const BUILD_CMD: &str = "PACKPLAN_BUILD_CMD";
    pub const START_CMD: &str = "PACKPLAN_START_CMD";
    pub const BASE_IMAGE: &str = "PACKPLAN_BASE_IMAGE";
    pub const NODE_VERSION: &str = "PACKPLAN_NODE_VERSION";
    pub const SPA_OUTPUT_DIR: &str = "PACKPLAN_SPA_OUTPUT_DIR";
    pub const STATIC_SERVER: &str = "PACKPLAN_STATIC_SERVER";
    /// Accepted for compatibility with common Node tooling
    pub const LEGACY_NODE_VERSION: &str = "NODE_VERSION";

    pub const ALL: &[&str] = &[
        INSTALL_CMD,
        BUILD_CMD,
        START_CMD,
        BASE_IMAGE,
        NODE_VERSION,
        SPA_OUTPUT_DIR,
        STATIC_SERVER,
        LEGACY_NODE_VERSION,
    ];
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Static file server used for projects whose build output is static
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaticServer {
    Caddy,
    Nginx,
}

impl StaticServer {
    pub fn as_str(&self) -> &'static str {
        match self {
            StaticServer::Caddy => "caddy",
            StaticServer::Nginx => "nginx",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "caddy" => Some(StaticServer::Caddy),
            "nginx" => Some(StaticServer::Nginx),
            _ => None,
        }
    }
}

/// Whitelisted environment overrides captured once per detection run.
///
/// Keys outside [`keys::ALL`] and empty values are dropped; a missing key
/// means "not overridden".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    values: BTreeMap<String, String>,
}

impl EnvOverrides {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_process_env() -> Self {
        Self::from_pairs(
            keys::ALL
                .iter()
                .filter_map(|key| env::var(key).ok().map(|value| (key.to_string(), value))),
        )
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let values = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .filter(|(k, v)| keys::ALL.contains(&k.as_str()) && !v.is_empty())
            .collect();

        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn install_command(&self) -> Option<&str> {
        self.get(keys::INSTALL_CMD)
    }

    pub fn build_command(&self) -> Option<&str> {
        self.get(keys::BUILD_CMD)
    }

    pub fn start_command(&self) -> Option<&str> {
        self.get(keys::START_CMD)
    }

    pub fn base_image(&self) -> Option<&str> {
        self.get(keys::BASE_IMAGE)
    }

    pub fn spa_output_dir(&self) -> Option<&str> {
        self.get(keys::SPA_OUTPUT_DIR)
    }

    pub fn static_server(&self) -> Option<StaticServer> {
        let raw = self.get(keys::STATIC_SERVER)?;
        let parsed = StaticServer::parse(raw);
        if parsed.is_none() {
            warn!(
                value = raw,
                "Ignoring {}: expected 'caddy' or 'nginx'",
                keys::STATIC_SERVER
            );
        }
        parsed
    }
}

/// Process-level settings for the packplan binary
#[derive(Debug, Clone)]
pub struct PackplanConfig {
    pub log_level: String,
    pub update_check: bool,
    pub update_check_timeout_secs: u64,
}

impl Default for PackplanConfig {
    fn default() -> Self {
        let log_level = env::var("PACKPLAN_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        let update_check = env::var("PACKPLAN_NO_UPDATE_CHECK")
            .map(|v| v.is_empty() || v == "0" || v.eq_ignore_ascii_case("false"))
            .unwrap_or(DEFAULT_UPDATE_CHECK);

        let update_check_timeout_secs = env::var("PACKPLAN_UPDATE_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_UPDATE_TIMEOUT_SECS);

        Self {
            log_level,
            update_check,
            update_check_timeout_secs,
        }
    }
}

impl PackplanConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        if self.update_check_timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "Update check timeout must be at least 1 second".to_string(),
            ));
        }
        if self.update_check_timeout_secs > 60 {
            return Err(ConfigError::ValidationFailed(
                "Update check timeout cannot exceed 60 seconds".to_string(),
            ));
        }

        Ok(())
    }
}

impl fmt::Display for PackplanConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Packplan Configuration:")?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        writeln!(f, "  Update Check: {}", self.update_check)?;
        writeln!(f, "  Update Timeout: {}s", self.update_check_timeout_secs)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    struct EnvGuard {
        key: String,
        old_value: Option<String>,
    }

    impl EnvGuard {
        fn set(key: &str, value: &str) -> Self {
            let old_value = env::var(key).ok();
            env::set_var(key, value);
            Self {
                key: key.to_string(),
                old_value,
            }
        }

        fn unset(key: &str) -> Self {
            let old_value = env::var(key).ok();
            env::remove_var(key);
            Self {
                key: key.to_string(),
                old_value,
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.old_value {
                Some(v) => env::set_var(&self.key, v),
                None => env::remove_var(&self.key),
            }
        }
    }

    #[test]
    fn test_from_pairs_keeps_only_whitelisted_non_empty() {
        let overrides = EnvOverrides::from_pairs([
            ("PACKPLAN_BUILD_CMD", "make build"),
            ("PACKPLAN_START_CMD", ""),
            ("HOME", "/root"),
            ("NODE_VERSION", "20"),
        ]);

        assert_eq!(overrides.build_command(), Some("make build"));
        assert_eq!(overrides.start_command(), None);
        assert_eq!(overrides.get("HOME"), None);
        assert_eq!(overrides.get(keys::LEGACY_NODE_VERSION), Some("20"));
        assert_eq!(
            overrides,
            EnvOverrides::from_pairs([("NODE_VERSION", "20"), ("PACKPLAN_BUILD_CMD", "make build")])
        );
    }

    #[test]
    fn test_static_server_parsing() {
        let caddy = EnvOverrides::from_pairs([(keys::STATIC_SERVER, "Caddy")]);
        assert_eq!(caddy.static_server(), Some(StaticServer::Caddy));

        let bogus = EnvOverrides::from_pairs([(keys::STATIC_SERVER, "apache")]);
        assert_eq!(bogus.static_server(), None);
    }

    #[test]
    #[serial]
    fn test_from_process_env() {
        let _guards = [
            EnvGuard::set(keys::NODE_VERSION, "22"),
            EnvGuard::set(keys::BASE_IMAGE, "node:22-alpine"),
            EnvGuard::unset(keys::INSTALL_CMD),
        ];

        let overrides = EnvOverrides::from_process_env();
        assert_eq!(overrides.get(keys::NODE_VERSION), Some("22"));
        assert_eq!(overrides.base_image(), Some("node:22-alpine"));
        assert_eq!(overrides.install_command(), None);
    }

    #[test]
    #[serial]
    fn test_default_configuration() {
        let _guards = [
            EnvGuard::unset("PACKPLAN_LOG_LEVEL"),
            EnvGuard::unset("PACKPLAN_NO_UPDATE_CHECK"),
            EnvGuard::unset("PACKPLAN_UPDATE_TIMEOUT"),
        ];

        let config = PackplanConfig::default();
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
        assert_eq!(config.update_check, DEFAULT_UPDATE_CHECK);
        assert_eq!(config.update_check_timeout_secs, DEFAULT_UPDATE_TIMEOUT_SECS);
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_environment_variable_parsing() {
        let _guards = [
            EnvGuard::set("PACKPLAN_LOG_LEVEL", "DEBUG"),
            EnvGuard::set("PACKPLAN_NO_UPDATE_CHECK", "1"),
            EnvGuard::set("PACKPLAN_UPDATE_TIMEOUT", "2"),
        ];

        let config = PackplanConfig::default();
        assert_eq!(config.log_level, "debug");
        assert!(!config.update_check);
        assert_eq!(config.update_check_timeout_secs, 2);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = PackplanConfig {
            log_level: "loud".to_string(),
            update_check: true,
            update_check_timeout_secs: 5,
        };
        assert!(config.validate().is_err());

        config.log_level = "warn".to_string();
        config.update_check_timeout_secs = 0;
        assert!(config.validate().is_err());

        config.update_check_timeout_secs = 5;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_display() {
        let config = PackplanConfig {
            log_level: "debug".to_string(),
            update_check: false,
            update_check_timeout_secs: 3,
        };
        let display = format!("{}", config);
        assert!(display.contains("Packplan Configuration:"));
        assert!(display.contains("Log Level: debug"));
        assert!(display.contains("Update Timeout: 3s"));
    }
}
