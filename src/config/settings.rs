//! Configuration structures for deserialisation.
//!
//! These structures map directly to the JSON configuration file format.
//! Environment variables and CLI flags are layered on top after loading.

use std::time::Duration;

use serde::Deserialize;

use crate::bridge::BridgeKind;
use crate::error::ConfigError;
use crate::plugin::ConnectionSettings;

/// Default plugin host.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default response deadline in seconds.
pub const DEFAULT_TIMEOUT_SECS: f64 = 15.0;

/// Root configuration structure.
///
/// This is the top-level structure that matches the JSON config file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Optional JSON schema reference (ignored during parsing).
    #[serde(rename = "$schema", default)]
    _schema: Option<String>,

    /// Optional comment field (ignored during parsing).
    #[serde(rename = "_comment", default)]
    _comment: Option<String>,

    /// Rhino plugin connection.
    #[serde(default)]
    pub rhino: PluginConfig,

    /// Grasshopper plugin connection.
    #[serde(default)]
    pub grasshopper: PluginConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            _schema: None,
            _comment: None,
            rhino: PluginConfig::default(),
            grasshopper: PluginConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Returns the connection block for a bridge.
    #[must_use]
    pub const fn plugin(&self, kind: BridgeKind) -> &PluginConfig {
        match kind {
            BridgeKind::Rhino => &self.rhino,
            BridgeKind::Grasshopper => &self.grasshopper,
        }
    }

    /// Returns the connection block for a bridge, mutably.
    pub fn plugin_mut(&mut self, kind: BridgeKind) -> &mut PluginConfig {
        match kind {
            BridgeKind::Rhino => &mut self.rhino,
            BridgeKind::Grasshopper => &mut self.grasshopper,
        }
    }

    /// Resolves the settings used to reach the plugin of `kind`.
    #[must_use]
    pub fn connection_settings(&self, kind: BridgeKind) -> ConnectionSettings {
        let plugin = self.plugin(kind);
        ConnectionSettings {
            plugin: kind.plugin_name(),
            hint: kind.connect_hint(),
            host: plugin.host.clone(),
            port: plugin.port.unwrap_or_else(|| kind.default_port()),
            timeout: plugin.timeout(),
        }
    }

    /// Applies `<PREFIX>_*` environment overrides for `kind`.
    ///
    /// `lookup` returns the value of a variable, or `None` when unset. The
    /// binaries pass `std::env::var`; tests pass a map.
    ///
    /// | Variable | Effect |
    /// |----------|--------|
    /// | `<PREFIX>_HOST` | plugin host |
    /// | `<PREFIX>_PORT` | plugin port |
    /// | `<PREFIX>_TIMEOUT` | response deadline in seconds |
    /// | `<PREFIX>_DEBUG` | `1`, `true` or `yes` selects the `debug` log level |
    /// | `<PREFIX>_LOG_LEVEL` | log level, wins over `<PREFIX>_DEBUG` |
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnv`] if a port or timeout does not parse.
    pub fn apply_env<F>(&mut self, kind: BridgeKind, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let prefix = kind.env_prefix();
        let var = |suffix: &str| {
            let name = format!("{prefix}_{suffix}");
            lookup(&name).map(|value| (name, value))
        };

        let plugin = self.plugin_mut(kind);

        if let Some((_, host)) = var("HOST") {
            plugin.host = host;
        }

        if let Some((name, value)) = var("PORT") {
            let port = value
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidEnv { name, value })?;
            plugin.port = Some(port);
        }

        if let Some((name, value)) = var("TIMEOUT") {
            let timeout = value
                .trim()
                .parse::<f64>()
                .map_err(|_| ConfigError::InvalidEnv { name, value })?;
            plugin.timeout_secs = timeout;
        }

        if let Some((_, value)) = var("DEBUG") {
            if is_truthy(&value) {
                self.logging.level = "debug".to_string();
            }
        }

        if let Some((_, level)) = var("LOG_LEVEL") {
            self.logging.level = level.to_lowercase();
        }

        Ok(())
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any validation checks fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.rhino.validate("rhino")?;
        self.grasshopper.validate("grasshopper")?;
        self.logging.validate()
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes")
}

/// Connection settings for one plugin.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PluginConfig {
    /// Host the plugin listens on.
    /// Default: "127.0.0.1"
    #[serde(default = "default_host")]
    pub host: String,

    /// Port the plugin listens on. `None` selects the bridge default
    /// (Rhino 1999, Grasshopper 2000).
    #[serde(default)]
    pub port: Option<u16>,

    /// Response deadline in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: f64,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl PluginConfig {
    /// Returns the response deadline.
    ///
    /// Falls back to the default for values that `validate` would reject.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.timeout_secs)
            .ok()
            .filter(|d| !d.is_zero())
            .unwrap_or_else(|| Duration::from_secs_f64(DEFAULT_TIMEOUT_SECS))
    }

    fn validate(&self, section: &str) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                message: format!("{section}.host must not be empty"),
            });
        }
        if self.port == Some(0) {
            return Err(ConfigError::ValidationError {
                message: format!("{section}.port must be between 1 and 65535"),
            });
        }
        if !self.timeout_secs.is_finite() || self.timeout_secs <= 0.0 {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "{section}.timeout_secs must be a positive number of seconds, got {}",
                    self.timeout_secs
                ),
            });
        }
        Ok(())
    }
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

const fn default_timeout_secs() -> f64 {
    DEFAULT_TIMEOUT_SECS
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl LoggingConfig {
    /// Level names accepted in `level`, compared case-insensitively.
    pub const KNOWN_LEVELS: &'static [&'static str] =
        &["trace", "debug", "info", "warn", "warning", "error", "critical"];

    fn validate(&self) -> Result<(), ConfigError> {
        let level = self.level.to_lowercase();
        if Self::KNOWN_LEVELS.contains(&level.as_str()) {
            Ok(())
        } else {
            Err(ConfigError::ValidationError {
                message: format!(
                    "logging.level '{}' is not one of: {}",
                    self.level,
                    Self::KNOWN_LEVELS.join(", ")
                ),
            })
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn parse_minimal_config() {
        let json = r"{}";
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn parse_full_config() {
        let json = r#"{
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "_comment": "Test config",
            "rhino": {
                "host": "10.0.0.5",
                "port": 2999,
                "timeout_secs": 30.0
            },
            "grasshopper": {
                "port": 3000
            },
            "logging": {
                "level": "debug"
            }
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.rhino.host, "10.0.0.5");
        assert_eq!(config.rhino.port, Some(2999));
        assert!((config.rhino.timeout_secs - 30.0).abs() < f64::EPSILON);
        assert_eq!(config.grasshopper.host, DEFAULT_HOST);
        assert_eq!(config.grasshopper.port, Some(3000));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn default_ports_per_bridge() {
        let config = Config::default();

        let rhino = config.connection_settings(BridgeKind::Rhino);
        assert_eq!(rhino.plugin, "Rhino");
        assert_eq!(rhino.host, "127.0.0.1");
        assert_eq!(rhino.port, 1999);
        assert_eq!(rhino.timeout, Duration::from_secs(15));

        let grasshopper = config.connection_settings(BridgeKind::Grasshopper);
        assert_eq!(grasshopper.plugin, "Grasshopper");
        assert_eq!(grasshopper.port, 2000);
    }

    #[test]
    fn env_overrides_selected_bridge_only() {
        let mut config = Config::default();
        config
            .apply_env(
                BridgeKind::Grasshopper,
                env(&[
                    ("GRASSHOPPER_MCP_HOST", "192.168.1.10"),
                    ("GRASSHOPPER_MCP_PORT", "2100"),
                    ("GRASSHOPPER_MCP_TIMEOUT", "2.5"),
                    ("RHINO_MCP_PORT", "4000"),
                ]),
            )
            .unwrap();

        let settings = config.connection_settings(BridgeKind::Grasshopper);
        assert_eq!(settings.host, "192.168.1.10");
        assert_eq!(settings.port, 2100);
        assert_eq!(settings.timeout, Duration::from_millis(2500));
        assert_eq!(config.connection_settings(BridgeKind::Rhino).port, 1999);
    }

    #[test]
    fn env_debug_and_log_level() {
        let mut config = Config::default();
        config
            .apply_env(BridgeKind::Rhino, env(&[("RHINO_MCP_DEBUG", "yes")]))
            .unwrap();
        assert_eq!(config.logging.level, "debug");

        let mut config = Config::default();
        config
            .apply_env(
                BridgeKind::Rhino,
                env(&[("RHINO_MCP_DEBUG", "1"), ("RHINO_MCP_LOG_LEVEL", "WARNING")]),
            )
            .unwrap();
        assert_eq!(config.logging.level, "warning");

        let mut config = Config::default();
        config
            .apply_env(BridgeKind::Rhino, env(&[("RHINO_MCP_DEBUG", "off")]))
            .unwrap();
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn env_invalid_port() {
        let mut config = Config::default();
        let err = config
            .apply_env(BridgeKind::Rhino, env(&[("RHINO_MCP_PORT", "70000")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { ref name, .. } if name == "RHINO_MCP_PORT"));
    }

    #[test]
    fn env_invalid_timeout() {
        let mut config = Config::default();
        let err = config
            .apply_env(BridgeKind::Rhino, env(&[("RHINO_MCP_TIMEOUT", "soon")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { .. }));
    }

    #[test]
    fn reject_non_positive_timeout() {
        let json = r#"{ "rhino": { "timeout_secs": 0 } }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());

        let json = r#"{ "grasshopper": { "timeout_secs": -1.5 } }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn reject_zero_port_and_empty_host() {
        let json = r#"{ "rhino": { "port": 0 } }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());

        let json = r#"{ "grasshopper": { "host": "  " } }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn log_level_names() {
        let json = r#"{ "logging": { "level": "WARNING" } }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_ok());

        let json = r#"{ "logging": { "level": "loud" } }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("loud"));
    }

    #[test]
    fn reject_unknown_fields() {
        let json = r#"{
            "unknown_field": "value"
        }"#;

        let result: Result<Config, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
