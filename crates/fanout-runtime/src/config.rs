//! Configuration loading for fanout applications.
//!
//! Figment-based, layered configuration: built-in defaults, then an optional
//! TOML file, then environment variables. Later sources override earlier
//! ones.
//!
//! # Environment Variable Mapping
//!
//! Variables use the `FANOUT_` prefix with `__` as the section separator:
//!
//! - `FANOUT_LOGGING__LEVEL=debug` → `logging.level = "debug"`
//! - `FANOUT_LOGGING__THREAD_IDS=true` → `logging.thread_ids = true`
//!
//! # Example
//!
//! ```rust,ignore
//! use fanout_runtime::config::load_config;
//!
//! let config = load_config()?;
//! fanout_runtime::logging::init_from_config(&config.logging);
//! ```

use std::collections::HashMap;
#[cfg(feature = "toml-config")]
use std::path::Path;

use figment::Figment;
#[cfg(feature = "toml-config")]
use figment::providers::{Format, Toml};
use figment::providers::{Env, Serialized};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default config file searched in the current directory.
#[cfg(feature = "toml-config")]
const DEFAULT_CONFIG_FILE: &str = "fanout.toml";

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The requested config file does not exist.
    #[error("config file not found: {path}")]
    NotFound {
        /// The missing path.
        path: String,
    },

    /// Extraction or parsing failed.
    #[error(transparent)]
    Figment(#[from] Box<figment::Error>),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Top-level configuration for a fanout application.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FanoutConfig {
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Logging settings consumed by [`crate::logging`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Global log level.
    pub level: LogLevel,
    /// Output format.
    pub format: LogFormat,
    /// Span lifecycle events to emit.
    pub span_events: SpanEventConfig,
    /// Include thread IDs in log output.
    pub thread_ids: bool,
    /// Include file names and line numbers in log output.
    pub file_location: bool,
    /// Per-module level overrides, e.g. `fanout_core = "trace"`.
    pub filters: HashMap<String, LogLevel>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Compact,
            span_events: SpanEventConfig::default(),
            thread_ids: false,
            file_location: false,
            filters: HashMap::new(),
        }
    }
}

/// Log verbosity levels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Finest-grained events.
    Trace,
    /// Debug-level events.
    Debug,
    /// Informational events (default).
    #[default]
    Info,
    /// Warnings.
    Warn,
    /// Errors only.
    Error,
}

impl LogLevel {
    /// Converts to a `tracing::Level`.
    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }

    /// Returns the lowercase directive form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Log output formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Single-line, abbreviated output (default).
    #[default]
    Compact,
    /// Standard tracing formatter output.
    Full,
    /// Multi-line, human-oriented output.
    Pretty,
}

/// Which span lifecycle events to log.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpanEventConfig {
    /// Log span creation.
    pub new: bool,
    /// Log span entry.
    pub enter: bool,
    /// Log span exit.
    pub exit: bool,
    /// Log span close.
    pub close: bool,
}

/// Loads configuration from defaults, the default config file (if present),
/// and `FANOUT_*` environment variables.
pub fn load_config() -> ConfigResult<FanoutConfig> {
    let figment = Figment::from(Serialized::defaults(FanoutConfig::default()));

    #[cfg(feature = "toml-config")]
    let figment = if Path::new(DEFAULT_CONFIG_FILE).exists() {
        figment.merge(Toml::file(DEFAULT_CONFIG_FILE))
    } else {
        figment
    };

    extract(figment)
}

/// Loads configuration from a specific file plus environment overrides.
#[cfg(feature = "toml-config")]
pub fn load_config_from_file(path: impl AsRef<Path>) -> ConfigResult<FanoutConfig> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.display().to_string(),
        });
    }

    let figment =
        Figment::from(Serialized::defaults(FanoutConfig::default())).merge(Toml::file(path));
    extract(figment)
}

fn extract(figment: Figment) -> ConfigResult<FanoutConfig> {
    figment
        .merge(Env::prefixed("FANOUT_").split("__"))
        .extract()
        .map_err(|e| ConfigError::Figment(Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = FanoutConfig::default();
        assert_eq!(config.logging.level, LogLevel::Info);
        assert_eq!(config.logging.format, LogFormat::Compact);
        assert!(config.logging.filters.is_empty());
    }

    #[cfg(feature = "toml-config")]
    #[test]
    fn toml_overrides_defaults() {
        let config: FanoutConfig = Figment::from(Serialized::defaults(FanoutConfig::default()))
            .merge(Toml::string(
                r#"
                [logging]
                level = "debug"
                format = "pretty"
                thread_ids = true

                [logging.filters]
                fanout_core = "trace"
                "#,
            ))
            .extract()
            .expect("valid config");

        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!(config.logging.thread_ids);
        assert_eq!(
            config.logging.filters.get("fanout_core"),
            Some(&LogLevel::Trace)
        );
    }

    #[test]
    fn level_directives_are_lowercase() {
        assert_eq!(LogLevel::Warn.as_str(), "warn");
        assert_eq!(LogLevel::Trace.to_tracing_level(), tracing::Level::TRACE);
    }
}
