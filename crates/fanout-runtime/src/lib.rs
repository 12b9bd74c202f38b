//! Fanout Runtime - ambient pieces for fanout applications.
//!
//! This crate carries the cross-cutting concerns a fanout-based process
//! needs around the core engine:
//!
//! - Logging configuration over `tracing`/`tracing-subscriber`
//!   ([`logging::LoggingBuilder`], [`logging::init_from_config`])
//! - Layered configuration loading ([`config::load_config`])
//!
//! # Feature Flags
//!
//! - `toml-config` *(default)*: enables loading `fanout.toml` configuration
//!   files.
//!
//! ```rust,ignore
//! use fanout_runtime::{config, logging};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = config::load_config()?;
//!     logging::init_from_config(&config.logging);
//!     // ...
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod logging;

pub use config::{ConfigError, ConfigResult, FanoutConfig, LogFormat, LogLevel, LoggingConfig};
pub use logging::{LoggingBuilder, SpanEvents};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Prelude module for convenient imports.
///
/// Provides the commonly used logging macros.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
