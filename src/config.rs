//! Engine configuration.
//!
//! Every section deserializes with defaults so a partial document only
//! overrides the keys it names.
//!
//! # Examples
//!
//! ```
//! use mockingbird::config::EngineConfig;
//!
//! let config = EngineConfig::from_json_str(r#"{"session": {"wait_timeout_ms": 500}}"#)
//!     .expect("valid configuration");
//! assert_eq!(config.session.wait_timeout_ms, 500);
//! assert_eq!(config.sequence.id_batch_size, 1000);
//! ```

use camino::Utf8PathBuf;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The document is not valid JSON for the configuration schema.
    #[error("invalid engine configuration: {0}")]
    Parse(String),

    /// A value is outside its permitted range.
    #[error("invalid value for '{key}': {reason}")]
    InvalidValue {
        /// Dotted configuration key.
        key: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Session correlation settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// How long an undelivered message stays in its session mailbox.
    pub message_ttl_ms: u64,
    /// How long an idle wait signal is kept before eviction.
    pub lock_ttl_ms: u64,
    /// Hard upper bound on a single `wait_response` call.
    pub wait_timeout_ms: u64,
    /// Period of the background eviction sweep.
    pub eviction_interval_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            message_ttl_ms: 20_000,
            lock_ttl_ms: 30_000,
            wait_timeout_ms: 25_000,
            eviction_interval_ms: 1_000,
        }
    }
}

impl SessionConfig {
    /// Returns the mailbox time-to-live.
    #[must_use]
    pub const fn message_ttl(&self) -> Duration {
        Duration::from_millis(self.message_ttl_ms)
    }

    /// Returns the wait-signal time-to-live.
    #[must_use]
    pub const fn lock_ttl(&self) -> Duration {
        Duration::from_millis(self.lock_ttl_ms)
    }

    /// Returns the hard wait timeout.
    #[must_use]
    pub const fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_timeout_ms)
    }

    /// Returns the eviction sweep period.
    #[must_use]
    pub const fn eviction_interval(&self) -> Duration {
        Duration::from_millis(self.eviction_interval_ms)
    }
}

/// Identifier pool settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SequenceConfig {
    /// Number of identifiers fetched from the backing sequence per refill.
    pub id_batch_size: u32,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            id_batch_size: 1_000,
        }
    }
}

/// Message parameter extraction settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Upper bound on the compiled size of a parsing-rule regex, in bytes.
    pub regex_size_limit: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            regex_size_limit: 1024 * 1024, // 1 MiB
        }
    }
}

/// Plugin discovery locations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PluginConfig {
    /// Directory scanned for interceptor plugin units.
    pub interceptor_dir: Option<Utf8PathBuf>,
    /// Directory scanned for transport plugin units.
    pub transport_dir: Option<Utf8PathBuf>,
    /// Shared library directory paired with every scanned unit.
    pub lib_dir: Option<Utf8PathBuf>,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// `tracing-subscriber` filter directive.
    pub filter: String,
    /// Whether to emit JSON log lines.
    pub json: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_owned(),
            json: false,
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Session correlation settings.
    pub session: SessionConfig,
    /// Identifier pool settings.
    pub sequence: SequenceConfig,
    /// Extraction settings.
    pub extraction: ExtractionConfig,
    /// Plugin discovery settings.
    pub plugins: PluginConfig,
    /// Logging settings.
    pub telemetry: TelemetryConfig,
}

impl EngineConfig {
    /// Parses and validates a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed documents and
    /// [`ConfigError::InvalidValue`] when validation fails.
    pub fn from_json_str(document: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(document).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sequence.id_batch_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: "sequence.id_batch_size",
                reason: "must be greater than zero".to_owned(),
            });
        }
        if self.session.wait_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "session.wait_timeout_ms",
                reason: "must be greater than zero".to_owned(),
            });
        }
        if self.session.eviction_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "session.eviction_interval_ms",
                reason: "must be greater than zero".to_owned(),
            });
        }
        if self.session.lock_ttl_ms < self.session.wait_timeout_ms {
            return Err(ConfigError::InvalidValue {
                key: "session.lock_ttl_ms",
                reason: format!(
                    "must not be shorter than session.wait_timeout_ms ({})",
                    self.session.wait_timeout_ms
                ),
            });
        }
        Ok(())
    }
}
