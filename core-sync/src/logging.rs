//! # Logging & Tracing Infrastructure
//!
//! Configures `tracing-subscriber` for the mirror workspace: pretty, JSON or
//! compact output, module-level filtering, and a helper for keeping
//! credential-shaped values out of log fields.

use std::io;
use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{Result, SyncError};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable pretty format with colors
    Pretty,
    /// Structured JSON format for machine parsing
    Json,
    /// Compact format for production
    Compact,
}

impl Default for LogFormat {
    fn default() -> Self {
        #[cfg(debug_assertions)]
        return Self::Pretty;

        #[cfg(not(debug_assertions))]
        return Self::Json;
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Output format
    pub format: LogFormat,
    /// Minimum log level
    pub level: tracing::Level,
    /// Custom filter string (e.g., "core_sync=debug,provider_yandex_disk=trace")
    pub filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            level: tracing::Level::INFO,
            filter: None,
        }
    }
}

impl LoggingConfig {
    /// Set log format
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Set minimum log level
    pub fn with_level(mut self, level: tracing::Level) -> Self {
        self.level = level;
        self
    }

    /// Set custom filter string
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }
}

/// Initialize the logging system
///
/// Call once during application startup; subsequent calls return an error.
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let filter = build_filter(&config)?;

    let registry = tracing_subscriber::registry().with(filter);

    let init_result = match config.format {
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().pretty().with_writer(io::stdout))
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_writer(io::stdout),
            )
            .try_init(),
        LogFormat::Compact => registry
            .with(tracing_subscriber::fmt::layer().compact().with_writer(io::stdout))
            .try_init(),
    };

    init_result.map_err(|e| SyncError::Config(format!("Failed to initialize logging: {}", e)))
}

fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    let filter_string = if let Some(custom_filter) = &config.filter {
        custom_filter.clone()
    } else {
        // Our crates at the configured level, noisy dependencies at warn
        let level = config.level.to_string().to_lowercase();
        format!(
            "core_sync={level},core_mirror={level},provider_yandex_disk={level},\
             h2=warn,hyper=warn,reqwest=warn,sqlx=warn"
        )
    };

    EnvFilter::try_new(filter_string)
        .map_err(|e| SyncError::Config(format!("Invalid log filter: {}", e)))
}

/// Redact a field value if the field name looks credential-shaped
///
/// ```ignore
/// use tracing::info;
/// use core_sync::logging::redact_if_sensitive;
///
/// info!(token = %redact_if_sensitive("token", token), "Session opened");
/// ```
pub fn redact_if_sensitive(field_name: &str, value: &str) -> String {
    const SENSITIVE_FIELDS: &[&str] = &[
        "token",
        "credential",
        "password",
        "secret",
        "authorization",
        "oauth",
    ];

    let field_lower = field_name.to_lowercase();
    if SENSITIVE_FIELDS.iter().any(|&f| field_lower.contains(f)) {
        "[REDACTED]".to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_config_builder() {
        let config = LoggingConfig::default()
            .with_format(LogFormat::Json)
            .with_level(tracing::Level::DEBUG)
            .with_filter("core_sync=trace");

        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.level, tracing::Level::DEBUG);
        assert_eq!(config.filter, Some("core_sync=trace".to_string()));
    }

    #[test]
    fn test_build_filter_uses_level() {
        let config = LoggingConfig::default().with_level(tracing::Level::DEBUG);
        let filter = build_filter(&config).unwrap();
        assert!(filter.to_string().contains("debug"));
    }

    #[test]
    fn test_build_custom_filter() {
        let config = LoggingConfig::default().with_filter("core_mirror=trace");
        let filter = build_filter(&config).unwrap();
        assert!(filter.to_string().contains("core_mirror=trace"));
    }

    #[test]
    fn test_redact_if_sensitive() {
        assert_eq!(redact_if_sensitive("token", "abc123"), "[REDACTED]");
        assert_eq!(redact_if_sensitive("oauth_credential", "x"), "[REDACTED]");
        assert_eq!(redact_if_sensitive("path", "/photos"), "/photos");
    }
}
