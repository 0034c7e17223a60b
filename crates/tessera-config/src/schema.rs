//! Configuration sections.
//!
//! Every section rejects unknown keys so a typo in a config file fails at
//! load time instead of silently keeping the default.

use serde::{Deserialize, Serialize};
use tessera_telemetry::{LogConfig, LogFormat};

/// Default request body limit: 1 MiB.
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

/// Default message rendered in place of hidden internal errors.
pub const DEFAULT_INTERNAL_ERROR_MESSAGE: &str = "An internal error occurred";

/// Identity of the service running the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Service name, reported in logs.
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Deployment environment (development, staging, production).
    #[serde(default = "default_environment")]
    pub environment: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            environment: default_environment(),
        }
    }
}

fn default_service_name() -> String {
    "tessera".to_string()
}

fn default_environment() -> String {
    "development".to_string()
}

/// Settings for the request pipeline.
///
/// # Example
///
/// ```
/// use tessera_config::PipelineSettings;
///
/// let settings: PipelineSettings = toml::from_str(r#"
///     trust_request_id = true
///     max_body_size = 65536
/// "#).unwrap();
///
/// assert!(settings.trust_request_id);
/// assert!(!settings.expose_internal_errors);
/// assert_eq!(settings.max_body_size, 65536);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PipelineSettings {
    /// Keep a valid incoming `x-request-id` instead of generating one.
    #[serde(default)]
    pub trust_request_id: bool,

    /// Render unexpected failure messages verbatim in responses.
    #[serde(default)]
    pub expose_internal_errors: bool,

    /// Largest request body, in bytes, the field extractor reads.
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,

    /// Message shown in place of hidden internal errors.
    #[serde(default = "default_internal_error_message")]
    pub internal_error_message: String,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            trust_request_id: false,
            expose_internal_errors: false,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            internal_error_message: default_internal_error_message(),
        }
    }
}

fn default_max_body_size() -> usize {
    DEFAULT_MAX_BODY_SIZE
}

fn default_internal_error_message() -> String {
    DEFAULT_INTERNAL_ERROR_MESSAGE.to_string()
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directives.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format.
    #[serde(default)]
    pub format: LogFormat,

    /// Enable ANSI colors.
    #[serde(default)]
    pub ansi_enabled: bool,

    /// Include file and line in each event.
    #[serde(default)]
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::Json,
            ansi_enabled: false,
            include_location: false,
        }
    }
}

impl LoggingConfig {
    /// Converts the section into a subscriber configuration.
    #[must_use]
    pub fn to_log_config(&self, service_name: &str) -> LogConfig {
        LogConfig {
            enabled: self.enabled,
            level: self.level.clone(),
            format: self.format,
            file_line_info: self.include_location,
            ansi: self.ansi_enabled,
            ..LogConfig::default()
        }
        .with_service_name(service_name)
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}
