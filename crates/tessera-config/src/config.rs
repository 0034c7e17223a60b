//! Main configuration types.
//!
//! This module provides the top-level [`TesseraConfig`] struct and its builder.

use serde::{Deserialize, Serialize};
use tessera_telemetry::{create_env_filter, LogConfig, LogFormat};

use crate::{ConfigError, LoggingConfig, PipelineSettings, ServiceConfig};

/// Complete Tessera configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load configuration from files
/// and environment variables.
///
/// # Example
///
/// ```
/// use tessera_config::TesseraConfig;
///
/// let config = TesseraConfig::default();
/// assert_eq!(config.service.name, "tessera");
/// assert_eq!(config.pipeline.max_body_size, 1024 * 1024);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct TesseraConfig {
    /// Service identity.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Request pipeline settings.
    #[serde(default)]
    pub pipeline: PipelineSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TesseraConfig {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```
    /// use tessera_config::{PipelineSettings, TesseraConfig};
    ///
    /// let config = TesseraConfig::builder()
    ///     .pipeline(PipelineSettings {
    ///         trust_request_id: true,
    ///         ..Default::default()
    ///     })
    ///     .build();
    ///
    /// assert!(config.pipeline.trust_request_id);
    /// ```
    #[must_use]
    pub fn builder() -> TesseraConfigBuilder {
        TesseraConfigBuilder::new()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - The service name is empty
    /// - `max_body_size` is zero
    /// - The internal error message is blank
    /// - The log level is not a valid filter
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service.name.trim().is_empty() {
            return Err(ConfigError::invalid_value("service.name", "must not be empty"));
        }

        if self.pipeline.max_body_size == 0 {
            return Err(ConfigError::invalid_value(
                "pipeline.max_body_size",
                "must be greater than 0",
            ));
        }

        if self.pipeline.internal_error_message.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "pipeline.internal_error_message",
                "must not be blank",
            ));
        }

        if let Err(e) = create_env_filter(&self.logging.level) {
            return Err(ConfigError::invalid_value("logging.level", e.to_string()));
        }

        Ok(())
    }

    /// Create a development configuration preset.
    ///
    /// - Pretty log output with colors and source locations
    /// - Debug log level
    /// - Internal error messages exposed in responses
    /// - Incoming request ids trusted
    ///
    /// ```
    /// use tessera_config::TesseraConfig;
    ///
    /// let config = TesseraConfig::development();
    /// assert_eq!(config.logging.level, "debug");
    /// assert!(config.pipeline.expose_internal_errors);
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();

        config.logging.level = "debug".to_string();
        config.logging.format = LogFormat::Pretty;
        config.logging.ansi_enabled = true;
        config.logging.include_location = true;

        config.service.environment = "development".to_string();

        config.pipeline.expose_internal_errors = true;
        config.pipeline.trust_request_id = true;

        config
    }

    /// Create a production configuration preset.
    ///
    /// - JSON log output at info level
    /// - Internal error messages hidden
    /// - Request ids always generated
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();

        config.logging.level = "info".to_string();
        config.logging.format = LogFormat::Json;
        config.logging.ansi_enabled = false;

        config.service.environment = "production".to_string();

        config.pipeline.expose_internal_errors = false;
        config.pipeline.trust_request_id = false;

        config
    }

    /// Returns the subscriber configuration for this service.
    #[must_use]
    pub fn log_config(&self) -> LogConfig {
        self.logging.to_log_config(&self.service.name)
    }
}

/// Builder for [`TesseraConfig`].
#[derive(Debug, Default)]
pub struct TesseraConfigBuilder {
    service: Option<ServiceConfig>,
    pipeline: Option<PipelineSettings>,
    logging: Option<LoggingConfig>,
}

impl TesseraConfigBuilder {
    /// Create a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the service section.
    #[must_use]
    pub fn service(mut self, service: ServiceConfig) -> Self {
        self.service = Some(service);
        self
    }

    /// Set the pipeline section.
    #[must_use]
    pub fn pipeline(mut self, pipeline: PipelineSettings) -> Self {
        self.pipeline = Some(pipeline);
        self
    }

    /// Set the logging section.
    #[must_use]
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = Some(logging);
        self
    }

    /// Build the configuration.
    ///
    /// Any unset sections will use their default values.
    #[must_use]
    pub fn build(self) -> TesseraConfig {
        TesseraConfig {
            service: self.service.unwrap_or_default(),
            pipeline: self.pipeline.unwrap_or_default(),
            logging: self.logging.unwrap_or_default(),
        }
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if validation fails.
    pub fn build_validated(self) -> Result<TesseraConfig, ConfigError> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }
}
