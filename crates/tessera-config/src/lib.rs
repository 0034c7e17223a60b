//! Typed configuration for Tessera pipelines.
//!
//! - TOML and JSON configuration files
//! - Environment variable overrides (`TESSERA__PIPELINE__MAX_BODY_SIZE`)
//! - `.env` files via `dotenvy`
//! - Strict parsing: unknown keys are errors
//!
//! # Example
//!
//! ```no_run
//! use tessera_config::ConfigLoader;
//!
//! # fn main() -> Result<(), tessera_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_production()
//!     .with_optional_file("tessera.toml")?
//!     .with_env_prefix("TESSERA")
//!     .load()?;
//!
//! println!("body limit: {} bytes", config.pipeline.max_body_size);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [service]
//! name = "accounts"
//! environment = "production"
//!
//! [pipeline]
//! trust_request_id = false
//! expose_internal_errors = false
//! max_body_size = 1048576
//! internal_error_message = "An internal error occurred"
//!
//! [logging]
//! enabled = true
//! level = "info"
//! format = "json"
//! ```

#![doc(html_root_url = "https://docs.rs/tessera-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::{TesseraConfig, TesseraConfigBuilder};
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{
    LoggingConfig, PipelineSettings, ServiceConfig, DEFAULT_INTERNAL_ERROR_MESSAGE,
    DEFAULT_MAX_BODY_SIZE,
};
pub use tessera_telemetry::LogFormat;
