//! Logging setup for Tessera services.
//!
//! Library crates in the workspace only emit events through `tracing`
//! macros. Binaries call [`init_logging`] once at startup to install a
//! subscriber that writes those events as JSON lines or in a human-readable
//! layout.
//!
//! # Example
//!
//! ```rust,ignore
//! use tessera_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::production())?;
//!
//! tracing::info!(request_id = %id, action = "SignUp", "action invoked");
//! ```

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{build_subscriber, create_env_filter, fields, init_logging, LogConfig, LogFormat};

/// Result alias for telemetry setup.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
