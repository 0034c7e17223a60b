//! # Tessera Core
//!
//! Core types shared by every stage of the Tessera action pipeline.
//!
//! - [`ServerRequest`] - Immutable request plus a copy-on-write attribute bag
//! - [`RequestId`] - UUID v7 request identifier
//! - [`ErrorAggregate`] - Per-path validation messages
//! - [`ActionError`] - Failure raised while executing an action
//! - [`Container`] - Token-keyed service lookup with capability checks
//! - [`ErrorLogger`] - Sink for unclassified failures
//!
//! ## Attribute vocabulary
//!
//! Later collaborators (error pages, loggers, responders) key off a small,
//! fixed set of attribute names. They are listed in [`attributes`] and each
//! has a typed accessor on [`ServerRequest`]:
//!
//! | Attribute | Accessor | Type |
//! |-----------|----------|------|
//! | `_status_code` | [`ServerRequest::status_code`] | `http::StatusCode` |
//! | `_errors` | [`ServerRequest::errors`] | [`Errors`] |
//! | `_error_severity` | [`ServerRequest::error_severity`] | [`ErrorSeverity`] |
//! | `_responder` | [`ServerRequest::responder`] | [`Token`] |
//! | `_validator` | [`ServerRequest::validator`] | [`Token`] |
//! | `_payload` | [`ServerRequest::payload`] | JSON object |
//!
//! ## Example
//!
//! ```
//! use tessera_core::{ServerRequest, attributes};
//! use bytes::Bytes;
//! use http::StatusCode;
//!
//! let request = ServerRequest::from_http(
//!     http::Request::builder()
//!         .uri("/users?page=2")
//!         .body(Bytes::new())
//!         .unwrap(),
//! );
//!
//! let failed = request.clone().with_status_code(StatusCode::UNPROCESSABLE_ENTITY);
//!
//! // The original context is untouched.
//! assert!(request.status_code().is_none());
//! assert!(failed.has_attribute(attributes::STATUS_CODE));
//! ```

#![doc(html_root_url = "https://docs.rs/tessera-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod attributes;
mod context;
pub mod di;
mod error;
mod errors;
mod log;
mod types;
pub mod urlencoded;

pub use attributes::{ErrorSeverity, Token};
pub use context::{RequestId, ServerRequest};
pub use di::{Container, LookupError};
pub use error::ActionError;
pub use errors::{ErrorAggregate, Errors, Violation, Violations, REQUEST_PATH};
pub use log::{ErrorLogger, LogContext, TracingLogger};
pub use types::{Response, ResponseExt};
