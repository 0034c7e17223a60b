//! # Tessera
//!
//! **Action dispatch for HTTP services**
//!
//! A router attaches the matched [`Action`](prelude::Action) to the request.
//! Tessera then validates the request's fields, runs the action, classifies
//! and recovers from failures, and renders the response through the
//! responder the action names.
//!
//! ## Architecture
//!
//! ```text
//! Request → RequestId → ErrorNormalization → Router → ActionHandler → fallback
//!                                                         │
//!                      validate → invoke → (handle_error) → respond
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use tessera::prelude::*;
//! use tessera::middleware::FnMiddleware;
//!
//! struct Ping;
//!
//! impl Action for Ping {
//!     fn invoke(&self, request: ServerRequest) -> Result<ServerRequest, ActionError> {
//!         let mut payload = serde_json::Map::new();
//!         payload.insert("pong".into(), true.into());
//!         Ok(request.with_payload(payload).with_responder("json"))
//!     }
//!
//!     fn handle_error(&self, request: ServerRequest) -> ServerRequest {
//!         request.with_responder("json")
//!     }
//! }
//!
//! let config = TesseraConfig::production();
//! let pipeline = App::from_config(&config)
//!     .stage(FnMiddleware::new(
//!         "router",
//!         |request: ServerRequest, next: Next<'_>| -> Result<Response, DispatchError> {
//!             next.run(request.with_action(Arc::new(Ping)))
//!         },
//!     ))
//!     .build();
//!
//! let request = ServerRequest::from_http(
//!     http::Request::builder().uri("/ping").body(bytes::Bytes::new()).unwrap(),
//! );
//! let response = pipeline.respond(request);
//! assert_eq!(response.status(), 200);
//! ```

#![doc(html_root_url = "https://docs.rs/tessera/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod app;

pub use app::{App, JSON_RESPONDER};

// Re-export core types
pub use tessera_core as core;

// Re-export extraction types
pub use tessera_extract as extract;

// Re-export middleware types
pub use tessera_middleware as middleware;

// Re-export action contracts
pub use tessera_action as action;

// Re-export process manager types
pub use tessera_process as process;

// Re-export logging setup
pub use tessera_telemetry as telemetry;

// Re-export configuration
pub use tessera_config as config;

/// Prelude module for convenient imports.
///
/// ```
/// use tessera::prelude::*;
/// ```
pub mod prelude {
    pub use crate::App;

    pub use tessera_core::{
        attributes, ActionError, Container, ErrorAggregate, ErrorLogger, Errors, RequestId,
        Response, ResponseExt, ServerRequest, Token, Violations,
    };

    pub use tessera_action::{
        Action, ActionHandler, ActionRequestExt, FieldRules, FieldValidator, JsonResponder,
        LazyAssertion, Responder, Validator,
    };

    pub use tessera_middleware::{DispatchError, Middleware, Next, Pipeline};

    pub use tessera_process::{CommandBus, Envelope, Message, Metadata, ProcessManager};

    pub use tessera_config::{ConfigLoader, TesseraConfig};

    pub use tessera_telemetry::init_logging;
}
