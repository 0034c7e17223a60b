//! # Tessera Action
//!
//! Action dispatch: validate, execute, recover, respond.
//!
//! An [`Action`] is routed to a request by storing it under the
//! `_request_handler` attribute ([`ActionRequestExt::with_action`]). The
//! [`ActionHandler`] stage picks it up, resolves the [`Validator`] and
//! [`Responder`] the action names by token, and runs the flow:
//!
//! | Outcome | Status | Logged | Error recovery |
//! |---------|--------|--------|----------------|
//! | Field errors | current or 422 | no | yes, `invoke` skipped |
//! | `ActionError::AssertionFailed` | 422 | no | yes |
//! | `ActionError::Unexpected` | 500 | once, with backtrace | yes |
//! | Success | as set by the action | no | no |
//!
//! Every path ends in one responder call. Configuration faults (unknown
//! rule, unresolvable token, no responder) abort with a
//! [`DispatchError`](tessera_middleware::DispatchError) instead.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use tessera_action::{
//!     Action, ActionHandler, ActionRequestExt, FieldRules, FieldValidator, JsonResponder,
//!     Responder, Validator,
//! };
//! use tessera_core::{ActionError, Container, ServerRequest};
//! use tessera_middleware::Pipeline;
//! use bytes::Bytes;
//! use http::StatusCode;
//!
//! struct Subscribe;
//!
//! impl Action for Subscribe {
//!     fn register_validator(&self, request: ServerRequest) -> ServerRequest {
//!         request.with_validator("subscribe.validator")
//!     }
//!
//!     fn invoke(&self, request: ServerRequest) -> Result<ServerRequest, ActionError> {
//!         Ok(request
//!             .with_status_code(StatusCode::CREATED)
//!             .with_responder("json"))
//!     }
//!
//!     fn handle_error(&self, request: ServerRequest) -> ServerRequest {
//!         request.with_responder("json")
//!     }
//! }
//!
//! let rules = FieldRules::new().rule("email", |_, value, _| Ok(value.clone()));
//! let validator = FieldValidator::new(rules).fields(["email"]).checked().unwrap();
//!
//! let mut container = Container::new();
//! container.register::<dyn Validator>("subscribe.validator", Arc::new(validator));
//! container.register::<dyn Responder>("json", Arc::new(JsonResponder::new()));
//!
//! let pipeline = Pipeline::builder()
//!     .stage(ActionHandler::new(Arc::new(container)))
//!     .build();
//!
//! let request = ServerRequest::from_http(
//!     http::Request::builder()
//!         .method("POST")
//!         .uri("/subscriptions")
//!         .header("content-type", "application/json")
//!         .body(Bytes::from_static(b"{}"))
//!         .unwrap(),
//! )
//! .with_action(Arc::new(Subscribe));
//!
//! let response = pipeline.respond(request);
//! assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
//! ```

#![doc(html_root_url = "https://docs.rs/tessera-action/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod action;
mod handler;
mod responder;
mod validator;

pub use action::{Action, ActionRequestExt};
pub use handler::ActionHandler;
pub use responder::{JsonResponder, Responder};
pub use validator::{
    get_fields, rule_name, upper_camelize, FieldRule, FieldRules, FieldValidator, LazyAssertion,
    Validated, Validator,
};
