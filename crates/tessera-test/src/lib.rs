//! # Tessera Test
//!
//! Test utilities for the Tessera action pipeline. Requests run through a
//! real [`Pipeline`](tessera_middleware::Pipeline) in memory; nothing binds
//! a port.
//!
//! ## Key Features
//!
//! - **Request Builder**: Fluent API for building [`ServerRequest`](tessera_core::ServerRequest)s,
//!   including attributes a router would set
//! - **Response Assertions**: Status, header and JSON checks
//! - **Test Client**: Sends requests through the full stage chain
//! - **Recording Logger**: Captures what the action handler logs
//!
//! ## Example
//!
//! ```
//! use tessera_core::ServerRequest;
//! use tessera_middleware::{DispatchError, Pipeline, Response, ResponseExt};
//! use tessera_test::TestClient;
//! use http::StatusCode;
//! use serde_json::json;
//!
//! let pipeline = Pipeline::builder()
//!     .fallback(|_request: ServerRequest| -> Result<Response, DispatchError> {
//!         Ok(Response::json(StatusCode::OK, &json!({"ok": true})))
//!     })
//!     .build();
//!
//! let client = TestClient::new(pipeline);
//! client
//!     .post("/users")
//!     .json(&json!({"email": "ada@example.com"}))
//!     .send()
//!     .assert_status(StatusCode::OK)
//!     .assert_json_field("ok", &json!(true));
//! ```

#![doc(html_root_url = "https://docs.rs/tessera-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod logger;
mod request;
mod response;

pub use client::{TestClient, TestClientRequest};
pub use error::TestError;
pub use logger::{LogEntry, RecordingLogger};
pub use request::{TestRequest, TestRequestBuilder};
pub use response::TestResponse;
