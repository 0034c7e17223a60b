//! Core middleware trait and types.
//!
//! This module defines the [`Middleware`] trait that every stage implements,
//! the [`Next`] continuation a stage calls to hand the request on, and the
//! [`RequestHandler`] that terminates the chain.
//!
//! Processing is synchronous: a stage receives the request context by value,
//! may derive a new context from it, and either answers itself or calls
//! [`Next::run`].
//!
//! # Example
//!
//! ```
//! use tessera_middleware::{DispatchError, Middleware, Next, Response};
//! use tessera_core::ServerRequest;
//!
//! struct Tagging;
//!
//! impl Middleware for Tagging {
//!     fn name(&self) -> &'static str {
//!         "tagging"
//!     }
//!
//!     fn process(&self, request: ServerRequest, next: Next<'_>) -> Result<Response, DispatchError> {
//!         next.run(request.with_attribute("tagged", true))
//!     }
//! }
//! ```

use crate::error::DispatchError;
use std::sync::Arc;
use tessera_core::{Response, ServerRequest};

/// A type-erased middleware that can be stored in a vector.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// The core middleware trait.
///
/// # Invariants
///
/// - A stage calls `next.run()` at most once
/// - A stage never swallows a [`DispatchError`] it does not handle itself
pub trait Middleware: Send + Sync + 'static {
    /// Returns the name of this middleware stage, used in logs.
    fn name(&self) -> &'static str;

    /// Processes the request, delegating to `next` when appropriate.
    fn process(&self, request: ServerRequest, next: Next<'_>) -> Result<Response, DispatchError>;
}

/// Terminal handler invoked when every stage delegated.
pub trait RequestHandler: Send + Sync + 'static {
    /// Produces the response for a request no stage answered.
    fn handle(&self, request: ServerRequest) -> Result<Response, DispatchError>;
}

impl<F> RequestHandler for F
where
    F: Fn(ServerRequest) -> Result<Response, DispatchError> + Send + Sync + 'static,
{
    fn handle(&self, request: ServerRequest) -> Result<Response, DispatchError> {
        self(request)
    }
}

/// Callback to invoke the rest of the chain.
///
/// `run` consumes the continuation, so it can be called only once.
pub struct Next<'a> {
    stages: &'a [BoxedMiddleware],
    endpoint: &'a dyn RequestHandler,
}

impl<'a> Next<'a> {
    /// Creates a continuation over `stages` that ends in `endpoint`.
    #[must_use]
    pub fn new(stages: &'a [BoxedMiddleware], endpoint: &'a dyn RequestHandler) -> Self {
        Self { stages, endpoint }
    }

    /// Creates a continuation that goes straight to `endpoint`.
    #[must_use]
    pub fn endpoint(endpoint: &'a dyn RequestHandler) -> Self {
        Self {
            stages: &[],
            endpoint,
        }
    }

    /// Returns the number of stages left before the endpoint.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.stages.len()
    }

    /// Invokes the next middleware, or the endpoint if none is left.
    pub fn run(self, request: ServerRequest) -> Result<Response, DispatchError> {
        match self.stages.split_first() {
            Some((middleware, rest)) => {
                tracing::trace!(stage = middleware.name(), "entering stage");
                middleware.process(request, Next::new(rest, self.endpoint))
            }
            None => self.endpoint.handle(request),
        }
    }
}

/// A middleware built from a closure.
///
/// # Example
///
/// ```
/// use tessera_middleware::{DispatchError, FnMiddleware, Next, Response};
/// use tessera_core::ServerRequest;
/// use http::StatusCode;
///
/// let middleware = FnMiddleware::new(
///     "force_created",
///     |request: ServerRequest, next: Next<'_>| -> Result<Response, DispatchError> {
///         let mut response = next.run(request)?;
///         *response.status_mut() = StatusCode::CREATED;
///         Ok(response)
///     },
/// );
/// ```
pub struct FnMiddleware<F> {
    name: &'static str,
    func: F,
}

impl<F> FnMiddleware<F> {
    /// Creates a new function-based middleware.
    pub const fn new(name: &'static str, func: F) -> Self {
        Self { name, func }
    }
}

impl<F> Middleware for FnMiddleware<F>
where
    F: Fn(ServerRequest, Next<'_>) -> Result<Response, DispatchError> + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn process(&self, request: ServerRequest, next: Next<'_>) -> Result<Response, DispatchError> {
        (self.func)(request, next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::StatusCode;
    use tessera_core::ResponseExt;

    struct Visit {
        name: &'static str,
    }

    impl Middleware for Visit {
        fn name(&self) -> &'static str {
            self.name
        }

        fn process(&self, request: ServerRequest, next: Next<'_>) -> Result<Response, DispatchError> {
            let mut seen: Vec<&'static str> = request
                .attribute::<Vec<&'static str>>("visited")
                .cloned()
                .unwrap_or_default();
            seen.push(self.name);
            next.run(request.with_attribute("visited", seen))
        }
    }

    fn request() -> ServerRequest {
        ServerRequest::from_http(http::Request::builder().uri("/test").body(Bytes::new()).unwrap())
    }

    fn echo_visits(request: ServerRequest) -> Result<Response, DispatchError> {
        let seen = request
            .attribute::<Vec<&'static str>>("visited")
            .cloned()
            .unwrap_or_default();
        Ok(Response::text(StatusCode::OK, &seen.join(",")))
    }

    #[test]
    fn test_middleware_name() {
        let mw = Visit { name: "test" };
        assert_eq!(mw.name(), "test");
    }

    #[test]
    fn test_next_endpoint() {
        let next = Next::endpoint(&echo_visits);
        assert_eq!(next.remaining(), 0);
        let response = next.run(request()).unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_middleware_chain_order() {
        let stages: Vec<BoxedMiddleware> = vec![
            Arc::new(Visit { name: "first" }),
            Arc::new(Visit { name: "second" }),
        ];

        let response = Next::new(&stages, &echo_visits).run(request()).unwrap();
        assert_eq!(response.body(), &Bytes::from_static(b"first,second"));
    }

    #[test]
    fn test_short_circuit_skips_endpoint() {
        let deny = FnMiddleware::new(
            "deny",
            |_req: ServerRequest, _next: Next<'_>| -> Result<Response, DispatchError> {
                Ok(Response::text(StatusCode::FORBIDDEN, "denied"))
            },
        );
        let stages: Vec<BoxedMiddleware> = vec![Arc::new(deny)];

        let endpoint = |_req: ServerRequest| -> Result<Response, DispatchError> {
            panic!("endpoint must not run")
        };
        let response = Next::new(&stages, &endpoint).run(request()).unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_errors_propagate() {
        let failing = |_req: ServerRequest| -> Result<Response, DispatchError> {
            Err(DispatchError::InvalidFieldName)
        };
        let stages: Vec<BoxedMiddleware> = vec![Arc::new(Visit { name: "only" })];
        let err = Next::new(&stages, &failing).run(request()).unwrap_err();
        assert!(matches!(err, DispatchError::InvalidFieldName));
    }
}
