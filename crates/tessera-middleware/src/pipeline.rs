//! Middleware pipeline.
//!
//! A [`Pipeline`] is an ordered list of stages ending in a fallback
//! [`RequestHandler`]. It is built once at startup and shared across
//! requests; every per-request value travels in the [`ServerRequest`].
//!
//! A typical service installs, in order:
//!
//! 1. **Request ID** - assign the correlation ID
//! 2. **Error Normalization** - render faults from later stages
//! 3. **Action Handler** - validate, execute and respond (`tessera-action`)
//!
//! Requests whose routed handler is not an action fall through to the
//! fallback, which answers `404 Not Found` unless replaced.

use crate::error::DispatchError;
use crate::middleware::{BoxedMiddleware, Middleware, Next, RequestHandler};
use crate::stages::ErrorNormalizationMiddleware;
use http::StatusCode;
use std::fmt;
use std::sync::Arc;
use tessera_core::{Response, ResponseExt, ServerRequest};

/// An ordered middleware chain with a terminal handler.
///
/// # Example
///
/// ```
/// use tessera_middleware::{Pipeline, stages::RequestIdMiddleware};
/// use tessera_core::ServerRequest;
/// use bytes::Bytes;
/// use http::StatusCode;
///
/// let pipeline = Pipeline::builder()
///     .stage(RequestIdMiddleware::new())
///     .build();
///
/// let request = ServerRequest::from_http(
///     http::Request::builder().uri("/unknown").body(Bytes::new()).unwrap(),
/// );
/// let response = pipeline.respond(request);
/// assert_eq!(response.status(), StatusCode::NOT_FOUND);
/// assert!(response.headers().contains_key("x-request-id"));
/// ```
pub struct Pipeline {
    stages: Vec<BoxedMiddleware>,
    fallback: Arc<dyn RequestHandler>,
    normalizer: ErrorNormalizationMiddleware,
}

impl Pipeline {
    /// Creates a new pipeline builder.
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Runs a request through every stage.
    ///
    /// # Errors
    ///
    /// Returns the [`DispatchError`] no stage converted into a response.
    pub fn handle(&self, request: ServerRequest) -> Result<Response, DispatchError> {
        Next::new(&self.stages, self.fallback.as_ref()).run(request)
    }

    /// Runs a request and renders any remaining fault as an error envelope.
    ///
    /// The envelope carries the request ID the context had on entry; install
    /// [`ErrorNormalizationMiddleware`] after the request ID stage to report
    /// the ID assigned by that stage instead.
    pub fn respond(&self, request: ServerRequest) -> Response {
        let request_id = request.request_id();
        self.handle(request)
            .unwrap_or_else(|error| self.normalizer.normalize(&error, request_id))
    }

    /// Returns the names of all middleware stages in order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|mw| mw.name()).collect()
    }

    /// Returns the number of middleware stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .field("normalizer", &self.normalizer)
            .finish_non_exhaustive()
    }
}

/// Builder for constructing a [`Pipeline`].
pub struct PipelineBuilder {
    stages: Vec<BoxedMiddleware>,
    fallback: Option<Arc<dyn RequestHandler>>,
    normalizer: ErrorNormalizationMiddleware,
}

impl PipelineBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            stages: Vec::new(),
            fallback: None,
            normalizer: ErrorNormalizationMiddleware::new(),
        }
    }

    /// Appends a middleware stage.
    #[must_use]
    pub fn stage<M: Middleware>(mut self, middleware: M) -> Self {
        self.stages.push(Arc::new(middleware));
        self
    }

    /// Appends a stage that is already shared.
    #[must_use]
    pub fn shared_stage(mut self, middleware: BoxedMiddleware) -> Self {
        self.stages.push(middleware);
        self
    }

    /// Sets the handler invoked when every stage delegates.
    #[must_use]
    pub fn fallback<H: RequestHandler>(mut self, handler: H) -> Self {
        self.fallback = Some(Arc::new(handler));
        self
    }

    /// Sets how [`Pipeline::respond`] renders unhandled faults.
    #[must_use]
    pub fn error_normalization(mut self, normalizer: ErrorNormalizationMiddleware) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Builds the pipeline.
    #[must_use]
    pub fn build(self) -> Pipeline {
        Pipeline {
            stages: self.stages,
            fallback: self
                .fallback
                .unwrap_or_else(|| Arc::new(not_found) as Arc<dyn RequestHandler>),
            normalizer: self.normalizer,
        }
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn not_found(request: ServerRequest) -> Result<Response, DispatchError> {
    tracing::debug!(request_id = %request.request_id(), path = request.uri().path(), "no handler matched");
    Ok(Response::json_error(
        StatusCode::NOT_FOUND,
        "NOT_FOUND",
        "No handler matched the request.",
        Some(&request.request_id().to_string()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::FnMiddleware;
    use crate::stages::RequestIdMiddleware;
    use bytes::Bytes;

    fn request() -> ServerRequest {
        ServerRequest::from_http(http::Request::builder().uri("/test").body(Bytes::new()).unwrap())
    }

    fn failing(_: ServerRequest) -> Result<Response, DispatchError> {
        Err(DispatchError::InvalidFieldName)
    }

    #[test]
    fn test_empty_pipeline_uses_default_fallback() {
        let pipeline = Pipeline::builder().build();
        assert_eq!(pipeline.stage_count(), 0);
        let response = pipeline.handle(request()).unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_custom_fallback() {
        let pipeline = Pipeline::builder()
            .fallback(|_req: ServerRequest| -> Result<Response, DispatchError> {
                Ok(Response::text(StatusCode::OK, "fallback"))
            })
            .build();
        let response = pipeline.handle(request()).unwrap();
        assert_eq!(response.body(), &Bytes::from_static(b"fallback"));
    }

    #[test]
    fn test_stage_names_in_order() {
        let pipeline = Pipeline::builder()
            .stage(RequestIdMiddleware::new())
            .stage(ErrorNormalizationMiddleware::new())
            .build();
        assert_eq!(pipeline.stage_names(), vec!["request_id", "error_normalization"]);
    }

    #[test]
    fn test_handle_propagates_fault() {
        let pipeline = Pipeline::builder().fallback(failing).build();
        assert!(matches!(
            pipeline.handle(request()),
            Err(DispatchError::InvalidFieldName)
        ));
    }

    #[test]
    fn test_respond_normalizes_fault() {
        let pipeline = Pipeline::builder().fallback(failing).build();
        let request = request();
        let request_id = request.request_id().to_string();

        let response = pipeline.respond(request);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["error"]["request_id"], request_id);
    }

    #[test]
    fn test_normalization_stage_reports_assigned_request_id() {
        let pipeline = Pipeline::builder()
            .stage(RequestIdMiddleware::new())
            .stage(ErrorNormalizationMiddleware::new())
            .fallback(failing)
            .build();

        let response = pipeline.respond(request());
        let header = response.headers()["x-request-id"].to_str().unwrap().to_string();
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["error"]["request_id"], header);
    }

    #[test]
    fn test_shared_stage() {
        let stage: BoxedMiddleware = Arc::new(FnMiddleware::new(
            "noop",
            |request: ServerRequest, next: Next<'_>| -> Result<Response, DispatchError> {
                next.run(request)
            },
        ));
        let pipeline = Pipeline::builder().shared_stage(Arc::clone(&stage)).build();
        assert_eq!(pipeline.stage_names(), vec!["noop"]);
    }
}
