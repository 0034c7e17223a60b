//! Request ID middleware.
//!
//! Assigns every request a UUID v7 identifier used to correlate log entries
//! and error envelopes, and echoes it on the response.
//!
//! ## Request ID Sources
//!
//! 1. **X-Request-ID header**: used when the stage trusts incoming IDs and the
//!    header holds a valid UUID
//! 2. **Generated UUID v7**: in every other case

use crate::error::DispatchError;
use crate::middleware::{Middleware, Next};
use http::HeaderValue;
use tessera_core::{RequestId, Response, ServerRequest};
use uuid::Uuid;

/// The header name for request ID propagation.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Middleware that generates or extracts request IDs.
///
/// # Example
///
/// ```
/// use tessera_middleware::{Pipeline, stages::RequestIdMiddleware};
///
/// let pipeline = Pipeline::builder()
///     .stage(RequestIdMiddleware::trust_incoming())
///     .build();
/// assert_eq!(pipeline.stage_names(), vec!["request_id"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestIdMiddleware {
    /// Whether to trust incoming request ID headers.
    ///
    /// Leave this off for traffic from outside the service boundary.
    trust_incoming: bool,
}

impl RequestIdMiddleware {
    /// Creates a stage that always generates new IDs.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a stage that reuses a valid incoming `X-Request-ID`.
    #[must_use]
    pub fn trust_incoming() -> Self {
        Self {
            trust_incoming: true,
        }
    }

    /// Creates a stage from a boolean setting.
    #[must_use]
    pub fn with_trust(trust_incoming: bool) -> Self {
        Self { trust_incoming }
    }

    fn extract_request_id(&self, request: &ServerRequest) -> Option<RequestId> {
        if !self.trust_incoming {
            return None;
        }

        request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok())
            .map(RequestId::from_uuid)
    }
}

impl Middleware for RequestIdMiddleware {
    fn name(&self) -> &'static str {
        "request_id"
    }

    fn process(&self, request: ServerRequest, next: Next<'_>) -> Result<Response, DispatchError> {
        let request_id = self
            .extract_request_id(&request)
            .unwrap_or_else(RequestId::new);

        let mut response = next.run(request.with_request_id(request_id))?;

        if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
            response.headers_mut().insert(REQUEST_ID_HEADER, value);
        }

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::StatusCode;
    use tessera_core::ResponseExt;

    fn create_test_request() -> ServerRequest {
        ServerRequest::from_http(http::Request::builder().uri("/test").body(Bytes::new()).unwrap())
    }

    fn create_request_with_id(request_id: &str) -> ServerRequest {
        ServerRequest::from_http(
            http::Request::builder()
                .uri("/test")
                .header(REQUEST_ID_HEADER, request_id)
                .body(Bytes::new())
                .unwrap(),
        )
    }

    // Echoes the request ID seen by the endpoint in the body.
    fn echo_id(request: ServerRequest) -> Result<Response, DispatchError> {
        Ok(Response::text(StatusCode::OK, &request.request_id().to_string()))
    }

    fn header_id(response: &Response) -> &str {
        response
            .headers()
            .get(REQUEST_ID_HEADER)
            .unwrap()
            .to_str()
            .unwrap()
    }

    #[test]
    fn test_generates_request_id_when_missing() {
        let middleware = RequestIdMiddleware::new();
        let response = middleware
            .process(create_test_request(), Next::endpoint(&echo_id))
            .unwrap();

        let id = header_id(&response);
        assert!(Uuid::parse_str(id).is_ok());
        // The ID seen downstream matches the response header.
        assert_eq!(response.body(), &Bytes::from(id.to_string()));
    }

    #[test]
    fn test_ignores_incoming_id_when_not_trusted() {
        let middleware = RequestIdMiddleware::new();
        let incoming_id = "01890a5d-ac96-774b-bcce-b302099a8057";
        let response = middleware
            .process(create_request_with_id(incoming_id), Next::endpoint(&echo_id))
            .unwrap();

        assert_ne!(header_id(&response), incoming_id);
    }

    #[test]
    fn test_uses_incoming_id_when_trusted() {
        let middleware = RequestIdMiddleware::trust_incoming();
        let incoming_id = "01890a5d-ac96-774b-bcce-b302099a8057";
        let response = middleware
            .process(create_request_with_id(incoming_id), Next::endpoint(&echo_id))
            .unwrap();

        assert_eq!(header_id(&response), incoming_id);
        assert_eq!(response.body(), &Bytes::from_static(incoming_id.as_bytes()));
    }

    #[test]
    fn test_generates_new_id_for_invalid_header() {
        let middleware = RequestIdMiddleware::with_trust(true);
        let response = middleware
            .process(create_request_with_id("not-a-uuid"), Next::endpoint(&echo_id))
            .unwrap();

        assert_ne!(header_id(&response), "not-a-uuid");
        assert!(Uuid::parse_str(header_id(&response)).is_ok());
    }

    #[test]
    fn test_middleware_name() {
        assert_eq!(RequestIdMiddleware::new().name(), "request_id");
    }
}
