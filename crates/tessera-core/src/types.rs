//! HTTP response type produced by the pipeline.

use bytes::Bytes;
use http::{header, HeaderValue, StatusCode};

/// The HTTP response type returned by responders and the pipeline.
pub type Response = http::Response<Bytes>;

/// Extension trait for building responses.
pub trait ResponseExt {
    /// Creates a plain-text response.
    fn text(status: StatusCode, message: &str) -> Response;

    /// Creates a response with a serialized JSON body.
    fn json(status: StatusCode, body: &serde_json::Value) -> Response;

    /// Creates a JSON error envelope:
    /// `{"error": {"code": ..., "message": ..., "request_id": ...}}`.
    fn json_error(status: StatusCode, code: &str, message: &str, request_id: Option<&str>) -> Response;
}

impl ResponseExt for Response {
    fn text(status: StatusCode, message: &str) -> Response {
        with_body(
            status,
            HeaderValue::from_static("text/plain; charset=utf-8"),
            Bytes::from(message.to_string()),
        )
    }

    fn json(status: StatusCode, body: &serde_json::Value) -> Response {
        with_body(
            status,
            HeaderValue::from_static("application/json"),
            Bytes::from(body.to_string()),
        )
    }

    fn json_error(status: StatusCode, code: &str, message: &str, request_id: Option<&str>) -> Response {
        let mut error = serde_json::json!({
            "code": code,
            "message": message,
        });
        if let Some(id) = request_id {
            error["request_id"] = serde_json::Value::String(id.to_string());
        }
        Self::json(status, &serde_json::json!({ "error": error }))
    }
}

fn with_body(status: StatusCode, content_type: HeaderValue, body: Bytes) -> Response {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, content_type);
    response
}
