//! Rendering the final response.

use http::StatusCode;
use serde_json::{Map, Value};
use tessera_core::{ActionError, ErrorAggregate, Errors, Response, ResponseExt, ServerRequest};
use tessera_middleware::stages::DEFAULT_INTERNAL_ERROR_MESSAGE;

/// Renders a request context into the outbound response.
///
/// The action handler calls exactly one responder per dispatched action,
/// on the success path and the error-recovery path alike.
pub trait Responder: Send + Sync + 'static {
    /// Builds the response for `request`.
    fn render(&self, request: ServerRequest) -> Response;
}

/// Responder that writes the payload or the errors as JSON.
///
/// | Context | Body |
/// |---------|------|
/// | Field errors | the error aggregate, e.g. `{"_": ["..."]}` |
/// | Assertion failure | its violations as an error aggregate |
/// | Unexpected failure | `{"_": ["An internal error occurred"]}` |
/// | Otherwise | the payload, or `{}` |
///
/// The status is the context's status code, 200 when unset.
///
/// # Example
///
/// ```
/// use tessera_action::{JsonResponder, Responder};
/// use tessera_core::ServerRequest;
/// use bytes::Bytes;
/// use http::StatusCode;
/// use serde_json::{json, Map};
///
/// let mut payload = Map::new();
/// payload.insert("id".into(), json!(42));
///
/// let request = ServerRequest::from_http(
///     http::Request::builder().uri("/").body(Bytes::new()).unwrap(),
/// )
/// .with_payload(payload)
/// .with_status_code(StatusCode::CREATED);
///
/// let response = JsonResponder::new().render(request);
/// assert_eq!(response.status(), StatusCode::CREATED);
/// assert_eq!(response.body(), &Bytes::from_static(br#"{"id":42}"#));
/// ```
#[derive(Debug, Clone)]
pub struct JsonResponder {
    expose_internal_errors: bool,
    internal_error_message: String,
}

impl JsonResponder {
    /// Creates a responder that hides unexpected failure messages.
    #[must_use]
    pub fn new() -> Self {
        Self {
            expose_internal_errors: false,
            internal_error_message: DEFAULT_INTERNAL_ERROR_MESSAGE.to_string(),
        }
    }

    /// Sets whether unexpected failure messages are rendered verbatim.
    #[must_use]
    pub fn expose_internal_errors(mut self, expose: bool) -> Self {
        self.expose_internal_errors = expose;
        self
    }

    /// Sets the message rendered in place of hidden failures.
    #[must_use]
    pub fn internal_error_message(mut self, message: &str) -> Self {
        self.internal_error_message = message.to_string();
        self
    }

    fn failure_body(&self, cause: &ActionError) -> Value {
        if let Some(violations) = cause.violations() {
            return aggregate_json(&ErrorAggregate::from(violations.clone()));
        }
        let message = if self.expose_internal_errors {
            cause.to_string()
        } else {
            self.internal_error_message.clone()
        };
        let mut errors = ErrorAggregate::new();
        errors.push(tessera_core::REQUEST_PATH, message);
        aggregate_json(&errors)
    }
}

impl Default for JsonResponder {
    fn default() -> Self {
        Self::new()
    }
}

impl Responder for JsonResponder {
    fn render(&self, request: ServerRequest) -> Response {
        let status = request.status_code().unwrap_or(StatusCode::OK);

        let body = match request.errors() {
            Some(Errors::Failure(cause)) => self.failure_body(cause),
            Some(Errors::Fields(errors)) if !errors.is_empty() => aggregate_json(errors),
            _ => Value::Object(request.payload().cloned().unwrap_or_default()),
        };

        Response::json(status, &body)
    }
}

fn aggregate_json(errors: &ErrorAggregate) -> Value {
    Value::Object(
        errors
            .iter()
            .map(|(path, messages)| {
                let messages = messages.iter().cloned().map(Value::String).collect();
                (path.to_string(), Value::Array(messages))
            })
            .collect::<Map<String, Value>>(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use serde_json::json;
    use std::sync::Arc;

    fn request() -> ServerRequest {
        ServerRequest::from_http(http::Request::builder().uri("/").body(Bytes::new()).unwrap())
    }

    fn body(response: &Response) -> Value {
        serde_json::from_slice(response.body()).unwrap()
    }

    #[test]
    fn test_empty_context_renders_empty_object() {
        let response = JsonResponder::new().render(request());
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body(&response), json!({}));
    }

    #[test]
    fn test_field_errors() {
        let mut errors = ErrorAggregate::new();
        errors.push("_", "Required input for field 'email' is missing.");
        let response = JsonResponder::new().render(
            request()
                .with_errors(errors)
                .with_status_code(StatusCode::UNPROCESSABLE_ENTITY),
        );
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body(&response),
            json!({"_": ["Required input for field 'email' is missing."]})
        );
    }

    #[test]
    fn test_assertion_failure_renders_violations() {
        let cause = Arc::new(ActionError::assertion("amount", "Exceeds limit."));
        let response = JsonResponder::new().render(request().with_errors(Errors::Failure(cause)));
        assert_eq!(body(&response), json!({"amount": ["Exceeds limit."]}));
    }

    #[test]
    fn test_unexpected_failure_hidden_by_default() {
        let cause = Arc::new(ActionError::unexpected(std::io::Error::other("db password wrong")));
        let response = JsonResponder::new().render(
            request()
                .with_errors(Errors::Failure(Arc::clone(&cause)))
                .with_status_code(StatusCode::INTERNAL_SERVER_ERROR),
        );
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body(&response), json!({"_": [DEFAULT_INTERNAL_ERROR_MESSAGE]}));

        let exposed = JsonResponder::new()
            .expose_internal_errors(true)
            .render(request().with_errors(Errors::Failure(cause)));
        assert_eq!(body(&exposed), json!({"_": ["db password wrong"]}));
    }

    #[test]
    fn test_payload_rendered() {
        let mut payload = Map::new();
        payload.insert("email".into(), json!("user@x.com"));
        let response = JsonResponder::new().render(request().with_payload(payload));
        assert_eq!(body(&response), json!({"email": "user@x.com"}));
        assert_eq!(response.headers()["content-type"], "application/json");
    }
}
