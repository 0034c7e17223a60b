//! Content negotiation and input assembly.

use crate::{trim_value, ExtractionError, ExtractionSource};
use serde_json::{Map, Value};
use tessera_core::{urlencoded, ServerRequest};

/// Default maximum body size for JSON extraction (1 MB).
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

/// Content-type prefix that selects JSON decoding of the raw body.
const JSON_CONTENT_TYPE: &str = "application/json";

/// Builds the input mapping that field validation reads from.
///
/// The body is chosen by content type: a Content-Type header line starting
/// with `application/json` decodes the raw body, anything else uses the body
/// already parsed by the HTTP layer. Query parameters are merged underneath
/// the body, so a body field wins over a query parameter of the same name.
/// Every string in the result is trimmed.
///
/// # Example
///
/// ```rust
/// use tessera_core::ServerRequest;
/// use tessera_extract::FieldExtractor;
/// use bytes::Bytes;
/// use serde_json::json;
///
/// let request = ServerRequest::from_http(
///     http::Request::builder()
///         .method("POST")
///         .uri("/users?source=web&email=ignored")
///         .header("content-type", "application/json; charset=utf-8")
///         .body(Bytes::from_static(br#"{"email": " ada@example.com "}"#))
///         .unwrap(),
/// );
///
/// let input = FieldExtractor::new().extract(&request).unwrap();
/// assert_eq!(
///     serde_json::Value::Object(input),
///     json!({"source": "web", "email": "ada@example.com"})
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldExtractor {
    max_body_size: usize,
}

impl FieldExtractor {
    /// Creates an extractor with the default body size limit.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }

    /// Sets the largest raw body accepted for JSON decoding.
    #[must_use]
    pub const fn with_max_body_size(mut self, max_body_size: usize) -> Self {
        self.max_body_size = max_body_size;
        self
    }

    /// Returns the configured body size limit.
    #[must_use]
    pub const fn max_body_size(&self) -> usize {
        self.max_body_size
    }

    /// Assembles the trimmed input mapping for `request`.
    ///
    /// # Errors
    ///
    /// Returns an [`ExtractionError`] when the body is too large, cannot be
    /// decoded, or does not decode to an object.
    pub fn extract(&self, request: &ServerRequest) -> Result<Map<String, Value>, ExtractionError> {
        let body = self.negotiate_body(request)?;
        let mut input = query_params(request)?;
        input.extend(body);

        Ok(input
            .into_iter()
            .map(|(key, value)| (key, trim_value(value)))
            .collect())
    }

    /// Returns the body mapping selected by content negotiation.
    ///
    /// # Errors
    ///
    /// See [`extract`](Self::extract).
    pub fn negotiate_body(
        &self,
        request: &ServerRequest,
    ) -> Result<Map<String, Value>, ExtractionError> {
        let data = if is_json(&request.content_type()) {
            let body = request.body();
            if body.len() > self.max_body_size {
                return Err(ExtractionError::payload_too_large(
                    self.max_body_size,
                    body.len(),
                ));
            }
            serde_json::from_slice::<Value>(body).map_err(|e| {
                tracing::debug!(error = %e, "request body is not valid JSON");
                ExtractionError::deserialization_failed(ExtractionSource::Body, e.to_string())
            })?
        } else {
            request.parsed_body().clone()
        };

        match data {
            Value::Object(map) => Ok(map),
            other => Err(ExtractionError::not_a_mapping(
                ExtractionSource::Body,
                json_kind(&other),
            )),
        }
    }
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Assembles input with the default [`FieldExtractor`].
///
/// # Errors
///
/// See [`FieldExtractor::extract`].
pub fn extract_fields(request: &ServerRequest) -> Result<Map<String, Value>, ExtractionError> {
    FieldExtractor::new().extract(request)
}

/// Decodes the query string into a mapping; repeated keys become arrays.
///
/// # Errors
///
/// Returns a deserialization error for an undecodable query string.
pub fn query_params(request: &ServerRequest) -> Result<Map<String, Value>, ExtractionError> {
    match request.query() {
        Some(query) => urlencoded::decode_str(query).map_err(|e| {
            ExtractionError::deserialization_failed(ExtractionSource::Query, e.to_string())
        }),
        None => Ok(Map::new()),
    }
}

fn is_json(content_type: &str) -> bool {
    content_type.starts_with(JSON_CONTENT_TYPE)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
