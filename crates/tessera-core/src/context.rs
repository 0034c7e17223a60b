//! Request context types.
//!
//! The [`ServerRequest`] carries the inbound request and an attribute bag
//! through the pipeline. Every attribute write returns a new value; the
//! request it was derived from never changes.

use crate::attributes::{self, ErrorSeverity, Token};
use crate::errors::{ErrorAggregate, Errors, Violations};
use bytes::Bytes;
use http::{header, HeaderMap, Method, StatusCode, Uri};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// A unique identifier for each request, using UUID v7.
///
/// UUID v7 is time-ordered, which makes it ideal for request tracking
/// and log correlation.
///
/// # Example
///
/// ```
/// use tessera_core::RequestId;
///
/// let id = RequestId::new();
/// println!("Request ID: {}", id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new unique request ID using UUID v7.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `RequestId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RequestId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// The parts of a request supplied by the HTTP layer.
#[derive(Debug, Clone)]
struct RequestHead {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    parsed_body: Value,
}

type AttributeMap = IndexMap<String, Arc<dyn Any + Send + Sync>>;

/// Inbound request plus an ordered, copy-on-write attribute bag.
///
/// Cloning is cheap: the request head and the attribute map are shared
/// behind `Arc`s and only copied when a clone is written to.
///
/// Attributes are stored under string names and read back with their
/// concrete type. A lookup with the wrong type behaves like a missing
/// attribute.
///
/// # Example
///
/// ```
/// use tessera_core::ServerRequest;
/// use bytes::Bytes;
///
/// let request = ServerRequest::from_http(
///     http::Request::builder().uri("/orders/42").body(Bytes::new()).unwrap(),
/// );
///
/// let routed = request.clone().with_attribute("order_id", serde_json::json!("42"));
///
/// assert!(request.attribute::<serde_json::Value>("order_id").is_none());
/// assert_eq!(
///     routed.attribute::<serde_json::Value>("order_id"),
///     Some(&serde_json::json!("42"))
/// );
/// ```
#[derive(Clone)]
pub struct ServerRequest {
    head: Arc<RequestHead>,
    request_id: RequestId,
    attributes: Arc<AttributeMap>,
}

impl ServerRequest {
    /// Builds a context from an `http::Request`.
    ///
    /// URL-encoded form bodies are decoded into the parsed body. Any other
    /// body leaves the parsed body as an empty object; JSON bodies are decoded
    /// on demand by the field extractor.
    pub fn from_http(request: http::Request<Bytes>) -> Self {
        let (parts, body) = request.into_parts();
        let parsed_body = parse_form_body(&parts.headers, &body);

        Self {
            head: Arc::new(RequestHead {
                method: parts.method,
                uri: parts.uri,
                headers: parts.headers,
                body,
                parsed_body,
            }),
            request_id: RequestId::new(),
            attributes: Arc::new(IndexMap::new()),
        }
    }

    /// Returns the request ID.
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns a context carrying the given request ID.
    #[must_use]
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = request_id;
        self
    }

    /// Returns the HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.head.method
    }

    /// Returns the request URI.
    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.head.uri
    }

    /// Returns the query string, if present.
    #[must_use]
    pub fn query(&self) -> Option<&str> {
        self.head.uri.query()
    }

    /// Returns the request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.head.headers
    }

    /// Returns all values of a header joined with `", "`.
    ///
    /// Values that are not visible ASCII are skipped. Returns an empty
    /// string when the header is absent.
    #[must_use]
    pub fn header_line(&self, name: &str) -> String {
        self.head
            .headers
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Returns the Content-Type header line.
    #[must_use]
    pub fn content_type(&self) -> String {
        self.header_line(header::CONTENT_TYPE.as_str())
    }

    /// Returns the raw request body.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.head.body
    }

    /// Returns the body as parsed by the HTTP layer.
    #[must_use]
    pub fn parsed_body(&self) -> &Value {
        &self.head.parsed_body
    }

    /// Returns a context with a different parsed body.
    #[must_use]
    pub fn with_parsed_body(mut self, parsed_body: Value) -> Self {
        Arc::make_mut(&mut self.head).parsed_body = parsed_body;
        self
    }

    /// Returns the attribute stored under `name` if it has type `T`.
    #[must_use]
    pub fn attribute<T: Any + Send + Sync>(&self, name: &str) -> Option<&T> {
        self.attributes.get(name).and_then(|v| v.downcast_ref())
    }

    /// Returns `true` if any value is stored under `name`.
    #[must_use]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Returns a context with `value` stored under `name`.
    ///
    /// An existing attribute with the same name is replaced in place, keeping
    /// its position. A bare [`ErrorAggregate`] or [`Violations`] stored under
    /// `_errors` is wrapped in [`Errors::Fields`], so [`errors`](Self::errors)
    /// reads it like any other validation result.
    #[must_use]
    pub fn with_attribute<T: Any + Send + Sync>(mut self, name: impl Into<String>, value: T) -> Self {
        let name = name.into();
        let value: Arc<dyn Any + Send + Sync> = if name == attributes::ERRORS {
            errors_value(Box::new(value))
        } else {
            Arc::new(value)
        };
        Arc::make_mut(&mut self.attributes).insert(name, value);
        self
    }

    /// Returns a context without the attribute `name`.
    #[must_use]
    pub fn without_attribute(mut self, name: &str) -> Self {
        if self.attributes.contains_key(name) {
            Arc::make_mut(&mut self.attributes).shift_remove(name);
        }
        self
    }

    /// Returns attribute names in insertion order.
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }

    /// Collects attributes that hold plain data as a JSON object.
    ///
    /// Attributes stored as [`serde_json::Value`] or `String` are included;
    /// reserved pipeline attributes and values of any other type are skipped.
    /// Route parameters set by the router are typically read this way.
    #[must_use]
    pub fn data_attributes(&self) -> Map<String, Value> {
        self.attributes
            .iter()
            .filter(|(name, _)| !attributes::is_reserved(name))
            .filter_map(|(name, value)| {
                if let Some(json) = value.downcast_ref::<Value>() {
                    Some((name.clone(), json.clone()))
                } else {
                    value
                        .downcast_ref::<String>()
                        .map(|s| (name.clone(), Value::String(s.clone())))
                }
            })
            .collect()
    }

    /// Returns the status code chosen for the response.
    #[must_use]
    pub fn status_code(&self) -> Option<StatusCode> {
        self.attribute::<StatusCode>(attributes::STATUS_CODE).copied()
    }

    /// Returns a context with the given response status.
    #[must_use]
    pub fn with_status_code(self, status: StatusCode) -> Self {
        self.with_attribute(attributes::STATUS_CODE, status)
    }

    /// Returns the errors attribute.
    #[must_use]
    pub fn errors(&self) -> Option<&Errors> {
        self.attribute::<Errors>(attributes::ERRORS)
    }

    /// Returns `true` when the errors attribute holds anything to report.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.errors().is_some_and(|e| !e.is_empty())
    }

    /// Returns a context with the errors attribute set.
    #[must_use]
    pub fn with_errors(self, errors: impl Into<Errors>) -> Self {
        self.with_attribute(attributes::ERRORS, errors.into())
    }

    /// Returns the error severity, if one was assigned.
    #[must_use]
    pub fn error_severity(&self) -> Option<ErrorSeverity> {
        self.attribute::<ErrorSeverity>(attributes::ERROR_SEVERITY)
            .copied()
    }

    /// Returns a context with the given error severity.
    #[must_use]
    pub fn with_error_severity(self, severity: ErrorSeverity) -> Self {
        self.with_attribute(attributes::ERROR_SEVERITY, severity)
    }

    /// Returns the responder token.
    #[must_use]
    pub fn responder(&self) -> Option<&Token> {
        self.attribute::<Token>(attributes::RESPONDER)
    }

    /// Returns a context naming the responder that renders the response.
    #[must_use]
    pub fn with_responder(self, token: impl Into<Token>) -> Self {
        self.with_attribute(attributes::RESPONDER, token.into())
    }

    /// Returns the validator token.
    #[must_use]
    pub fn validator(&self) -> Option<&Token> {
        self.attribute::<Token>(attributes::VALIDATOR)
    }

    /// Returns a context naming the validator for this request.
    #[must_use]
    pub fn with_validator(self, token: impl Into<Token>) -> Self {
        self.with_attribute(attributes::VALIDATOR, token.into())
    }

    /// Returns the validated payload.
    #[must_use]
    pub fn payload(&self) -> Option<&Map<String, Value>> {
        self.attribute::<Map<String, Value>>(attributes::PAYLOAD)
    }

    /// Returns a context carrying the validated payload.
    #[must_use]
    pub fn with_payload(self, payload: Map<String, Value>) -> Self {
        self.with_attribute(attributes::PAYLOAD, payload)
    }
}

impl fmt::Debug for ServerRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerRequest")
            .field("request_id", &self.request_id)
            .field("method", &self.head.method)
            .field("uri", &self.head.uri)
            .field("attributes", &self.attributes.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

fn errors_value(value: Box<dyn Any + Send + Sync>) -> Arc<dyn Any + Send + Sync> {
    let value = match value.downcast::<ErrorAggregate>() {
        Ok(aggregate) => return Arc::new(Errors::Fields(*aggregate)),
        Err(value) => value,
    };
    match value.downcast::<Violations>() {
        Ok(violations) => Arc::new(Errors::Fields(ErrorAggregate::from(*violations))),
        Err(value) => Arc::from(value),
    }
}

fn parse_form_body(headers: &HeaderMap, body: &Bytes) -> Value {
    let is_form = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| {
            ct.to_ascii_lowercase()
                .starts_with("application/x-www-form-urlencoded")
        });

    if !is_form {
        return Value::Object(Map::new());
    }

    match crate::urlencoded::decode(body) {
        Ok(map) => Value::Object(map),
        Err(e) => {
            tracing::debug!(error = %e, "failed to decode form body");
            Value::Null
        }
    }
}
