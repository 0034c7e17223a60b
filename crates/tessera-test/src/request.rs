//! Test request builder.

use crate::error::TestError;
use bytes::Bytes;
use http::{header, HeaderName, HeaderValue, Method};
use serde::Serialize;
use std::any::Any;
use std::fmt;
use tessera_core::ServerRequest;

type AttributeSetter = Box<dyn FnOnce(ServerRequest) -> ServerRequest + Send>;

/// Entry point for building test requests.
///
/// # Example
///
/// ```
/// use tessera_test::TestRequest;
/// use serde_json::json;
///
/// let request = TestRequest::post("/users?source=web")
///     .json(&json!({"email": "ada@example.com"}))
///     .attribute("tenant", json!("acme"))
///     .build()
///     .unwrap();
///
/// assert_eq!(request.query(), Some("source=web"));
/// assert_eq!(request.content_type(), "application/json");
/// assert_eq!(request.data_attributes()["tenant"], "acme");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TestRequest;

impl TestRequest {
    /// Starts a GET request.
    pub fn get(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::GET, uri)
    }

    /// Starts a POST request.
    pub fn post(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::POST, uri)
    }

    /// Starts a PUT request.
    pub fn put(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::PUT, uri)
    }

    /// Starts a PATCH request.
    pub fn patch(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::PATCH, uri)
    }

    /// Starts a DELETE request.
    pub fn delete(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::DELETE, uri)
    }
}

/// Fluent builder producing a [`ServerRequest`].
///
/// Errors from header parsing or body encoding are held until
/// [`build`](Self::build), so the chain never panics.
#[must_use]
pub struct TestRequestBuilder {
    method: Method,
    uri: String,
    headers: Vec<(String, String)>,
    body: Bytes,
    attributes: Vec<AttributeSetter>,
    error: Option<TestError>,
}

impl TestRequestBuilder {
    /// Creates a builder for `method` and `uri`.
    pub fn new(method: Method, uri: impl AsRef<str>) -> Self {
        Self {
            method,
            uri: uri.as_ref().to_string(),
            headers: Vec::new(),
            body: Bytes::new(),
            attributes: Vec::new(),
            error: None,
        }
    }

    /// Adds a header. Repeated names keep every value.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.headers
            .push((name.as_ref().to_string(), value.as_ref().to_string()));
        self
    }

    /// Sets the `Content-Type` header.
    pub fn content_type(self, content_type: impl AsRef<str>) -> Self {
        self.header(header::CONTENT_TYPE.as_str(), content_type)
    }

    /// Sets the raw body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets a JSON body and `Content-Type: application/json`.
    pub fn json<T: Serialize>(mut self, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(bytes) => self.body = Bytes::from(bytes),
            Err(e) => self.error = Some(TestError::Json(e)),
        }
        self.content_type("application/json")
    }

    /// Sets a form-urlencoded body and the matching `Content-Type`.
    ///
    /// The HTTP layer's form parsing runs on build, so the body is available
    /// as the parsed body like it would be in a server.
    pub fn form<T: Serialize>(mut self, value: &T) -> Self {
        match serde_urlencoded::to_string(value) {
            Ok(encoded) => self.body = Bytes::from(encoded),
            Err(e) => self.error = Some(TestError::Form(e)),
        }
        self.content_type("application/x-www-form-urlencoded")
    }

    /// Sets an attribute, as a router or earlier stage would.
    pub fn attribute<T: Any + Send + Sync>(mut self, name: impl Into<String>, value: T) -> Self {
        let name = name.into();
        self.attributes
            .push(Box::new(move |request| request.with_attribute(name, value)));
        self
    }

    /// Builds the request.
    pub fn build(self) -> Result<ServerRequest, TestError> {
        if let Some(error) = self.error {
            return Err(error);
        }

        let mut builder = http::Request::builder()
            .method(self.method)
            .uri(self.uri.as_str());
        for (name, value) in &self.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| TestError::InvalidHeader(format!("{name}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| TestError::InvalidHeader(format!("{name}: {e}")))?;
            builder = builder.header(name, value);
        }

        let request = builder
            .body(self.body)
            .map_err(|e| TestError::RequestBuild(e.to_string()))?;

        Ok(self
            .attributes
            .into_iter()
            .fold(ServerRequest::from_http(request), |request, set| set(request)))
    }
}

impl fmt::Debug for TestRequestBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestRequestBuilder")
            .field("method", &self.method)
            .field("uri", &self.uri)
            .field("headers", &self.headers)
            .field("body_len", &self.body.len())
            .field("attribute_count", &self.attributes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_request() {
        let request = TestRequest::get("/users").build().unwrap();
        assert_eq!(request.method(), &Method::GET);
        assert_eq!(request.uri().path(), "/users");
        assert!(request.body().is_empty());
    }

    #[test]
    fn test_json_body() {
        let request = TestRequest::post("/users")
            .json(&json!({"name": "Alice"}))
            .build()
            .unwrap();
        assert_eq!(request.content_type(), "application/json");
        assert_eq!(request.body(), &Bytes::from_static(br#"{"name":"Alice"}"#));
    }

    #[test]
    fn test_form_body_is_parsed() {
        let request = TestRequest::post("/users")
            .form(&[("name", "Alice"), ("lang", "en")])
            .build()
            .unwrap();
        assert_eq!(request.parsed_body(), &json!({"name": "Alice", "lang": "en"}));
    }

    #[test]
    fn test_repeated_headers() {
        let request = TestRequest::get("/")
            .header("accept", "text/html")
            .header("accept", "application/json")
            .build()
            .unwrap();
        assert_eq!(request.header_line("accept"), "text/html, application/json");
    }

    #[test]
    fn test_invalid_header_name() {
        let err = TestRequest::get("/").header("bad header", "x").build().unwrap_err();
        assert!(matches!(err, TestError::InvalidHeader(_)));
    }

    #[test]
    fn test_invalid_uri() {
        let err = TestRequest::get("http://[::1").build().unwrap_err();
        assert!(matches!(err, TestError::RequestBuild(_)));
    }

    #[test]
    fn test_attributes_applied_in_order() {
        let request = TestRequest::get("/")
            .attribute("id", "first".to_string())
            .attribute("id", "second".to_string())
            .build()
            .unwrap();
        assert_eq!(request.attribute::<String>("id").map(String::as_str), Some("second"));
    }
}
