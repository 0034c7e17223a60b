//! In-memory client driving a pipeline.

use crate::error::TestError;
use crate::request::{TestRequest, TestRequestBuilder};
use crate::response::TestResponse;
use bytes::Bytes;
use http::Method;
use serde::Serialize;
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use tessera_middleware::{DispatchError, Pipeline};

/// Sends requests through a [`Pipeline`] without a network.
///
/// Cloning is cheap; clones share the pipeline, so a single client can be
/// handed to concurrent tasks.
///
/// # Example
///
/// ```
/// use tessera_middleware::Pipeline;
/// use tessera_middleware::stages::RequestIdMiddleware;
/// use tessera_test::TestClient;
/// use http::StatusCode;
///
/// let client = TestClient::new(
///     Pipeline::builder().stage(RequestIdMiddleware::new()).build(),
/// );
///
/// let response = client.get("/missing").send();
/// response.assert_status(StatusCode::NOT_FOUND);
/// assert!(response.header("x-request-id").is_some());
/// ```
#[derive(Clone)]
#[must_use]
pub struct TestClient {
    pipeline: Arc<Pipeline>,
    default_headers: Vec<(String, String)>,
}

impl TestClient {
    /// Creates a client for `pipeline`.
    pub fn new(pipeline: impl Into<Arc<Pipeline>>) -> Self {
        Self {
            pipeline: pipeline.into(),
            default_headers: Vec::new(),
        }
    }

    /// Adds a header sent with every request.
    pub fn with_default_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Returns the pipeline requests run through.
    #[must_use]
    pub fn pipeline(&self) -> &Arc<Pipeline> {
        &self.pipeline
    }

    /// Creates a GET request builder.
    pub fn get(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::get(uri))
    }

    /// Creates a POST request builder.
    pub fn post(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::post(uri))
    }

    /// Creates a PUT request builder.
    pub fn put(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::put(uri))
    }

    /// Creates a PATCH request builder.
    pub fn patch(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::patch(uri))
    }

    /// Creates a DELETE request builder.
    pub fn delete(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::delete(uri))
    }

    /// Creates a request builder with a custom method.
    pub fn request(&self, method: Method, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequestBuilder::new(method, uri))
    }
}

impl fmt::Debug for TestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestClient")
            .field("pipeline", &self.pipeline)
            .field("default_headers", &self.default_headers)
            .finish()
    }
}

/// A request builder bound to a test client.
#[must_use]
pub struct TestClientRequest<'a> {
    client: &'a TestClient,
    builder: TestRequestBuilder,
}

impl<'a> TestClientRequest<'a> {
    fn new(client: &'a TestClient, builder: TestRequestBuilder) -> Self {
        let builder = client
            .default_headers
            .iter()
            .fold(builder, |builder, (name, value)| builder.header(name, value));
        Self { client, builder }
    }

    /// Sets a header on the request.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.builder = self.builder.header(name, value);
        self
    }

    /// Sets the Content-Type header.
    pub fn content_type(mut self, content_type: impl AsRef<str>) -> Self {
        self.builder = self.builder.content_type(content_type);
        self
    }

    /// Sets the raw request body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.builder = self.builder.body(body);
        self
    }

    /// Sets the request body as JSON.
    pub fn json<T: Serialize>(mut self, value: &T) -> Self {
        self.builder = self.builder.json(value);
        self
    }

    /// Sets the request body as form-urlencoded.
    pub fn form<T: Serialize>(mut self, value: &T) -> Self {
        self.builder = self.builder.form(value);
        self
    }

    /// Sets an attribute, as a router would.
    pub fn attribute<T: Any + Send + Sync>(mut self, name: impl Into<String>, value: T) -> Self {
        self.builder = self.builder.attribute(name, value);
        self
    }

    /// Sends the request, rendering any fault as an error envelope.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built.
    pub fn send(self) -> TestResponse {
        self.try_send().expect("valid request")
    }

    /// Sends the request and returns a Result.
    pub fn try_send(self) -> Result<TestResponse, TestError> {
        let request = self.builder.build()?;
        Ok(TestResponse::from(self.client.pipeline.respond(request)))
    }

    /// Sends the request without converting faults into responses.
    ///
    /// Use this to assert on the exact [`DispatchError`] a stage raised.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built.
    pub fn dispatch(self) -> Result<TestResponse, DispatchError> {
        let request = self.builder.build().expect("valid request");
        self.client.pipeline.handle(request).map(TestResponse::from)
    }
}

impl fmt::Debug for TestClientRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestClientRequest")
            .field("builder", &self.builder)
            .finish_non_exhaustive()
    }
}
