//! Error normalization middleware.
//!
//! Turns a [`DispatchError`] propagated by a later stage into the standard
//! error envelope:
//!
//! ```json
//! {
//!   "error": {
//!     "code": "CONFIGURATION_ERROR",
//!     "message": "An internal error occurred",
//!     "request_id": "01890a5d-ac96-774b-bcce-b302099a8057"
//!   }
//! }
//! ```
//!
//! Server-side faults hide their message unless internal errors are exposed.
//! Responses produced without a fault pass through untouched.

use crate::error::DispatchError;
use crate::middleware::{Middleware, Next};
use tessera_core::{RequestId, Response, ResponseExt, ServerRequest};

/// Message used for server-side faults when details are hidden.
pub const DEFAULT_INTERNAL_ERROR_MESSAGE: &str = "An internal error occurred";

/// Error normalization middleware that ensures consistent error responses.
#[derive(Debug, Clone)]
pub struct ErrorNormalizationMiddleware {
    /// Whether to expose internal error details (development mode).
    expose_internal_errors: bool,
    /// Default error message for internal errors.
    internal_error_message: String,
}

impl Default for ErrorNormalizationMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorNormalizationMiddleware {
    /// Creates a new error normalization middleware with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            expose_internal_errors: false,
            internal_error_message: DEFAULT_INTERNAL_ERROR_MESSAGE.to_string(),
        }
    }

    /// Sets whether to expose internal error details.
    ///
    /// **Warning**: Only enable this in development environments.
    #[must_use]
    pub fn expose_internal_errors(mut self, expose: bool) -> Self {
        self.expose_internal_errors = expose;
        self
    }

    /// Sets the default message for internal errors.
    #[must_use]
    pub fn internal_error_message(mut self, message: &str) -> Self {
        self.internal_error_message = message.to_string();
        self
    }

    /// Renders `error` as an error envelope and logs it.
    pub fn normalize(&self, error: &DispatchError, request_id: RequestId) -> Response {
        let status = error.status_code();
        let code = error.error_code();

        if status.is_server_error() {
            tracing::error!(
                request_id = %request_id,
                error = %error,
                error.code = code,
                http.status_code = status.as_u16(),
                "dispatch failed"
            );
        } else {
            tracing::warn!(
                request_id = %request_id,
                error = %error,
                error.code = code,
                http.status_code = status.as_u16(),
                "request rejected"
            );
        }

        let message = if status.is_server_error() && !self.expose_internal_errors {
            self.internal_error_message.clone()
        } else {
            error.to_string()
        };

        Response::json_error(status, code, &message, Some(&request_id.to_string()))
    }
}

impl Middleware for ErrorNormalizationMiddleware {
    fn name(&self) -> &'static str {
        "error_normalization"
    }

    fn process(&self, request: ServerRequest, next: Next<'_>) -> Result<Response, DispatchError> {
        let request_id = request.request_id();
        Ok(next
            .run(request)
            .unwrap_or_else(|error| self.normalize(&error, request_id)))
    }
}

// ============================================================================
// Tests
// ============================================================================
