//! Faults that abort dispatch.
//!
//! A [`DispatchError`] is never routed through an action's error recovery.
//! It propagates out of the pipeline, where
//! [`ErrorNormalizationMiddleware`](crate::stages::ErrorNormalizationMiddleware)
//! or [`Pipeline::respond`](crate::Pipeline::respond) turns it into an error
//! envelope.

use http::StatusCode;
use std::sync::Arc;
use tessera_core::{ActionError, LookupError};
use tessera_extract::ExtractionError;
use thiserror::Error;

/// A configuration or programmer fault raised while dispatching a request.
#[derive(Debug, Clone, Error)]
pub enum DispatchError {
    /// A validator was asked for an empty field name.
    #[error("Input field name must be a valid string.")]
    InvalidFieldName,

    /// No rule is registered for a validated field.
    #[error("Missing required validation callback: {method}")]
    MissingValidationCallback {
        /// Rule name derived from the field, e.g. `validateUserId`.
        method: String,
    },

    /// A validator or responder token could not be resolved.
    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// The action left no responder token and nothing failed before.
    #[error("Unable to determine responder for '{action}'.")]
    MissingResponder {
        /// Name of the action.
        action: String,
    },

    /// An action failure re-raised because no responder could render it.
    #[error(transparent)]
    Action(Arc<ActionError>),

    /// The request input could not be assembled.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}

impl DispatchError {
    /// Returns the HTTP status code used when this fault is rendered.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Extraction(e) => e.status_code(),
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error code suitable for error envelopes.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidFieldName
            | Self::MissingValidationCallback { .. }
            | Self::MissingResponder { .. } => "CONFIGURATION_ERROR",
            Self::Lookup(_) => "LOOKUP_FAILED",
            Self::Action(_) => "INTERNAL_ERROR",
            Self::Extraction(e) => e.error_code(),
        }
    }

    /// Returns `true` if the fault is caused by the request rather than
    /// the service.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

impl From<Arc<ActionError>> for DispatchError {
    fn from(error: Arc<ActionError>) -> Self {
        Self::Action(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::Token;
    use tessera_extract::ExtractionSource;

    #[test]
    fn test_configuration_messages() {
        assert_eq!(
            DispatchError::InvalidFieldName.to_string(),
            "Input field name must be a valid string."
        );
        assert_eq!(
            DispatchError::MissingValidationCallback {
                method: "validateEmail".to_string()
            }
            .to_string(),
            "Missing required validation callback: validateEmail"
        );
        assert_eq!(
            DispatchError::MissingResponder {
                action: "CreateUser".to_string()
            }
            .to_string(),
            "Unable to determine responder for 'CreateUser'."
        );
    }

    #[test]
    fn test_status_codes() {
        let lookup = DispatchError::from(LookupError::NotRegistered {
            token: Token::from("json"),
        });
        assert_eq!(lookup.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(lookup.error_code(), "LOOKUP_FAILED");

        let parse = DispatchError::from(ExtractionError::deserialization_failed(
            ExtractionSource::Body,
            "eof",
        ));
        assert_eq!(parse.status_code(), StatusCode::BAD_REQUEST);
        assert!(parse.is_client_error());

        let too_large = DispatchError::from(ExtractionError::payload_too_large(1, 2));
        assert_eq!(too_large.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn test_reraised_action_error_is_transparent() {
        let cause = Arc::new(ActionError::unexpected(io_failure()));
        let err = DispatchError::from(Arc::clone(&cause));
        assert_eq!(err.to_string(), "database unavailable");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(matches!(err, DispatchError::Action(ref e) if Arc::ptr_eq(e, &cause)));
    }

    fn io_failure() -> std::io::Error {
        std::io::Error::other("database unavailable")
    }
}
