//! Failures raised by actions.
//!
//! The action handler classifies an [`ActionError`] into a response status:
//!
//! | Variant | Status | Logged |
//! |---------|--------|--------|
//! | `AssertionFailed` | 422 Unprocessable Entity | no |
//! | `Unexpected` | 500 Internal Server Error | yes, with backtrace |

use crate::{Violation, Violations};
use http::StatusCode;
use std::backtrace::BacktraceStatus;
use thiserror::Error;

/// Error returned from an action's `invoke`.
///
/// # Example
///
/// ```
/// use tessera_core::ActionError;
/// use http::StatusCode;
///
/// let declined = ActionError::assertion("amount", "Amount exceeds the daily limit.");
/// assert!(declined.is_assertion());
/// assert_eq!(declined.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
///
/// let broken = ActionError::unexpected(std::io::Error::other("disk full"));
/// assert_eq!(broken.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
/// ```
#[derive(Debug, Error)]
pub enum ActionError {
    /// A declared business rule rejected the request. Caller-caused.
    #[error("assertion failed: {0}")]
    AssertionFailed(Violations),

    /// Any other failure. Treated as a system fault.
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl ActionError {
    /// Creates an assertion failure with a single violation.
    #[must_use]
    pub fn assertion(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::AssertionFailed(Violations::from(Violation::new(path, message)))
    }

    /// Wraps any error as an unexpected failure.
    pub fn unexpected(error: impl Into<anyhow::Error>) -> Self {
        Self::Unexpected(error.into())
    }

    /// Returns `true` for declared assertion failures.
    #[must_use]
    pub const fn is_assertion(&self) -> bool {
        matches!(self, Self::AssertionFailed(_))
    }

    /// Returns the violations of an assertion failure.
    #[must_use]
    pub const fn violations(&self) -> Option<&Violations> {
        match self {
            Self::AssertionFailed(violations) => Some(violations),
            Self::Unexpected(_) => None,
        }
    }

    /// Returns the status code the pipeline assigns to this failure.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::AssertionFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Renders the captured backtrace of an unexpected failure.
    ///
    /// Returns `None` for assertion failures and when capture is disabled
    /// (see `RUST_BACKTRACE` / `RUST_LIB_BACKTRACE`).
    #[must_use]
    pub fn backtrace(&self) -> Option<String> {
        match self {
            Self::AssertionFailed(_) => None,
            Self::Unexpected(error) => {
                let backtrace = error.backtrace();
                (backtrace.status() == BacktraceStatus::Captured).then(|| backtrace.to_string())
            }
        }
    }
}

impl From<Violations> for ActionError {
    fn from(violations: Violations) -> Self {
        Self::AssertionFailed(violations)
    }
}
