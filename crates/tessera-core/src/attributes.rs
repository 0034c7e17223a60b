//! Well-known request attribute names and the value types stored under them.
//!
//! The names are part of the public contract: error pages, loggers and
//! responders outside this workspace look attributes up by these strings.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// HTTP status code chosen for the response ([`http::StatusCode`]).
pub const STATUS_CODE: &str = "_status_code";

/// Validation messages or the execution failure ([`crate::Errors`]).
pub const ERRORS: &str = "_errors";

/// Severity assigned during error recovery ([`ErrorSeverity`]).
pub const ERROR_SEVERITY: &str = "_error_severity";

/// Lookup token of the responder that renders the response ([`Token`]).
pub const RESPONDER: &str = "_responder";

/// Lookup token of the validator registered by the action ([`Token`]).
pub const VALIDATOR: &str = "_validator";

/// Validated input handed to the action (JSON object).
pub const PAYLOAD: &str = "_payload";

/// Handler selected by the router for this request.
pub const REQUEST_HANDLER: &str = "_request_handler";

/// All attribute names reserved by the pipeline.
pub const RESERVED: [&str; 7] = [
    STATUS_CODE,
    ERRORS,
    ERROR_SEVERITY,
    RESPONDER,
    VALIDATOR,
    PAYLOAD,
    REQUEST_HANDLER,
];

/// Returns `true` if `name` is one of the pipeline's reserved attributes.
#[must_use]
pub fn is_reserved(name: &str) -> bool {
    RESERVED.contains(&name)
}

/// Severity an action assigns to a failure during error recovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Expected, caller-caused failure.
    Notice,
    /// Unusual but recoverable condition.
    Warning,
    /// Failure that needs attention.
    Error,
    /// Failure that leaves the service degraded.
    Critical,
}

impl ErrorSeverity {
    /// Returns the lowercase name of this severity.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Notice => "notice",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque key identifying a validator or responder in a [`crate::Container`].
///
/// Actions store tokens on the request instead of instances, so an action
/// definition carries no live dependencies and resolution happens at
/// dispatch time.
///
/// # Example
///
/// ```
/// use tessera_core::Token;
///
/// struct CreateUserValidator;
///
/// let by_name = Token::from("users.create.validator");
/// let by_type = Token::of::<CreateUserValidator>();
///
/// assert_eq!(by_name.as_str(), "users.create.validator");
/// assert!(by_type.as_str().ends_with("CreateUserValidator"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(Cow<'static, str>);

impl Token {
    /// Creates a token from any string.
    #[must_use]
    pub fn new(key: impl Into<Cow<'static, str>>) -> Self {
        Self(key.into())
    }

    /// Creates a token from the fully qualified name of `T`.
    #[must_use]
    pub fn of<T: ?Sized>() -> Self {
        Self(Cow::Borrowed(std::any::type_name::<T>()))
    }

    /// Returns the token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for Token {
    fn from(key: &'static str) -> Self {
        Self(Cow::Borrowed(key))
    }
}

impl From<String> for Token {
    fn from(key: String) -> Self {
        Self(Cow::Owned(key))
    }
}
