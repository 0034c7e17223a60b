//! Error aggregate and validation violations.
//!
//! An [`ErrorAggregate`] maps a property path to the messages filed under it.
//! Paths are field names, or [`REQUEST_PATH`] (`_`) for request-wide errors
//! such as missing required input.

use crate::ActionError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Property path for errors that concern the whole request.
pub const REQUEST_PATH: &str = "_";

/// A single failed check, filed under a property path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Property path the message belongs to.
    pub path: String,
    /// Human-readable message.
    pub message: String,
}

impl Violation {
    /// Creates a violation for `path`.
    #[must_use]
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// One or more violations reported together.
///
/// A single failure is the one-element case; batched checks report every
/// failure for a field at once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Violations(Vec<Violation>);

impl Violations {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Creates a list holding a single violation.
    #[must_use]
    pub fn single(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self(vec![Violation::new(path, message)])
    }

    /// Appends a violation.
    pub fn push(&mut self, violation: Violation) {
        self.0.push(violation);
    }

    /// Returns `true` if no violation was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of violations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates over the violations in the order they were recorded.
    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.0.iter()
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

impl From<Violation> for Violations {
    fn from(violation: Violation) -> Self {
        Self(vec![violation])
    }
}

impl FromIterator<Violation> for Violations {
    fn from_iter<I: IntoIterator<Item = Violation>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Violations {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Violations {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Ordered mapping from property path to messages.
///
/// Paths keep the order in which they first received a message, and messages
/// under a path keep insertion order. The aggregate is append-only: callers
/// build one per step and [`merge`](Self::merge) it into the running total.
///
/// # Example
///
/// ```
/// use tessera_core::{ErrorAggregate, REQUEST_PATH};
///
/// let mut errors = ErrorAggregate::new();
/// errors.push(REQUEST_PATH, "Required input for field 'email' is missing.");
/// errors.push("age", "Must be positive.");
///
/// assert_eq!(
///     serde_json::to_value(&errors).unwrap(),
///     serde_json::json!({
///         "_": ["Required input for field 'email' is missing."],
///         "age": ["Must be positive."]
///     })
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorAggregate(IndexMap<String, Vec<String>>);

impl ErrorAggregate {
    /// Creates an empty aggregate.
    #[must_use]
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Files `message` under `path`.
    pub fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.0.entry(path.into()).or_default().push(message.into());
    }

    /// Files every violation under its own path.
    pub fn extend_violations(&mut self, violations: Violations) {
        for violation in violations {
            self.push(violation.path, violation.message);
        }
    }

    /// Appends every message of `other`, keeping path order.
    pub fn merge(&mut self, other: ErrorAggregate) {
        for (path, messages) in other.0 {
            self.0.entry(path).or_default().extend(messages);
        }
    }

    /// Returns `true` if no message was filed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.values().all(Vec::is_empty)
    }

    /// Returns the number of paths with messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.values().filter(|m| !m.is_empty()).count()
    }

    /// Returns the total number of messages across all paths.
    #[must_use]
    pub fn message_count(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    /// Returns the messages filed under `path`.
    #[must_use]
    pub fn messages(&self, path: &str) -> &[String] {
        self.0.get(path).map_or(&[][..], Vec::as_slice)
    }

    /// Returns `true` if `path` has at least one message.
    #[must_use]
    pub fn contains_path(&self, path: &str) -> bool {
        !self.messages(path).is_empty()
    }

    /// Iterates over `(path, messages)` in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(p, m)| (p.as_str(), m.as_slice()))
    }
}

impl From<Violations> for ErrorAggregate {
    fn from(violations: Violations) -> Self {
        let mut errors = Self::new();
        errors.extend_violations(violations);
        errors
    }
}

/// Value of the `_errors` attribute.
///
/// Validation stores the collected [`ErrorAggregate`]; a failed action
/// execution stores the [`ActionError`] that caused it.
#[derive(Debug, Clone)]
pub enum Errors {
    /// Messages collected while validating input.
    Fields(ErrorAggregate),
    /// The failure raised by the action.
    Failure(Arc<ActionError>),
}

impl Errors {
    /// Returns `true` when there is nothing to report.
    ///
    /// A stored failure is never empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Fields(errors) => errors.is_empty(),
            Self::Failure(_) => false,
        }
    }

    /// Returns the field aggregate, if this holds validation messages.
    #[must_use]
    pub fn fields(&self) -> Option<&ErrorAggregate> {
        match self {
            Self::Fields(errors) => Some(errors),
            Self::Failure(_) => None,
        }
    }

    /// Returns the action failure, if this holds one.
    #[must_use]
    pub fn failure(&self) -> Option<&Arc<ActionError>> {
        match self {
            Self::Fields(_) => None,
            Self::Failure(error) => Some(error),
        }
    }
}

impl From<ErrorAggregate> for Errors {
    fn from(errors: ErrorAggregate) -> Self {
        Self::Fields(errors)
    }
}
