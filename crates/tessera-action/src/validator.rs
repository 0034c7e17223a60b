//! Field validation.
//!
//! A [`Validator`] turns a request into a request carrying either a
//! validated payload or an error aggregate. The stock implementation,
//! [`FieldValidator`], is driven by a [`FieldRules`] registry that maps each
//! field to a rule function.
//!
//! Rules are keyed by the rule name derived from the field:
//! `validate` + the upper-camel-cased field name, so `user_id` is checked by
//! `validateUserId`. Registering by field name computes the key, and
//! [`FieldRules::ensure_covers`] reports a missing rule before the service
//! takes traffic.

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tessera_core::{ErrorAggregate, Errors, ServerRequest, Violation, Violations, REQUEST_PATH};
use tessera_extract::FieldExtractor;
use tessera_middleware::DispatchError;

/// Validates a request.
///
/// Validators are shared across concurrent requests and keep no
/// per-request state.
pub trait Validator: Send + Sync + 'static {
    /// Returns the request with its payload or errors attribute set.
    ///
    /// # Errors
    ///
    /// Returns a [`DispatchError`] for configuration faults and unreadable
    /// input. Invalid field values are reported through the errors
    /// attribute instead.
    fn validate(&self, request: ServerRequest) -> Result<ServerRequest, DispatchError>;
}

/// A per-field rule.
///
/// Receives the field name, its value and the errors collected so far. Returns
/// the value to store in the payload (possibly transformed) or the violations
/// found.
pub type FieldRule = Arc<dyn Fn(&str, &Value, &ErrorAggregate) -> Result<Value, Violations> + Send + Sync>;

/// Converts a field name to UpperCamelCase.
///
/// `-`, `_` and whitespace separate words and are dropped; the character
/// after a separator or after a run of digits is upper-cased, as is the first
/// character. Other characters keep their case.
///
/// ```
/// use tessera_action::upper_camelize;
///
/// assert_eq!(upper_camelize("user_id"), "UserId");
/// assert_eq!(upper_camelize("first-name"), "FirstName");
/// assert_eq!(upper_camelize("address2line"), "Address2Line");
/// ```
#[must_use]
pub fn upper_camelize(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper_next = true;

    for c in field.trim().chars() {
        if c == '-' || c == '_' || c.is_whitespace() {
            upper_next = true;
        } else if c.is_ascii_digit() {
            out.push(c);
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }

    out
}

/// Returns the rule name for `field`, e.g. `validateUserId` for `user_id`.
#[must_use]
pub fn rule_name(field: &str) -> String {
    format!("validate{}", upper_camelize(field))
}

/// Outcome of validating a set of fields.
///
/// `values` holds every field whose rule accepted it; `errors` holds the
/// messages produced by this step only. Callers merge results and decide
/// what to do with them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Validated {
    /// Accepted (and possibly transformed) values, in field order.
    pub values: Map<String, Value>,
    /// Messages produced while validating.
    pub errors: ErrorAggregate,
}

impl Validated {
    /// Creates an empty result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if no error was produced.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Folds `other` into this result.
    pub fn merge(&mut self, other: Validated) {
        self.values.extend(other.values);
        self.errors.merge(other.errors);
    }

    /// Stores the result on `request`.
    ///
    /// With errors, they are merged into the request's field errors and the
    /// payload is left alone. Without errors, the values become the payload.
    #[must_use]
    pub fn apply(self, request: ServerRequest) -> ServerRequest {
        if self.errors.is_empty() {
            return request.with_payload(self.values);
        }

        let mut errors = match request.errors() {
            Some(Errors::Fields(existing)) => existing.clone(),
            _ => ErrorAggregate::new(),
        };
        errors.merge(self.errors);
        request.with_errors(errors)
    }
}

/// Copies the requested fields out of `input`.
///
/// A field counts as present when it exists and is not `null`. A missing
/// required field files `Required input for field '<name>' is missing.`
/// under `_`; a missing optional field is skipped.
///
/// # Errors
///
/// Returns [`DispatchError::InvalidFieldName`] for an empty field name.
pub fn get_fields(
    input: &Map<String, Value>,
    fields: &[&str],
    required: bool,
) -> Result<Validated, DispatchError> {
    let mut result = Validated::new();
    for &field in fields {
        if field.is_empty() {
            return Err(DispatchError::InvalidFieldName);
        }
        match input.get(field) {
            Some(value) if !value.is_null() => {
                result.values.insert(field.to_string(), value.clone());
            }
            _ if required => {
                result.errors.push(
                    REQUEST_PATH,
                    format!("Required input for field '{field}' is missing."),
                );
            }
            _ => {}
        }
    }
    Ok(result)
}

/// Registry of per-field rules.
///
/// # Example
///
/// ```
/// use tessera_action::FieldRules;
/// use tessera_core::{ErrorAggregate, Violations};
/// use serde_json::{json, Map, Value};
///
/// let rules = FieldRules::new().rule("email", |name, value, _errors| {
///     match value.as_str() {
///         Some(s) if s.contains('@') => Ok(Value::String(s.to_lowercase())),
///         _ => Err(Violations::single(name, "Invalid email format.")),
///     }
/// });
///
/// let mut input = Map::new();
/// input.insert("email".into(), json!("USER@X.COM"));
///
/// let result = rules.validate_input(&input, &["email"], &ErrorAggregate::new()).unwrap();
/// assert_eq!(result.values["email"], "user@x.com");
/// ```
#[derive(Clone, Default)]
pub struct FieldRules {
    rules: HashMap<String, FieldRule>,
    extractor: FieldExtractor,
}

impl FieldRules {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the extractor used to read request input.
    #[must_use]
    pub fn with_extractor(mut self, extractor: FieldExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Registers the rule for `field`.
    #[must_use]
    pub fn rule<F>(mut self, field: &str, rule: F) -> Self
    where
        F: Fn(&str, &Value, &ErrorAggregate) -> Result<Value, Violations> + Send + Sync + 'static,
    {
        self.insert(field, rule);
        self
    }

    /// Registers the rule for `field`, replacing any previous one.
    pub fn insert<F>(&mut self, field: &str, rule: F)
    where
        F: Fn(&str, &Value, &ErrorAggregate) -> Result<Value, Violations> + Send + Sync + 'static,
    {
        self.rules.insert(rule_name(field), Arc::new(rule));
    }

    /// Returns `true` if a rule is registered for `field`.
    #[must_use]
    pub fn covers(&self, field: &str) -> bool {
        self.rules.contains_key(&rule_name(field))
    }

    /// Returns the number of registered rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if no rule is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Checks that every field in `fields` has a rule.
    ///
    /// # Errors
    ///
    /// Returns the first [`DispatchError::InvalidFieldName`] or
    /// [`DispatchError::MissingValidationCallback`] found.
    pub fn ensure_covers(&self, fields: &[&str]) -> Result<(), DispatchError> {
        for &field in fields {
            if field.is_empty() {
                return Err(DispatchError::InvalidFieldName);
            }
            let method = rule_name(field);
            if !self.rules.contains_key(&method) {
                return Err(DispatchError::MissingValidationCallback { method });
            }
        }
        Ok(())
    }

    /// Validates `fields` read from the request input.
    ///
    /// Input is assembled by the configured [`FieldExtractor`]: body over
    /// query string, strings trimmed.
    ///
    /// # Errors
    ///
    /// Returns a [`DispatchError`] for unreadable input, an empty field
    /// name or a field without a rule.
    pub fn validate_fields(
        &self,
        fields: &[&str],
        request: &ServerRequest,
        errors: &ErrorAggregate,
    ) -> Result<Validated, DispatchError> {
        let input = self.extractor.extract(request)?;
        self.validate_input(&input, fields, errors)
    }

    /// Validates `fields` read from the request's data attributes.
    ///
    /// Used for values produced earlier in the pipeline, such as route
    /// parameters, rather than client-submitted input.
    ///
    /// # Errors
    ///
    /// Returns a [`DispatchError`] for an empty field name or a field
    /// without a rule.
    pub fn validate_attributes(
        &self,
        fields: &[&str],
        request: &ServerRequest,
        errors: &ErrorAggregate,
    ) -> Result<Validated, DispatchError> {
        self.validate_input(&request.data_attributes(), fields, errors)
    }

    /// Validates `fields` read from `input`.
    ///
    /// Rules see `errors` plus everything filed earlier in this call.
    ///
    /// # Errors
    ///
    /// Returns a [`DispatchError`] for an empty field name or a field
    /// without a rule.
    pub fn validate_input(
        &self,
        input: &Map<String, Value>,
        fields: &[&str],
        errors: &ErrorAggregate,
    ) -> Result<Validated, DispatchError> {
        let mut result = get_fields(input, fields, true)?;
        let present = std::mem::take(&mut result.values);

        let mut seen = errors.clone();
        seen.merge(result.errors.clone());

        for (name, value) in present {
            let method = rule_name(&name);
            let rule = self
                .rules
                .get(&method)
                .ok_or_else(|| DispatchError::MissingValidationCallback { method })?;

            match rule(&name, &value, &seen) {
                Ok(output) => {
                    result.values.insert(name, output);
                }
                Err(violations) => {
                    tracing::debug!(field = %name, count = violations.len(), "field rejected");
                    seen.extend_violations(violations.clone());
                    result.errors.extend_violations(violations);
                }
            }
        }

        Ok(result)
    }
}

impl fmt::Debug for FieldRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.rules.keys().collect();
        names.sort();
        f.debug_struct("FieldRules")
            .field("rules", &names)
            .field("extractor", &self.extractor)
            .finish()
    }
}

/// Validator that checks attribute fields and input fields against a
/// [`FieldRules`] registry.
///
/// # Example
///
/// ```
/// use tessera_action::{FieldRules, FieldValidator};
///
/// let rules = FieldRules::new()
///     .rule("user_id", |_, value, _| Ok(value.clone()))
///     .rule("email", |_, value, _| Ok(value.clone()));
///
/// let validator = FieldValidator::new(rules)
///     .attributes(["user_id"])
///     .fields(["email"])
///     .checked()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct FieldValidator {
    rules: FieldRules,
    attributes: Vec<String>,
    fields: Vec<String>,
}

impl FieldValidator {
    /// Creates a validator that checks nothing until fields are added.
    #[must_use]
    pub fn new(rules: FieldRules) -> Self {
        Self {
            rules,
            attributes: Vec::new(),
            fields: Vec::new(),
        }
    }

    /// Adds fields read from the request input.
    #[must_use]
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Adds fields read from request attributes.
    #[must_use]
    pub fn attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes.extend(attributes.into_iter().map(Into::into));
        self
    }

    /// Fails if any declared field lacks a rule.
    ///
    /// # Errors
    ///
    /// See [`FieldRules::ensure_covers`].
    pub fn checked(self) -> Result<Self, DispatchError> {
        self.rules.ensure_covers(&as_strs(&self.attributes))?;
        self.rules.ensure_covers(&as_strs(&self.fields))?;
        Ok(self)
    }
}

impl Validator for FieldValidator {
    fn validate(&self, request: ServerRequest) -> Result<ServerRequest, DispatchError> {
        let mut result =
            self.rules
                .validate_attributes(&as_strs(&self.attributes), &request, &ErrorAggregate::new())?;
        let fields = self
            .rules
            .validate_fields(&as_strs(&self.fields), &request, &result.errors)?;
        result.merge(fields);
        Ok(result.apply(request))
    }
}

fn as_strs(names: &[String]) -> Vec<&str> {
    names.iter().map(String::as_str).collect()
}

/// Runs several checks and reports every failure at once.
///
/// # Example
///
/// ```
/// use tessera_action::LazyAssertion;
///
/// let password = "abc";
/// let err = LazyAssertion::new()
///     .that("password", password.len() >= 8, "Must be at least 8 characters.")
///     .that("password", password.chars().any(|c| c.is_ascii_digit()), "Must contain a digit.")
///     .verify_now()
///     .unwrap_err();
///
/// assert_eq!(err.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct LazyAssertion {
    violations: Violations,
}

impl LazyAssertion {
    /// Creates an assertion with no checks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `message` under `path` unless `condition` holds.
    #[must_use]
    pub fn that(mut self, path: &str, condition: bool, message: impl Into<String>) -> Self {
        if !condition {
            self.violations.push(Violation::new(path, message));
        }
        self
    }

    /// Returns every recorded failure, or `Ok` if all checks passed.
    ///
    /// # Errors
    ///
    /// Returns the collected [`Violations`] when any check failed.
    pub fn verify_now(self) -> Result<(), Violations> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(self.violations)
        }
    }
}
