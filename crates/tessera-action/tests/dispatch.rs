//! Full dispatch through the pipeline: validation, execution, recovery and
//! rendering.

use http::StatusCode;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tessera_action::{
    Action, ActionHandler, FieldRules, FieldValidator, JsonResponder, LazyAssertion, Responder,
    Validator,
};
use tessera_core::{
    attributes, ActionError, Container, ErrorAggregate, ErrorSeverity, LookupError, ServerRequest,
    Token, Violations,
};
use tessera_middleware::stages::{ErrorNormalizationMiddleware, RequestIdMiddleware};
use tessera_middleware::{DispatchError, Pipeline};
use tessera_test::{RecordingLogger, TestClient};

const SIGNUP_VALIDATOR: &str = "signup.validator";
const JSON: &str = "json";

#[derive(Debug, Clone, Copy)]
enum Outcome {
    Created,
    Declined,
    Fault,
}

struct SignUp {
    outcome: Outcome,
    responder: Option<&'static str>,
    invocations: AtomicUsize,
}

impl SignUp {
    fn new(outcome: Outcome) -> Arc<Self> {
        Self::rendered_by(outcome, Some(JSON))
    }

    fn rendered_by(outcome: Outcome, responder: Option<&'static str>) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            responder,
            invocations: AtomicUsize::new(0),
        })
    }

    fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }

    fn respond(&self, request: ServerRequest) -> ServerRequest {
        match self.responder {
            Some(token) => request.with_responder(token),
            None => request,
        }
    }
}

impl Action for SignUp {
    fn register_validator(&self, request: ServerRequest) -> ServerRequest {
        request.with_validator(SIGNUP_VALIDATOR)
    }

    fn invoke(&self, request: ServerRequest) -> Result<ServerRequest, ActionError> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        match self.outcome {
            Outcome::Created => Ok(self.respond(request.with_status_code(StatusCode::CREATED))),
            Outcome::Declined => Err(ActionError::assertion("email", "Email is already registered.")),
            Outcome::Fault => Err(ActionError::unexpected(anyhow::anyhow!("user store unavailable"))),
        }
    }

    fn handle_error(&self, request: ServerRequest) -> ServerRequest {
        let severity = if request.status_code().is_some_and(|s| s.is_server_error()) {
            ErrorSeverity::Critical
        } else {
            ErrorSeverity::Notice
        };
        self.respond(request.with_error_severity(severity))
    }

    fn name(&self) -> &str {
        "SignUp"
    }
}

fn validate_email(field: &str, value: &Value, _errors: &ErrorAggregate) -> Result<Value, Violations> {
    let email = value.as_str().unwrap_or_default();
    LazyAssertion::new()
        .that(field, email.contains('@'), "Must be a valid email address.")
        .that(field, email.len() <= 32, "Must be at most 32 characters.")
        .verify_now()?;
    Ok(Value::String(email.to_lowercase()))
}

fn signup_validator() -> FieldValidator {
    FieldValidator::new(FieldRules::new().rule("email", validate_email)).fields(["email"])
}

fn container_with(validator: impl Validator) -> Container {
    let mut container = Container::new();
    container.register::<dyn Validator>(SIGNUP_VALIDATOR, Arc::new(validator));
    container.register::<dyn Responder>(JSON, Arc::new(JsonResponder::new()));
    container
}

fn client(container: Container, logger: &RecordingLogger) -> TestClient {
    TestClient::new(
        Pipeline::builder()
            .stage(RequestIdMiddleware::new())
            .stage(ErrorNormalizationMiddleware::new())
            .stage(ActionHandler::with_logger(
                Arc::new(container),
                Arc::new(logger.clone()),
            ))
            .build(),
    )
}

// No normalization stage, so fatal faults reach the caller.
fn raw_client(container: Container, logger: &RecordingLogger) -> TestClient {
    TestClient::new(
        Pipeline::builder()
            .stage(ActionHandler::with_logger(
                Arc::new(container),
                Arc::new(logger.clone()),
            ))
            .build(),
    )
}

fn routed(action: &Arc<SignUp>) -> Arc<dyn Action> {
    Arc::clone(action) as Arc<dyn Action>
}

#[test]
fn test_missing_required_field_is_422_and_skips_invoke() {
    let logger = RecordingLogger::new();
    let action = SignUp::new(Outcome::Created);

    client(container_with(signup_validator()), &logger)
        .post("/signup")
        .json(&json!({"name": "Ada"}))
        .attribute(attributes::REQUEST_HANDLER, routed(&action))
        .send()
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY)
        .assert_json_eq(&json!({"_": ["Required input for field 'email' is missing."]}));

    assert_eq!(action.invocations(), 0);
    assert_eq!(logger.count(), 0);
}

#[test]
fn test_valid_input_invokes_once_with_transformed_value() {
    let logger = RecordingLogger::new();
    let action = SignUp::new(Outcome::Created);

    client(container_with(signup_validator()), &logger)
        .post("/signup")
        .json(&json!({"email": "  USER@X.COM "}))
        .attribute(attributes::REQUEST_HANDLER, routed(&action))
        .send()
        .assert_status(StatusCode::CREATED)
        .assert_json_eq(&json!({"email": "user@x.com"}));

    assert_eq!(action.invocations(), 1);
}

#[test]
fn test_query_parameters_feed_validation() {
    let action = SignUp::new(Outcome::Created);

    client(container_with(signup_validator()), &RecordingLogger::new())
        .get("/signup?email=Ada@Example.com")
        .attribute(attributes::REQUEST_HANDLER, routed(&action))
        .send()
        .assert_status(StatusCode::CREATED)
        .assert_json_field("email", &json!("ada@example.com"));
}

#[test]
fn test_batched_rule_failures_are_all_reported() {
    let action = SignUp::new(Outcome::Created);

    client(container_with(signup_validator()), &RecordingLogger::new())
        .post("/signup")
        .form(&[("email", "a-very-long-address-without-an-at-sign")])
        .attribute(attributes::REQUEST_HANDLER, routed(&action))
        .send()
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY)
        .assert_json_eq(&json!({
            "email": [
                "Must be a valid email address.",
                "Must be at most 32 characters."
            ]
        }));

    assert_eq!(action.invocations(), 0);
}

#[test]
fn test_unclassified_fault_is_logged_once_and_rendered_as_500() {
    let logger = RecordingLogger::new();
    let action = SignUp::new(Outcome::Fault);

    client(container_with(signup_validator()), &logger)
        .post("/signup")
        .json(&json!({"email": "ada@example.com"}))
        .attribute(attributes::REQUEST_HANDLER, routed(&action))
        .send()
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR)
        .assert_json_eq(&json!({"_": ["An internal error occurred"]}));

    assert_eq!(logger.count(), 1);
    let entry = &logger.entries()[0];
    assert_eq!(entry.message, "user store unavailable");
    assert_eq!(entry.context.action.as_deref(), Some("SignUp"));
    assert!(entry.context.request_id.is_some());
    // Present only when backtrace capture is enabled for the test run.
    if let Some(trace) = &entry.context.trace {
        assert!(!trace.is_empty());
        assert!(!trace.contains("disabled backtrace"));
    }
}

#[test]
fn test_assertion_failure_is_422_and_not_logged() {
    let logger = RecordingLogger::new();
    let action = SignUp::new(Outcome::Declined);

    client(container_with(signup_validator()), &logger)
        .post("/signup")
        .json(&json!({"email": "ada@example.com"}))
        .attribute(attributes::REQUEST_HANDLER, routed(&action))
        .send()
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY)
        .assert_json_eq(&json!({"email": ["Email is already registered."]}));

    assert_eq!(action.invocations(), 1);
    assert_eq!(logger.count(), 0);
}

#[test]
fn test_validator_status_is_kept() {
    struct Throttled;

    impl Validator for Throttled {
        fn validate(&self, request: ServerRequest) -> Result<ServerRequest, DispatchError> {
            let mut errors = ErrorAggregate::new();
            errors.push("_", "Too many attempts.");
            Ok(request
                .with_status_code(StatusCode::TOO_MANY_REQUESTS)
                .with_errors(errors))
        }
    }

    let action = SignUp::new(Outcome::Created);
    client(container_with(Throttled), &RecordingLogger::new())
        .post("/signup")
        .attribute(attributes::REQUEST_HANDLER, routed(&action))
        .send()
        .assert_status(StatusCode::TOO_MANY_REQUESTS)
        .assert_json_eq(&json!({"_": ["Too many attempts."]}));

    assert_eq!(action.invocations(), 0);
}

#[test]
fn test_aggregate_stored_by_attribute_name_skips_invoke() {
    struct Blocklist;

    impl Validator for Blocklist {
        fn validate(&self, request: ServerRequest) -> Result<ServerRequest, DispatchError> {
            let mut errors = ErrorAggregate::new();
            errors.push("_", "bad");
            Ok(request.with_attribute(attributes::ERRORS, errors))
        }
    }

    let logger = RecordingLogger::new();
    let action = SignUp::new(Outcome::Created);
    client(container_with(Blocklist), &logger)
        .post("/signup")
        .json(&json!({"email": "ada@example.com"}))
        .attribute(attributes::REQUEST_HANDLER, routed(&action))
        .send()
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY)
        .assert_json_eq(&json!({"_": ["bad"]}));

    assert_eq!(action.invocations(), 0);
    assert_eq!(logger.count(), 0);
}

#[test]
fn test_route_attributes_are_validated() {
    struct ShowUser;

    impl Action for ShowUser {
        fn register_validator(&self, request: ServerRequest) -> ServerRequest {
            request.with_validator("show_user.validator")
        }

        fn invoke(&self, request: ServerRequest) -> Result<ServerRequest, ActionError> {
            Ok(request.with_responder(JSON))
        }

        fn handle_error(&self, request: ServerRequest) -> ServerRequest {
            request.with_responder(JSON)
        }
    }

    let rules = FieldRules::new().rule("user_id", |field, value, _errors| {
        value
            .as_str()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Value::from)
            .ok_or_else(|| Violations::single(field, "Must be a positive integer."))
    });

    let mut container = Container::new();
    container.register::<dyn Validator>(
        "show_user.validator",
        Arc::new(FieldValidator::new(rules).attributes(["user_id"])),
    );
    container.register::<dyn Responder>(JSON, Arc::new(JsonResponder::new()));
    let client = client(container, &RecordingLogger::new());

    let show = Arc::new(ShowUser) as Arc<dyn Action>;
    client
        .get("/users/42")
        .attribute("user_id", "42".to_string())
        .attribute(attributes::REQUEST_HANDLER, Arc::clone(&show))
        .send()
        .assert_status(StatusCode::OK)
        .assert_json_eq(&json!({"user_id": 42}));

    client
        .get("/users/abc")
        .attribute("user_id", "abc".to_string())
        .attribute(attributes::REQUEST_HANDLER, show)
        .send()
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY)
        .assert_json_eq(&json!({"user_id": ["Must be a positive integer."]}));
}

#[test]
fn test_non_action_handler_is_delegated() {
    let action_calls = SignUp::new(Outcome::Created);

    client(container_with(signup_validator()), &RecordingLogger::new())
        .get("/about")
        .attribute(attributes::REQUEST_HANDLER, "StaticPage".to_string())
        .send()
        .assert_status(StatusCode::NOT_FOUND);

    assert_eq!(action_calls.invocations(), 0);
}

#[test]
fn test_missing_responder_names_the_action() {
    let action = SignUp::rendered_by(Outcome::Created, None);

    let result = raw_client(container_with(signup_validator()), &RecordingLogger::new())
        .post("/signup")
        .json(&json!({"email": "ada@example.com"}))
        .attribute(attributes::REQUEST_HANDLER, routed(&action))
        .dispatch();

    let err = result.unwrap_err();
    assert!(matches!(&err, DispatchError::MissingResponder { action } if action == "SignUp"));
    assert_eq!(err.to_string(), "Unable to determine responder for 'SignUp'.");
}

#[test]
fn test_missing_responder_reraises_the_cause() {
    let logger = RecordingLogger::new();
    let action = SignUp::rendered_by(Outcome::Fault, None);

    let result = raw_client(container_with(signup_validator()), &logger)
        .post("/signup")
        .json(&json!({"email": "ada@example.com"}))
        .attribute(attributes::REQUEST_HANDLER, routed(&action))
        .dispatch();

    match result {
        Err(DispatchError::Action(cause)) => {
            assert!(!cause.is_assertion());
            assert_eq!(cause.to_string(), "user store unavailable");
        }
        other => panic!("expected the action failure, got {other:?}"),
    }
    // Logged before the responder was looked up.
    assert_eq!(logger.count(), 1);
}

#[test]
fn test_unresolvable_responder_reraises_the_cause() {
    let action = SignUp::rendered_by(Outcome::Declined, Some("xml"));

    let result = raw_client(container_with(signup_validator()), &RecordingLogger::new())
        .post("/signup")
        .json(&json!({"email": "ada@example.com"}))
        .attribute(attributes::REQUEST_HANDLER, routed(&action))
        .dispatch();

    assert!(matches!(result, Err(DispatchError::Action(cause)) if cause.is_assertion()));
}

#[test]
fn test_unresolvable_responder_without_cause_is_lookup_error() {
    let action = SignUp::rendered_by(Outcome::Created, Some("xml"));

    let result = raw_client(container_with(signup_validator()), &RecordingLogger::new())
        .post("/signup")
        .json(&json!({"email": "ada@example.com"}))
        .attribute(attributes::REQUEST_HANDLER, routed(&action))
        .dispatch();

    match result {
        Err(DispatchError::Lookup(LookupError::NotRegistered { token })) => {
            assert_eq!(token, Token::from("xml"));
        }
        other => panic!("expected a lookup failure, got {other:?}"),
    }
}

#[test]
fn test_validator_capability_is_enforced() {
    let mut container = Container::new();
    // Registered under the wrong capability.
    container.register::<dyn Responder>(SIGNUP_VALIDATOR, Arc::new(JsonResponder::new()));
    container.register::<dyn Responder>(JSON, Arc::new(JsonResponder::new()));
    let action = SignUp::new(Outcome::Created);

    let result = raw_client(container, &RecordingLogger::new())
        .post("/signup")
        .json(&json!({"email": "ada@example.com"}))
        .attribute(attributes::REQUEST_HANDLER, routed(&action))
        .dispatch();

    assert!(matches!(
        result,
        Err(DispatchError::Lookup(LookupError::CapabilityMismatch { .. }))
    ));
    assert_eq!(action.invocations(), 0);
}

#[test]
fn test_missing_validation_rule_is_fatal() {
    let validator = FieldValidator::new(FieldRules::new().rule("email", validate_email))
        .fields(["email", "display_name"]);
    let action = SignUp::new(Outcome::Created);

    let client = client(container_with(validator), &RecordingLogger::new());
    client
        .post("/signup")
        .json(&json!({"email": "ada@example.com", "display_name": "Ada"}))
        .attribute(attributes::REQUEST_HANDLER, routed(&action))
        .send()
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR)
        .assert_json_field("error.code", &json!("CONFIGURATION_ERROR"));

    assert_eq!(action.invocations(), 0);
}

#[test]
fn test_malformed_body_is_400_envelope() {
    let action = SignUp::new(Outcome::Created);

    let response = client(container_with(signup_validator()), &RecordingLogger::new())
        .post("/signup")
        .content_type("application/json")
        .body("{\"email\":")
        .attribute(attributes::REQUEST_HANDLER, routed(&action))
        .send();

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_json_field("error.code", &json!("DESERIALIZATION_FAILED"));
    let request_id = response.header_str("x-request-id").unwrap();
    response.assert_json_field("error.request_id", &json!(request_id));
}
