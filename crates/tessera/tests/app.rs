//! Pipelines assembled from configuration.

use http::StatusCode;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tessera::config::{ConfigLoader, PipelineSettings, TesseraConfig};
use tessera::middleware::FnMiddleware;
use tessera::prelude::*;
use tessera_test::{RecordingLogger, TestClient};

const TRANSFER_VALIDATOR: &str = "transfer.validator";
const REQUEST_ID: &str = "01890a5d-ac96-774b-bcce-b302099a8057";

struct Transfer;

impl Action for Transfer {
    fn register_validator(&self, request: ServerRequest) -> ServerRequest {
        request.with_validator(TRANSFER_VALIDATOR)
    }

    fn invoke(&self, request: ServerRequest) -> Result<ServerRequest, ActionError> {
        let amount = request
            .payload()
            .and_then(|payload| payload.get("amount"))
            .and_then(Value::as_u64)
            .unwrap_or_default();

        if amount > 1000 {
            return Err(ActionError::unexpected(anyhow::anyhow!("ledger offline")));
        }

        let mut payload = Map::new();
        payload.insert("amount".into(), amount.into());
        Ok(request
            .with_payload(payload)
            .with_status_code(StatusCode::CREATED)
            .with_responder(tessera::JSON_RESPONDER))
    }

    fn handle_error(&self, request: ServerRequest) -> ServerRequest {
        request.with_responder(tessera::JSON_RESPONDER)
    }

    fn name(&self) -> &str {
        "Transfer"
    }
}

fn client(config: &TesseraConfig, logger: &RecordingLogger) -> TestClient {
    let app = App::from_config(config);
    let rules = FieldRules::new()
        .with_extractor(app.extractor())
        .rule("amount", |field, value, _errors| match value.as_u64() {
            Some(n) if n > 0 => Ok(Value::from(n)),
            _ => Err(Violations::single(field, "Must be a positive amount.")),
        });

    let pipeline = app
        .validator(
            TRANSFER_VALIDATOR,
            Arc::new(FieldValidator::new(rules).fields(["amount"])),
        )
        .logger(Arc::new(logger.clone()))
        .stage(FnMiddleware::new(
            "router",
            |request: ServerRequest, next: Next<'_>| -> Result<Response, DispatchError> {
                if request.uri().path() == "/transfers" {
                    next.run(request.with_action(Arc::new(Transfer)))
                } else {
                    next.run(request)
                }
            },
        ))
        .build();

    TestClient::new(pipeline)
}

#[test]
fn test_stage_order() {
    let pipeline = App::new(PipelineSettings::default())
        .stage(FnMiddleware::new(
            "router",
            |request: ServerRequest, next: Next<'_>| -> Result<Response, DispatchError> {
                next.run(request)
            },
        ))
        .build();

    assert_eq!(
        pipeline.stage_names(),
        vec!["request_id", "error_normalization", "router", "action_handler"]
    );
}

#[test]
fn test_routed_action_succeeds() {
    let logger = RecordingLogger::new();
    let client = client(&TesseraConfig::production(), &logger);

    let response = client.post("/transfers").json(&json!({ "amount": 250 })).send();

    response
        .assert_status(StatusCode::CREATED)
        .assert_json_eq(&json!({ "amount": 250 }));
    assert!(response.header_str("x-request-id").is_some());
}

#[test]
fn test_field_errors_render_as_aggregate() {
    let logger = RecordingLogger::new();
    let client = client(&TesseraConfig::production(), &logger);

    client
        .post("/transfers")
        .json(&json!({ "amount": 0 }))
        .send()
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY)
        .assert_json_eq(&json!({ "amount": ["Must be a positive amount."] }));
    assert_eq!(logger.count(), 0);
}

#[test]
fn test_production_hides_failures() {
    let logger = RecordingLogger::new();
    let client = client(&TesseraConfig::production(), &logger);

    client
        .post("/transfers")
        .json(&json!({ "amount": 5000 }))
        .send()
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR)
        .assert_json_eq(&json!({ "_": ["An internal error occurred"] }));

    assert_eq!(logger.messages(), vec!["ledger offline".to_string()]);
}

#[test]
fn test_development_exposes_failures() {
    let logger = RecordingLogger::new();
    let client = client(&TesseraConfig::development(), &logger);

    client
        .post("/transfers")
        .json(&json!({ "amount": 5000 }))
        .send()
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR)
        .assert_json_eq(&json!({ "_": ["ledger offline"] }));
}

#[test]
fn test_custom_internal_error_message() {
    let config = ConfigLoader::new()
        .with_string(
            "[pipeline]\ninternal_error_message = \"Please retry later\"",
            "toml",
        )
        .unwrap()
        .load()
        .unwrap();
    let client = client(&config, &RecordingLogger::new());

    client
        .post("/transfers")
        .json(&json!({ "amount": 5000 }))
        .send()
        .assert_json_eq(&json!({ "_": ["Please retry later"] }));
}

#[test]
fn test_request_id_trust_follows_settings() {
    let logger = RecordingLogger::new();

    let trusting = client(&TesseraConfig::development(), &logger);
    trusting
        .post("/transfers")
        .header("x-request-id", REQUEST_ID)
        .json(&json!({ "amount": 1 }))
        .send()
        .assert_header("x-request-id", REQUEST_ID);

    let strict = client(&TesseraConfig::production(), &logger);
    let response = strict
        .post("/transfers")
        .header("x-request-id", REQUEST_ID)
        .json(&json!({ "amount": 1 }))
        .send();
    assert_ne!(response.header_str("x-request-id"), Some(REQUEST_ID));
}

#[test]
fn test_body_limit_comes_from_settings() {
    let mut config = TesseraConfig::production();
    config.pipeline.max_body_size = 16;
    let client = client(&config, &RecordingLogger::new());

    let response = client
        .post("/transfers")
        .json(&json!({ "amount": 1, "memo": "rent for the month of october" }))
        .send();

    response
        .assert_status(StatusCode::PAYLOAD_TOO_LARGE)
        .assert_json_field("error.code", &json!("PAYLOAD_TOO_LARGE"));
}

#[test]
fn test_unrouted_request_falls_back() {
    let client = client(&TesseraConfig::production(), &RecordingLogger::new());

    client
        .get("/unknown")
        .send()
        .assert_status(StatusCode::NOT_FOUND)
        .assert_json_field("error.code", &json!("NOT_FOUND"));
}

#[test]
fn test_custom_responder_replaces_json() {
    struct Plain;

    impl Responder for Plain {
        fn render(&self, request: ServerRequest) -> Response {
            let status = request.status_code().unwrap_or(StatusCode::OK);
            Response::text(status, "plain")
        }
    }

    let rules = FieldRules::new().rule("amount", |_field, value, _errors| Ok(value.clone()));
    let pipeline = App::new(PipelineSettings::default())
        .validator(
            TRANSFER_VALIDATOR,
            Arc::new(FieldValidator::new(rules).fields(["amount"])),
        )
        .responder(tessera::JSON_RESPONDER, Arc::new(Plain))
        .build();
    let client = TestClient::new(pipeline);

    let action: Arc<dyn Action> = Arc::new(Transfer);
    let response = client
        .post("/transfers")
        .json(&json!({ "amount": 3 }))
        .attribute(attributes::REQUEST_HANDLER, action)
        .send();

    response.assert_status(StatusCode::CREATED);
    assert_eq!(response.text().unwrap(), "plain");
}
