//! The action handler middleware.
//!
//! Runs a routed [`Action`] through validation, execution, error recovery
//! and rendering:
//!
//! ```text
//! register_validator → validate ─ errors ──────────────→ handle_error ─┐
//!                          │                                           │
//!                          └─ ok → invoke ─ assertion (422) ───────────┤
//!                                    │    └ other (500, logged) ───────┤
//!                                    └─ ok ────────────────────────────┤
//!                                                                      ↓
//!                                                               responder.render
//! ```
//!
//! Requests whose routed handler is not an action pass to the next stage
//! unchanged.

use crate::{Action, ActionRequestExt, Responder, Validator};
use http::StatusCode;
use std::fmt;
use std::sync::Arc;
use tessera_core::{ActionError, Container, ErrorLogger, Errors, LogContext, Response, ServerRequest, TracingLogger};
use tessera_middleware::{DispatchError, Middleware, Next};

/// Middleware that dispatches routed actions.
///
/// Holds only shared, read-only collaborators; a single instance serves
/// concurrent requests.
///
/// # Example
///
/// ```
/// use tessera_action::{ActionHandler, JsonResponder, Responder};
/// use tessera_core::Container;
/// use tessera_middleware::Pipeline;
/// use std::sync::Arc;
///
/// let mut container = Container::new();
/// container.register::<dyn Responder>("json", Arc::new(JsonResponder::new()));
///
/// let pipeline = Pipeline::builder()
///     .stage(ActionHandler::new(Arc::new(container)))
///     .build();
/// assert_eq!(pipeline.stage_names(), vec!["action_handler"]);
/// ```
pub struct ActionHandler {
    container: Arc<Container>,
    logger: Arc<dyn ErrorLogger>,
}

impl ActionHandler {
    /// Creates a handler that logs through [`TracingLogger`].
    #[must_use]
    pub fn new(container: Arc<Container>) -> Self {
        Self::with_logger(container, Arc::new(TracingLogger))
    }

    /// Creates a handler with a custom logger.
    #[must_use]
    pub fn with_logger(container: Arc<Container>, logger: Arc<dyn ErrorLogger>) -> Self {
        Self { container, logger }
    }

    /// Runs `action` for `request` and renders the response.
    ///
    /// # Errors
    ///
    /// Returns a [`DispatchError`] when a validator fails fatally, when a
    /// token cannot be resolved, or when no responder is named. In the last
    /// case an execution failure, if any, is re-raised as
    /// [`DispatchError::Action`].
    pub fn execute_action(
        &self,
        action: &dyn Action,
        request: ServerRequest,
    ) -> Result<Response, DispatchError> {
        let mut request = action.register_validator(request);

        if let Some(token) = request.validator().cloned() {
            let validator = self.container.resolve::<dyn Validator>(&token)?;
            request = validator.validate(request)?;
        }

        let mut cause = None;
        let request = if request.has_errors() {
            tracing::debug!(action = action.name(), "validation failed");
            let status = request
                .status_code()
                .unwrap_or(StatusCode::UNPROCESSABLE_ENTITY);
            action.handle_error(request.with_status_code(status))
        } else {
            match action.invoke(request.clone()) {
                Ok(request) => request,
                Err(error) => {
                    let error = Arc::new(error);
                    let status = self.classify(action, &request, &error);
                    cause = Some(Arc::clone(&error));
                    action.handle_error(
                        request
                            .with_status_code(status)
                            .with_errors(Errors::Failure(error)),
                    )
                }
            }
        };

        let responder = self.responder(action, &request, cause)?;
        Ok(responder.render(request))
    }

    /// Assigns the status for a failed execution, logging unclassified faults.
    fn classify(&self, action: &dyn Action, request: &ServerRequest, error: &ActionError) -> StatusCode {
        if !error.is_assertion() {
            let mut context = LogContext::new()
                .with_request_id(request.request_id())
                .with_action(action.name());
            if let Some(trace) = error.backtrace() {
                context = context.with_trace(trace);
            }
            self.logger.error(&error.to_string(), &context);
        }
        error.status_code()
    }

    fn responder(
        &self,
        action: &dyn Action,
        request: &ServerRequest,
        cause: Option<Arc<ActionError>>,
    ) -> Result<Arc<dyn Responder>, DispatchError> {
        let Some(token) = request.responder() else {
            return Err(cause.map_or_else(
                || DispatchError::MissingResponder {
                    action: action.name().to_string(),
                },
                DispatchError::Action,
            ));
        };

        self.container
            .resolve::<dyn Responder>(token)
            .map_err(|error| cause.map_or(DispatchError::Lookup(error), DispatchError::Action))
    }
}

impl Middleware for ActionHandler {
    fn name(&self) -> &'static str {
        "action_handler"
    }

    fn process(&self, request: ServerRequest, next: Next<'_>) -> Result<Response, DispatchError> {
        match request.action().cloned() {
            Some(action) => self.execute_action(action.as_ref(), request),
            None => next.run(request),
        }
    }
}

impl fmt::Debug for ActionHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionHandler")
            .field("container", &self.container)
            .finish_non_exhaustive()
    }
}
