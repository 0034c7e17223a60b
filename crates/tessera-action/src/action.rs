//! The action contract.

use std::sync::Arc;
use tessera_core::{attributes, ActionError, ServerRequest};

/// A business-logic unit bound to a route.
///
/// Actions never construct their collaborators. They name a validator and
/// a responder by token on the request, and the action handler resolves
/// both at dispatch time.
///
/// Actions are shared across concurrent requests; keep per-request state
/// in the [`ServerRequest`].
///
/// # Example
///
/// ```
/// use tessera_action::Action;
/// use tessera_core::{ActionError, ServerRequest};
///
/// struct Ping;
///
/// impl Action for Ping {
///     fn invoke(&self, request: ServerRequest) -> Result<ServerRequest, ActionError> {
///         Ok(request
///             .with_payload(serde_json::Map::new())
///             .with_responder("json"))
///     }
///
///     fn handle_error(&self, request: ServerRequest) -> ServerRequest {
///         request.with_responder("json")
///     }
/// }
/// ```
pub trait Action: Send + Sync + 'static {
    /// Returns a context naming this action's validator.
    ///
    /// The default registers none.
    fn register_validator(&self, request: ServerRequest) -> ServerRequest {
        request
    }

    /// Executes the action on validated input.
    ///
    /// # Errors
    ///
    /// [`ActionError::AssertionFailed`] for declared business-rule failures;
    /// anything else is treated as a system fault.
    fn invoke(&self, request: ServerRequest) -> Result<ServerRequest, ActionError>;

    /// Produces the error-recovery context.
    ///
    /// Called with the status code and errors attributes set. The returned
    /// context should name a responder.
    fn handle_error(&self, request: ServerRequest) -> ServerRequest;

    /// Whether the route requires authorization.
    ///
    /// Read by authorization stages; the action handler ignores it.
    fn is_secure(&self) -> bool {
        false
    }

    /// Name used in log entries and configuration errors.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Access to the routed action on a request.
pub trait ActionRequestExt {
    /// Stores `action` as the handler the router matched.
    #[must_use]
    fn with_action(self, action: Arc<dyn Action>) -> Self;

    /// Returns the routed handler if it is an action.
    fn action(&self) -> Option<&Arc<dyn Action>>;
}

impl ActionRequestExt for ServerRequest {
    fn with_action(self, action: Arc<dyn Action>) -> Self {
        self.with_attribute(attributes::REQUEST_HANDLER, action)
    }

    fn action(&self) -> Option<&Arc<dyn Action>> {
        self.attribute::<Arc<dyn Action>>(attributes::REQUEST_HANDLER)
    }
}
