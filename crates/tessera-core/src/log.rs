//! Sink for failures the pipeline could not classify.

use crate::RequestId;

/// Correlation data attached to a logged failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogContext {
    /// Request the failure occurred in.
    pub request_id: Option<RequestId>,
    /// Name of the action that raised the failure.
    pub action: Option<String>,
    /// Rendered backtrace of the failure.
    pub trace: Option<String>,
}

impl LogContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the request ID.
    #[must_use]
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Sets the action name.
    #[must_use]
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Sets the backtrace.
    #[must_use]
    pub fn with_trace(mut self, trace: impl Into<String>) -> Self {
        self.trace = Some(trace.into());
        self
    }
}

/// Receives error-severity log entries.
///
/// The action handler writes exactly one entry for each unclassified
/// failure. Implementations must be cheap to share across threads.
pub trait ErrorLogger: Send + Sync {
    /// Records `message` at error severity.
    fn error(&self, message: &str, context: &LogContext);
}

/// Logger that emits `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl ErrorLogger for TracingLogger {
    fn error(&self, message: &str, context: &LogContext) {
        tracing::error!(
            request_id = context.request_id.map(tracing::field::display),
            action = context.action.as_deref(),
            trace = context.trace.as_deref(),
            "{message}"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_context_builder() {
        let id = RequestId::new();
        let context = LogContext::new()
            .with_request_id(id)
            .with_action("CreateUser")
            .with_trace("frame 0");

        assert_eq!(context.request_id, Some(id));
        assert_eq!(context.action.as_deref(), Some("CreateUser"));
        assert_eq!(context.trace.as_deref(), Some("frame 0"));
    }

    #[test]
    fn test_tracing_logger_is_object_safe() {
        let logger: Box<dyn ErrorLogger> = Box::new(TracingLogger);
        logger.error("boom", &LogContext::new());
    }
}
