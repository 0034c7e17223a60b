//! A logger that remembers what it was told.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tessera_core::{ErrorLogger, LogContext};

/// One recorded call to [`ErrorLogger::error`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// The logged message.
    pub message: String,
    /// The context passed with it.
    pub context: LogContext,
}

/// [`ErrorLogger`] that stores every entry in memory.
///
/// Clones share the same buffer, so keep one clone for assertions and hand
/// another to the code under test.
///
/// # Example
///
/// ```
/// use tessera_core::{ErrorLogger, LogContext};
/// use tessera_test::RecordingLogger;
///
/// let logger = RecordingLogger::new();
/// logger.error("database unavailable", &LogContext::new().with_action("CreateUser"));
///
/// assert_eq!(logger.count(), 1);
/// assert_eq!(logger.entries()[0].context.action.as_deref(), Some("CreateUser"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordingLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl RecordingLogger {
    /// Creates an empty logger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of recorded entries.
    #[must_use]
    pub fn count(&self) -> usize {
        self.lock().len()
    }

    /// Returns a snapshot of the recorded entries.
    #[must_use]
    pub fn entries(&self) -> Vec<LogEntry> {
        self.lock().clone()
    }

    /// Returns the recorded messages in order.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.lock().iter().map(|e| e.message.clone()).collect()
    }

    /// Forgets everything recorded so far.
    pub fn clear(&self) {
        self.lock().clear();
    }

    // Poisoning is ignored; entries stay readable after a panicking test.
    fn lock(&self) -> MutexGuard<'_, Vec<LogEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ErrorLogger for RecordingLogger {
    fn error(&self, message: &str, context: &LogContext) {
        self.lock().push(LogEntry {
            message: message.to_string(),
            context: context.clone(),
        });
    }
}
