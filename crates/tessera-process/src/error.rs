//! Process manager errors.

use thiserror::Error;

/// Error raised while dispatching to a process manager or publishing.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// No reaction is registered for the message.
    #[error("Handler method '{handler}' is not callable in '{manager}'.")]
    HandlerNotCallable {
        /// Reaction name derived from the message, e.g. `whenOrderPlaced`.
        handler: String,
        /// Name of the process manager.
        manager: String,
    },

    /// The command bus refused a command.
    #[error("Publish failed for channel '{channel}': {reason}")]
    PublishFailed {
        /// Channel the command was sent to.
        channel: String,
        /// Why the bus refused it.
        reason: String,
    },

    /// A reaction failed.
    #[error(transparent)]
    Reaction(#[from] anyhow::Error),
}
