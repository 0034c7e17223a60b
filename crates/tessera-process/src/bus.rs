//! Publishing commands.

use crate::{Message, Metadata, ProcessError};
use std::sync::{Arc, Mutex, PoisonError};

/// Channel process managers publish commands on.
pub const COMMANDS_CHANNEL: &str = "commands";

/// Outbound side of a message bus.
pub trait CommandBus: Send + Sync {
    /// Publishes `message` on `channel`.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessError::PublishFailed`] if the bus refuses the message.
    fn publish(
        &self,
        message: Arc<dyn Message>,
        channel: &str,
        metadata: Metadata,
    ) -> Result<(), ProcessError>;
}

/// A message accepted by an [`InMemoryCommandBus`].
#[derive(Debug, Clone)]
pub struct Published {
    /// The published message.
    pub message: Arc<dyn Message>,
    /// Channel it was published on.
    pub channel: String,
    /// Metadata sent with it.
    pub metadata: Metadata,
}

/// Bus that keeps published messages in memory.
///
/// Useful in tests and for wiring a process manager before a transport
/// exists. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCommandBus {
    published: Arc<Mutex<Vec<Published>>>,
}

impl InMemoryCommandBus {
    /// Creates an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns everything published so far, in order.
    #[must_use]
    pub fn published(&self) -> Vec<Published> {
        self.published
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the short names of the messages published on `channel`.
    #[must_use]
    pub fn names_on(&self, channel: &str) -> Vec<&'static str> {
        self.published
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|p| p.channel == channel)
            .map(|p| p.message.short_name())
            .collect()
    }
}

impl CommandBus for InMemoryCommandBus {
    fn publish(
        &self,
        message: Arc<dyn Message>,
        channel: &str,
        metadata: Metadata,
    ) -> Result<(), ProcessError> {
        tracing::debug!(channel, message = message.short_name(), "publishing");
        self.published
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Published {
                message,
                channel: channel.to_string(),
                metadata,
            });
        Ok(())
    }
}
