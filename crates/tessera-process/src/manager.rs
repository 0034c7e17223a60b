//! Process manager dispatch.

use crate::{
    handler_name, short_type_name, CommandBus, Envelope, Message, Metadata, ProcessError,
    COMMANDS_CHANNEL,
};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

type Reaction =
    Box<dyn Fn(&ProcessManager, &dyn Message, &Metadata) -> Result<(), ProcessError> + Send + Sync>;

/// Reacts to domain messages by publishing follow-up commands.
///
/// Each reaction is registered under `when` + the message's short name, so
/// an `OrderPlaced` event is handled by `whenOrderPlaced`. Dispatching a
/// message nobody registered for fails instead of being dropped.
///
/// # Example
///
/// ```
/// use tessera_process::{Envelope, InMemoryCommandBus, Message, Metadata, ProcessManager};
/// use std::sync::Arc;
///
/// #[derive(Debug)]
/// struct OrderPlaced { order_id: u64 }
/// impl Message for OrderPlaced {}
///
/// #[derive(Debug)]
/// struct ReserveStock { order_id: u64 }
/// impl Message for ReserveStock {}
///
/// let bus = InMemoryCommandBus::new();
/// let manager = ProcessManager::builder("Fulfilment", Arc::new(bus.clone()))
///     .on(|pm: &ProcessManager, event: &OrderPlaced, metadata: &Metadata| {
///         pm.then(ReserveStock { order_id: event.order_id }, metadata.clone())
///     })
///     .build();
///
/// manager.handle(&Envelope::wrap(OrderPlaced { order_id: 9 })).unwrap();
/// assert_eq!(bus.names_on("commands"), vec!["ReserveStock"]);
/// ```
pub struct ProcessManager {
    name: String,
    reactions: HashMap<String, Reaction>,
    bus: Arc<dyn CommandBus>,
}

impl ProcessManager {
    /// Starts building a manager called `name` that publishes on `bus`.
    #[must_use]
    pub fn builder(name: impl Into<String>, bus: Arc<dyn CommandBus>) -> ProcessManagerBuilder {
        ProcessManagerBuilder {
            name: name.into(),
            reactions: HashMap::new(),
            bus,
        }
    }

    /// Returns the manager's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` if a reaction exists for messages named `short_name`.
    #[must_use]
    pub fn handles(&self, short_name: &str) -> bool {
        self.reactions.contains_key(&handler_name(short_name))
    }

    /// Returns the registered reaction names, sorted.
    #[must_use]
    pub fn reaction_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.reactions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Runs the reaction registered for the envelope's message.
    ///
    /// # Errors
    ///
    /// [`ProcessError::HandlerNotCallable`] when no reaction matches the
    /// message, otherwise whatever the reaction returns.
    pub fn handle(&self, envelope: &Envelope) -> Result<(), ProcessError> {
        let message = envelope.message();
        let handler = handler_name(message.short_name());
        let Some(reaction) = self.reactions.get(&handler) else {
            return Err(self.not_callable(handler));
        };

        tracing::debug!(manager = %self.name, handler = %handler, "dispatching message");
        reaction(self, message, envelope.metadata())
    }

    /// Publishes `command` on the commands channel.
    ///
    /// # Errors
    ///
    /// Returns the bus's error if publishing fails.
    pub fn then<C: Message>(&self, command: C, metadata: Metadata) -> Result<(), ProcessError> {
        self.bus.publish(Arc::new(command), COMMANDS_CHANNEL, metadata)
    }

    fn not_callable(&self, handler: String) -> ProcessError {
        ProcessError::HandlerNotCallable {
            handler,
            manager: self.name.clone(),
        }
    }
}

impl fmt::Debug for ProcessManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessManager")
            .field("name", &self.name)
            .field("reactions", &self.reaction_names())
            .finish_non_exhaustive()
    }
}

/// Builder for [`ProcessManager`].
#[must_use]
pub struct ProcessManagerBuilder {
    name: String,
    reactions: HashMap<String, Reaction>,
    bus: Arc<dyn CommandBus>,
}

impl ProcessManagerBuilder {
    /// Registers the reaction to messages of type `M`.
    ///
    /// Keyed by the unqualified type name of `M`. Messages that override
    /// [`Message::short_name`] register through [`on_named`](Self::on_named).
    pub fn on<M, F>(self, reaction: F) -> Self
    where
        M: Message,
        F: Fn(&ProcessManager, &M, &Metadata) -> Result<(), ProcessError> + Send + Sync + 'static,
    {
        self.on_named(short_type_name::<M>(), reaction)
    }

    /// Registers the reaction to messages of type `M` reporting `short_name`.
    ///
    /// A later registration under the same name replaces the earlier one.
    pub fn on_named<M, F>(mut self, short_name: &str, reaction: F) -> Self
    where
        M: Message,
        F: Fn(&ProcessManager, &M, &Metadata) -> Result<(), ProcessError> + Send + Sync + 'static,
    {
        let handler = handler_name(short_name);
        let reaction: Reaction = Box::new({
            let handler = handler.clone();
            move |manager: &ProcessManager, message: &dyn Message, metadata: &Metadata| {
                match message.downcast_ref::<M>() {
                    Some(message) => reaction(manager, message, metadata),
                    // Same short name, different type.
                    None => Err(manager.not_callable(handler.clone())),
                }
            }
        });
        self.reactions.insert(handler, reaction);
        self
    }

    /// Builds the manager.
    pub fn build(self) -> ProcessManager {
        ProcessManager {
            name: self.name,
            reactions: self.reactions,
            bus: self.bus,
        }
    }
}

impl fmt::Debug for ProcessManagerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessManagerBuilder")
            .field("name", &self.name)
            .field("reaction_count", &self.reactions.len())
            .finish_non_exhaustive()
    }
}
