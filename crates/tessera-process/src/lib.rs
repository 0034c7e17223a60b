//! # Tessera Process
//!
//! Process managers for Tessera services. A process manager reacts to
//! domain events by publishing follow-up commands; the reaction for a
//! message is looked up by name (`when` + the message's short name) in an
//! explicit registry built at startup.
//!
//! - [`ProcessManager`] - Reaction registry and dispatch
//! - [`Envelope`] / [`Metadata`] - A message and the data travelling with it
//! - [`CommandBus`] - Outbound publishing; [`InMemoryCommandBus`] for tests

#![doc(html_root_url = "https://docs.rs/tessera-process/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod bus;
mod error;
mod manager;
mod message;

pub use bus::{CommandBus, InMemoryCommandBus, Published, COMMANDS_CHANNEL};
pub use error::ProcessError;
pub use manager::{ProcessManager, ProcessManagerBuilder};
pub use message::{handler_name, short_type_name, AsAny, Envelope, Message, Metadata};
