//! Messages, metadata and envelopes.

use serde_json::{Map, Value};
use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

/// Object-safe access to [`Any`], implemented for every `'static` type.
pub trait AsAny {
    /// Returns `self` for downcasting.
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A domain message: an event a process manager reacts to, or a command it
/// publishes.
///
/// ```
/// use tessera_process::Message;
///
/// #[derive(Debug)]
/// struct OrderPlaced {
///     order_id: u64,
/// }
///
/// impl Message for OrderPlaced {}
///
/// assert_eq!(OrderPlaced { order_id: 1 }.short_name(), "OrderPlaced");
/// ```
pub trait Message: AsAny + Send + Sync + fmt::Debug + 'static {
    /// Returns the name reactions are keyed by.
    ///
    /// Defaults to the type name without module path or generic arguments.
    fn short_name(&self) -> &'static str {
        short_type_name::<Self>()
    }
}

impl dyn Message {
    /// Returns the message as `M` if that is its concrete type.
    pub fn downcast_ref<M: Message>(&self) -> Option<&M> {
        self.as_any().downcast_ref::<M>()
    }
}

/// Returns the unqualified name of `T`.
///
/// ```
/// use tessera_process::short_type_name;
///
/// struct OrderPlaced;
///
/// assert_eq!(short_type_name::<OrderPlaced>(), "OrderPlaced");
/// assert_eq!(short_type_name::<Vec<OrderPlaced>>(), "Vec");
/// ```
#[must_use]
pub fn short_type_name<T: ?Sized>() -> &'static str {
    let full = type_name::<T>();
    let path = full.split_once('<').map_or(full, |(path, _)| path);
    path.rsplit("::").next().unwrap_or(path)
}

/// Returns the reaction name for a message short name: `when` followed by
/// the name with its first character upper-cased.
///
/// ```
/// use tessera_process::handler_name;
///
/// assert_eq!(handler_name("OrderPlaced"), "whenOrderPlaced");
/// assert_eq!(handler_name("paymentFailed"), "whenPaymentFailed");
/// ```
#[must_use]
pub fn handler_name(short_name: &str) -> String {
    let mut chars = short_name.chars();
    let mut name = String::with_capacity(short_name.len() + 4);
    name.push_str("when");
    if let Some(first) = chars.next() {
        name.extend(first.to_uppercase());
        name.push_str(chars.as_str());
    }
    name
}

/// Key/value data travelling alongside a message: correlation ids, causation,
/// the acting user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata(Map<String, Value>);

impl Metadata {
    /// Creates empty metadata.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns metadata with `key` set to `value`.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Returns the value under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns `true` if no entry is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the entries as a JSON object.
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for Metadata {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// A message together with its metadata, as delivered by a message bus.
#[derive(Debug, Clone)]
pub struct Envelope {
    message: Arc<dyn Message>,
    metadata: Metadata,
}

impl Envelope {
    /// Wraps `message` with empty metadata.
    pub fn wrap<M: Message>(message: M) -> Self {
        Self {
            message: Arc::new(message),
            metadata: Metadata::new(),
        }
    }

    /// Returns the envelope with `metadata` attached.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Returns the message.
    pub fn message(&self) -> &dyn Message {
        self.message.as_ref()
    }

    /// Returns the metadata.
    #[must_use]
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}
