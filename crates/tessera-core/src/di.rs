//! Token-keyed service lookup.
//!
//! Actions name their validator and responder by [`Token`]. The action
//! handler resolves those tokens here, asking for a specific capability
//! (usually a trait object such as `dyn Validator`). A token that was
//! registered under a different capability fails the lookup instead of
//! handing back the wrong kind of service.
//!
//! # Example
//!
//! ```rust
//! use tessera_core::{Container, LookupError, Token};
//! use std::sync::Arc;
//!
//! trait Greeter: Send + Sync {
//!     fn greet(&self) -> String;
//! }
//!
//! struct English;
//!
//! impl Greeter for English {
//!     fn greet(&self) -> String {
//!         "hello".to_string()
//!     }
//! }
//!
//! let mut container = Container::new();
//! container.register::<dyn Greeter>("greeter", Arc::new(English));
//!
//! let greeter = container.resolve::<dyn Greeter>(&Token::from("greeter")).unwrap();
//! assert_eq!(greeter.greet(), "hello");
//!
//! // Asking for a different capability fails.
//! let err = container.resolve::<String>(&Token::from("greeter")).unwrap_err();
//! assert!(matches!(err, LookupError::CapabilityMismatch { .. }));
//! ```

use crate::Token;
use std::any::{type_name, Any};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Error when a token cannot be resolved to the requested capability.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// Nothing is registered under the token.
    #[error("no service registered for '{token}'")]
    NotRegistered {
        /// The token that was looked up.
        token: Token,
    },

    /// The token resolves to a service of another capability.
    #[error("service '{token}' is registered as {registered}, not {capability}")]
    CapabilityMismatch {
        /// The token that was looked up.
        token: Token,
        /// Capability the caller asked for.
        capability: &'static str,
        /// Capability the service was registered under.
        registered: &'static str,
    },
}

impl LookupError {
    /// Returns the token that failed to resolve.
    #[must_use]
    pub const fn token(&self) -> &Token {
        match self {
            Self::NotRegistered { token } | Self::CapabilityMismatch { token, .. } => token,
        }
    }
}

struct Entry {
    capability: &'static str,
    // Holds an `Arc<C>` for the capability `C` given at registration.
    service: Arc<dyn Any + Send + Sync>,
}

/// A registry of shared services keyed by [`Token`].
///
/// Services are registered once at startup and resolved per request. The
/// container itself is `Send + Sync` and is shared behind an `Arc`.
#[derive(Default)]
pub struct Container {
    services: HashMap<Token, Entry>,
}

impl Container {
    /// Creates a new empty container.
    #[must_use]
    pub fn new() -> Self {
        Self {
            services: HashMap::new(),
        }
    }

    /// Registers `service` under `token` with capability `C`.
    ///
    /// `C` may be unsized, so trait objects register directly:
    /// `container.register::<dyn Responder>("json", Arc::new(JsonResponder))`.
    /// A previous registration under the same token is replaced.
    pub fn register<C>(&mut self, token: impl Into<Token>, service: Arc<C>)
    where
        C: ?Sized + Send + Sync + 'static,
    {
        let token = token.into();
        tracing::debug!(token = %token, capability = type_name::<C>(), "registering service");
        self.services.insert(
            token,
            Entry {
                capability: type_name::<C>(),
                service: Arc::new(service),
            },
        );
    }

    /// Resolves `token` to a service of capability `C`.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::NotRegistered`] for an unknown token and
    /// [`LookupError::CapabilityMismatch`] when the token was registered with a
    /// different capability.
    pub fn resolve<C>(&self, token: &Token) -> Result<Arc<C>, LookupError>
    where
        C: ?Sized + Send + Sync + 'static,
    {
        let entry = self
            .services
            .get(token)
            .ok_or_else(|| LookupError::NotRegistered {
                token: token.clone(),
            })?;

        entry
            .service
            .downcast_ref::<Arc<C>>()
            .cloned()
            .ok_or_else(|| LookupError::CapabilityMismatch {
                token: token.clone(),
                capability: type_name::<C>(),
                registered: entry.capability,
            })
    }

    /// Checks if anything is registered under `token`.
    #[must_use]
    pub fn contains(&self, token: &Token) -> bool {
        self.services.contains_key(token)
    }

    /// Returns the number of registered services.
    #[must_use]
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Returns `true` if no services are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("service_count", &self.services.len())
            .finish()
    }
}
