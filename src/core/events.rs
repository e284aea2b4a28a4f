// src/core/events.rs

//! The event handler registry: a pure lookup table mapping lowercase event
//! names (or the `*` wildcard) to exactly one handler each.

use crate::core::AmiError;
use crate::core::protocol::Message;
use std::collections::HashMap;
use std::sync::Arc;

/// The registry key that matches any event without a specific handler.
pub const WILDCARD_EVENT: &str = "*";

/// The peer the session is connected to, handed to every event handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerInfo {
    pub host: String,
    pub port: u16,
}

/// The single handler abstraction for manager events.
///
/// Callers adapt closures, bound methods, or named functions to this trait at
/// registration time. `event` is the lowercased event name, `message` the full
/// parsed message, and `peer` the host/port the session is connected to.
pub trait EventHandler: Send + Sync {
    fn on_event(&self, event: &str, message: &Message, peer: &PeerInfo);
}

impl<F> EventHandler for F
where
    F: Fn(&str, &Message, &PeerInfo) + Send + Sync,
{
    fn on_event(&self, event: &str, message: &Message, peer: &PeerInfo) {
        self(event, message, peer)
    }
}

/// Maps a lowercase event name to its handler. Holds no execution logic:
/// dispatch happens in the session's read loop, not here.
#[derive(Default)]
pub struct EventRegistry {
    handlers: HashMap<String, Arc<dyn EventHandler>>,
}

impl EventRegistry {
    pub fn new() -> Self {
        Default::default()
    }

    /// Registers a handler for `event` (or [`WILDCARD_EVENT`]). A name that
    /// already has a handler is rejected without mutating the registry.
    pub fn register(&mut self, event: &str, handler: Arc<dyn EventHandler>) -> Result<(), AmiError> {
        let event = event.to_ascii_lowercase();
        if self.handlers.contains_key(&event) {
            return Err(AmiError::HandlerAlreadyRegistered(event));
        }
        self.handlers.insert(event, handler);
        Ok(())
    }

    /// Removes the handler for `event`. Removing a name with no handler is
    /// rejected.
    pub fn unregister(&mut self, event: &str) -> Result<(), AmiError> {
        let event = event.to_ascii_lowercase();
        if self.handlers.remove(&event).is_none() {
            return Err(AmiError::HandlerNotRegistered(event));
        }
        Ok(())
    }

    /// Looks up the handler for `event`, falling back to the wildcard handler.
    pub fn lookup(&self, event: &str) -> Option<Arc<dyn EventHandler>> {
        let event = event.to_ascii_lowercase();
        self.handlers
            .get(&event)
            .or_else(|| self.handlers.get(WILDCARD_EVENT))
            .cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for EventRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventRegistry")
            .field("events", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}
