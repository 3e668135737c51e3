//! In-process permission event bus.
//!
//! The host hands the notifier an [`EventSource`] to subscribe to. [`EventBus`]
//! is the implementation used by the binary and the tests: listeners register
//! per [`EventKind`] and are called one after another on `publish`.

use crate::event::{EventKind, PermissionEvent};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Receives permission events from an [`EventSource`].
#[async_trait]
pub trait PermissionListener: Send + Sync {
    async fn on_event(&self, event: &PermissionEvent);
}

/// Something listeners can subscribe to for a given event kind.
pub trait EventSource: Send + Sync {
    fn subscribe(&self, kind: EventKind, listener: Arc<dyn PermissionListener>);
}

/// Registry of listeners keyed by event kind.
#[derive(Default)]
pub struct EventBus {
    listeners: RwLock<HashMap<EventKind, Vec<Arc<dyn PermissionListener>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatches `event` to every listener subscribed to its kind, in
    /// subscription order. Returns how many listeners were called.
    pub async fn publish(&self, event: &PermissionEvent) -> usize {
        let kind = event.kind();
        // Snapshot so no lock is held across an await.
        let listeners: Vec<Arc<dyn PermissionListener>> = match self.listeners.read() {
            Ok(map) => map.get(&kind).cloned().unwrap_or_default(),
            Err(poisoned) => poisoned.into_inner().get(&kind).cloned().unwrap_or_default(),
        };

        debug!(%kind, listeners = listeners.len(), "Publishing permission event");
        for listener in &listeners {
            listener.on_event(event).await;
        }

        listeners.len()
    }

    /// Number of listeners subscribed to `kind`.
    pub fn listener_count(&self, kind: EventKind) -> usize {
        match self.listeners.read() {
            Ok(map) => map.get(&kind).map_or(0, Vec::len),
            Err(poisoned) => poisoned.into_inner().get(&kind).map_or(0, Vec::len),
        }
    }
}

impl EventSource for EventBus {
    fn subscribe(&self, kind: EventKind, listener: Arc<dyn PermissionListener>) {
        let mut map = match self.listeners.write() {
            Ok(map) => map,
            Err(poisoned) => poisoned.into_inner(),
        };
        map.entry(kind).or_default().push(listener);
    }
}
