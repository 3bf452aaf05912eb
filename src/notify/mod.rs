//! Persistence notification bus
//!
//! The persistence layer publishes lifecycle and record-change messages here;
//! interested components register a callback at construction time. Callbacks
//! run synchronously on the publishing thread, in registration order.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::store::ResolvedPath;

/// A content record was created, updated or soft-deleted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeNotification {
    pub path: ResolvedPath,
    pub was_deleted: bool,
}

/// Messages carried by the bus
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceMessage {
    /// Process startup, published once before any request is served
    Startup,
    EntityUpdated(ChangeNotification),
}

/// Handle returned by [`NotificationBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(usize);

type Callback = Arc<dyn Fn(&PersistenceMessage) + Send + Sync>;

#[derive(Default)]
pub struct NotificationBus {
    listeners: RwLock<Vec<(ListenerId, Callback)>>,
    next_listener_id: AtomicUsize,
}

impl NotificationBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback for every published message
    pub fn subscribe<F>(&self, callback: F) -> ListenerId
    where
        F: Fn(&PersistenceMessage) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_listener_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(callback)));
        id
    }

    /// Remove a callback; returns false if it was not registered
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write().unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|(listener_id, _)| *listener_id != id);
        listeners.len() < before
    }

    /// Deliver a message to all listeners, returning how many received it
    pub fn publish(&self, message: &PersistenceMessage) -> usize {
        // Snapshot so callbacks may subscribe or publish without deadlocking
        let callbacks: Vec<Callback> = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();

        for callback in &callbacks {
            callback(message);
        }
        callbacks.len()
    }
}
