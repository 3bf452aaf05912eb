//! Existence cache
//!
//! Remembers, per resolved path, whether the backing store last reported a
//! live entity, so repeated requests for missing files never reach the
//! store. Entries are only overwritten, never removed; the whole map is
//! cleared by the startup message.
//!
//! Until the first [`ExistenceCache::reset`] the cache is unavailable: every
//! lookup reports unknown and writes are dropped, so callers go straight to
//! the store.

use dashmap::DashMap;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

use crate::notify::{ChangeNotification, ListenerId, NotificationBus, PersistenceMessage};
use crate::store::ResolvedPath;

#[derive(Default)]
pub struct ExistenceCache {
    entries: DashMap<ResolvedPath, bool>,
    initialized: AtomicBool,
}

/// Point-in-time view for the management API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub initialized: bool,
    pub entries: usize,
    pub live: usize,
}

impl ExistenceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct a cache and register it on the notification bus
    pub fn attached(bus: &NotificationBus) -> (Arc<Self>, ListenerId) {
        let cache = Arc::new(Self::new());
        let listener = Arc::clone(&cache);
        let id = bus.subscribe(move |message| listener.accept(message));
        (cache, id)
    }

    /// Dispatch a persistence message
    pub fn accept(&self, message: &PersistenceMessage) {
        match message {
            PersistenceMessage::Startup => self.reset(),
            PersistenceMessage::EntityUpdated(notification) => {
                self.on_change_notification(notification);
            }
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Last known liveness; `None` means the store must be queried
    pub fn lookup(&self, path: &ResolvedPath) -> Option<bool> {
        if !self.is_initialized() {
            return None;
        }
        self.entries.get(path).map(|entry| *entry)
    }

    /// Insert or overwrite an entry (last writer wins)
    pub fn record_resolution(&self, path: ResolvedPath, live: bool) {
        if self.is_initialized() {
            self.entries.insert(path, live);
        }
    }

    /// Record a store query outcome unless a notification got there first.
    ///
    /// Returns the value now held for the path. Before initialization the
    /// query outcome is returned unrecorded.
    pub fn populate(&self, path: ResolvedPath, live: bool) -> bool {
        if !self.is_initialized() {
            return live;
        }
        *self.entries.entry(path).or_insert(live)
    }

    /// Clear every entry and mark the cache ready
    pub fn reset(&self) {
        self.entries.clear();
        self.initialized.store(true, Ordering::Release);
        info!("Existence cache reset");
    }

    pub fn on_change_notification(&self, notification: &ChangeNotification) {
        if !self.is_initialized() {
            debug!(path = %notification.path, "Change before startup ignored");
            return;
        }
        debug!(
            path = %notification.path,
            deleted = notification.was_deleted,
            "Existence cache updated"
        );
        self.entries
            .insert(notification.path.clone(), !notification.was_deleted);
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            initialized: self.is_initialized(),
            entries: self.entries.len(),
            live: self.entries.iter().filter(|entry| *entry.value()).count(),
        }
    }
}
