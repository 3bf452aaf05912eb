// Application state module
// Wires the notification bus, existence cache, catalog and delivery engine

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::types::Config;
use crate::cache::ExistenceCache;
use crate::handler::DeliveryEngine;
use crate::logger;
use crate::notify::{NotificationBus, PersistenceMessage};
use crate::store::{ContentCatalog, ContentResolver};

/// Application state
pub struct AppState {
    pub config: Config,
    pub bus: Arc<NotificationBus>,
    pub cache: Arc<ExistenceCache>,
    pub catalog: Arc<ContentCatalog>,
    pub engine: DeliveryEngine,

    // Cached config value for fast access without locks
    pub access_log: AtomicBool,
}

impl AppState {
    /// Build the object graph; nothing is served until [`start`](Self::start)
    pub fn new(config: Config) -> Self {
        let root = config.content_root();
        let bus = Arc::new(NotificationBus::new());
        let (cache, _) = ExistenceCache::attached(&bus);
        let catalog = Arc::new(ContentCatalog::new(root.clone(), Arc::clone(&bus)));
        let engine = DeliveryEngine::new(
            root,
            config.delivery.max_chunk_size,
            Arc::clone(&cache),
            Arc::clone(&catalog) as Arc<dyn ContentResolver>,
        );
        let access_log = AtomicBool::new(config.logging.access_log);

        Self {
            config,
            bus,
            cache,
            catalog,
            engine,
            access_log,
        }
    }

    /// Populate the catalog and broadcast the startup message
    pub async fn start(&self) -> std::io::Result<()> {
        if self.config.delivery.scan_on_startup {
            self.catalog.scan_directory().await?;
        }
        let listeners = self.bus.publish(&PersistenceMessage::Startup);
        logger::log_startup_published(listeners);
        Ok(())
    }

    pub fn access_log_enabled(&self) -> bool {
        self.access_log.load(Ordering::Relaxed)
    }
}
