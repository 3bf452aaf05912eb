//! In-process content catalog
//!
//! Holds entity records keyed by resolved path and publishes a change
//! notification for every write, playing the persistence layer's role.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::{ContentEntity, ContentResolver, ResolvedPath};
use crate::error::ResolveError;
use crate::notify::{ChangeNotification, NotificationBus, PersistenceMessage};

pub struct ContentCatalog {
    root: String,
    records: RwLock<HashMap<ResolvedPath, ContentEntity>>,
    bus: Arc<NotificationBus>,
    available: AtomicBool,
    lookups: AtomicU64,
}

impl ContentCatalog {
    pub fn new(root: impl Into<String>, bus: Arc<NotificationBus>) -> Self {
        Self {
            root: root.into(),
            records: RwLock::new(HashMap::new()),
            bus,
            available: AtomicBool::new(true),
            lookups: AtomicU64::new(0),
        }
    }

    /// Content root request paths are resolved against
    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn resolve(&self, request_path: &str) -> ResolvedPath {
        ResolvedPath::resolve(&self.root, request_path)
    }

    /// Insert or replace a record and notify subscribers
    pub async fn upsert(&self, entity: ContentEntity) {
        let notification = ChangeNotification {
            path: entity.path.clone(),
            was_deleted: entity.is_deleted,
        };
        self.records.write().await.insert(entity.path.clone(), entity);
        self.bus
            .publish(&PersistenceMessage::EntityUpdated(notification));
    }

    /// Mark a record deleted; returns false when no record exists
    pub async fn soft_delete(&self, path: &ResolvedPath) -> bool {
        {
            let mut records = self.records.write().await;
            let Some(entity) = records.get_mut(path) else {
                return false;
            };
            entity.is_deleted = true;
        }
        self.bus
            .publish(&PersistenceMessage::EntityUpdated(ChangeNotification {
                path: path.clone(),
                was_deleted: true,
            }));
        true
    }

    /// All records, sorted by path
    pub async fn list(&self) -> Vec<ContentEntity> {
        let mut entities: Vec<_> = self.records.read().await.values().cloned().collect();
        entities.sort_by(|a, b| a.path.cmp(&b.path));
        entities
    }

    /// Register every regular file under the content root as an external
    /// entity. A missing root is treated as empty.
    pub async fn scan_directory(&self) -> std::io::Result<usize> {
        let root = PathBuf::from(&self.root);
        if !tokio::fs::try_exists(&root).await? {
            info!(root = %self.root, "Content root does not exist, nothing to scan");
            return Ok(0);
        }

        let mut pending = vec![root];
        let mut registered = 0;
        while let Some(dir) = pending.pop() {
            let mut entries = tokio::fs::read_dir(&dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                let file_type = entry.file_type().await?;
                let location = entry.path();
                if file_type.is_dir() {
                    pending.push(location);
                } else if file_type.is_file() {
                    let size = entry.metadata().await?.len();
                    let path = ResolvedPath::from_location(&location);
                    let file_name = path.file_name().to_string();
                    debug!(%path, size, "Registering file");
                    self.upsert(ContentEntity::external(path, file_name, location, size))
                        .await;
                    registered += 1;
                }
            }
        }

        info!(root = %self.root, registered, "Content root scanned");
        Ok(registered)
    }

    /// Toggle store availability; lookups fail while unavailable
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::Relaxed);
    }

    /// Number of resolver queries answered or refused so far
    pub fn lookup_count(&self) -> u64 {
        self.lookups.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ContentResolver for ContentCatalog {
    async fn lookup_by_full_path(
        &self,
        path: &ResolvedPath,
    ) -> Result<Option<ContentEntity>, ResolveError> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        if !self.available.load(Ordering::Relaxed) {
            return Err(ResolveError::Unavailable("catalog offline".to_string()));
        }
        Ok(self.records.read().await.get(path).cloned())
    }
}
