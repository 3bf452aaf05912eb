//! Content store module
//!
//! The backing-store side of delivery: path keys, entity records, the
//! resolver seam the delivery engine queries, and an in-process catalog that
//! implements it.

mod catalog;
mod entity;
mod path;
mod source;

use async_trait::async_trait;

use crate::error::ResolveError;

pub use catalog::ContentCatalog;
pub use entity::{ContentEntity, Payload};
pub use path::ResolvedPath;
pub use source::ContentSource;

/// Backing resolver queried on existence-cache misses
#[async_trait]
pub trait ContentResolver: Send + Sync {
    /// Look up a record by its resolved path. Soft-deleted records are
    /// returned as found; the caller decides liveness.
    async fn lookup_by_full_path(
        &self,
        path: &ResolvedPath,
    ) -> Result<Option<ContentEntity>, ResolveError>;
}
