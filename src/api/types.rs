// Management API request/response types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::cache::CacheStats;
use crate::store::{ContentEntity, Payload};

/// Catalog record as returned by `GET /v1/entities`
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct EntityView {
    pub path: String,
    pub file_name: String,
    pub kind: &'static str,
    pub size_bytes: u64,
    pub deleted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl From<&ContentEntity> for EntityView {
    fn from(entity: &ContentEntity) -> Self {
        let location = match &entity.payload {
            Payload::External(location) => Some(location.to_string_lossy().into_owned()),
            Payload::Inline(_) => None,
        };
        Self {
            path: entity.path.to_string(),
            file_name: entity.file_name.clone(),
            kind: entity.payload.kind(),
            size_bytes: entity.size_bytes,
            deleted: entity.is_deleted,
            location,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EntityList {
    pub count: usize,
    pub entities: Vec<EntityView>,
}

/// Body of `PUT /v1/entities`; exactly one of `location` / `inline`
#[derive(Debug, Deserialize)]
pub struct EntityUpsert {
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub location: Option<PathBuf>,
    #[serde(default)]
    pub inline: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CacheView {
    pub content_root: String,
    pub max_chunk_size: u64,
    pub store_lookups: u64,
    #[serde(flatten)]
    pub stats: CacheStats,
}
