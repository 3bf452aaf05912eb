// Management API handlers

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::response::json_response;
use super::types::{CacheView, EntityList, EntityUpsert, EntityView};
use crate::config::AppState;
use crate::error::CatalogError;
use crate::store::ContentEntity;

/// List every catalog record
pub async fn handle_list(state: Arc<AppState>) -> Response<Full<Bytes>> {
    let entities: Vec<EntityView> = state.catalog.list().await.iter().map(EntityView::from).collect();
    json_response(
        StatusCode::OK,
        &EntityList {
            count: entities.len(),
            entities,
        },
    )
}

/// Create or replace a record; the catalog notifies the existence cache
pub async fn handle_upsert(
    state: Arc<AppState>,
    request_path: &str,
    body: &[u8],
) -> Result<Response<Full<Bytes>>, CatalogError> {
    let upsert: EntityUpsert = serde_json::from_slice(body)
        .map_err(|e| CatalogError::InvalidPayload(format!("Invalid JSON: {e}")))?;

    let path = state.catalog.resolve(request_path);
    let file_name = upsert
        .file_name
        .unwrap_or_else(|| path.file_name().to_string());

    let entity = match (upsert.location, upsert.inline) {
        (Some(location), None) => {
            let location = confined_location(state.catalog.root(), &location).await?;
            let size = tokio::fs::metadata(&location).await?.len();
            ContentEntity::external(path, file_name, location, size)
        }
        (None, Some(text)) => ContentEntity::inline(path, file_name, text),
        _ => {
            return Err(CatalogError::InvalidPayload(
                "exactly one of 'location' or 'inline' is required".to_string(),
            ))
        }
    };

    let view = EntityView::from(&entity);
    state.catalog.upsert(entity).await;
    Ok(json_response(StatusCode::OK, &view))
}

/// Canonical form of `location`, which must lie under the content root
async fn confined_location(root: &str, location: &Path) -> Result<PathBuf, CatalogError> {
    let location = tokio::fs::canonicalize(location).await?;
    let root = tokio::fs::canonicalize(root).await?;
    if !location.starts_with(&root) {
        return Err(CatalogError::OutsideRoot(location.display().to_string()));
    }
    Ok(location)
}

/// Soft-delete a record
pub async fn handle_delete(
    state: Arc<AppState>,
    request_path: &str,
) -> Result<Response<Full<Bytes>>, CatalogError> {
    let path = state.catalog.resolve(request_path);
    if !state.catalog.soft_delete(&path).await {
        return Err(CatalogError::NotFound(path.to_string()));
    }
    Ok(json_response(
        StatusCode::OK,
        &serde_json::json!({ "path": path.to_string(), "deleted": true }),
    ))
}

/// Existence cache statistics
pub fn handle_cache_stats(state: &AppState) -> Response<Full<Bytes>> {
    json_response(
        StatusCode::OK,
        &CacheView {
            content_root: state.catalog.root().to_string(),
            max_chunk_size: state.config.delivery.max_chunk_size,
            store_lookups: state.catalog.lookup_count(),
            stats: state.cache.stats(),
        },
    )
}
