//! Delivery engine
//!
//! Resolves a request path to a live entity through the existence cache and
//! the backing resolver, then answers with the full payload, one byte window,
//! or a 416. Paths without a live entity are handed back to the caller as a
//! pass-through instead of producing a status.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::cache::ExistenceCache;
use crate::error::DeliveryError;
use crate::http::{self, mime, range, RangeOutcome};
use crate::store::{ContentEntity, ContentResolver, ContentSource, ResolvedPath};

/// Outcome of a delivery attempt
#[derive(Debug)]
pub enum Delivery {
    Served(Response<Full<Bytes>>),
    /// No live entity; the next handler in the pipeline decides
    PassThrough,
}

pub struct DeliveryEngine {
    root: String,
    max_chunk: u64,
    cache: Arc<ExistenceCache>,
    resolver: Arc<dyn ContentResolver>,
}

impl DeliveryEngine {
    pub fn new(
        root: impl Into<String>,
        max_chunk: u64,
        cache: Arc<ExistenceCache>,
        resolver: Arc<dyn ContentResolver>,
    ) -> Self {
        Self {
            root: root.into(),
            max_chunk,
            cache,
            resolver,
        }
    }

    /// Serve a `GET` for `request_path`
    pub async fn handle(
        &self,
        request_path: &str,
        range_header: Option<&str>,
    ) -> Result<Delivery, DeliveryError> {
        self.deliver(request_path, range_header, false).await
    }

    /// Same as [`handle`](Self::handle) without reading the payload
    pub async fn handle_head(
        &self,
        request_path: &str,
        range_header: Option<&str>,
    ) -> Result<Delivery, DeliveryError> {
        self.deliver(request_path, range_header, true).await
    }

    async fn deliver(
        &self,
        request_path: &str,
        range_header: Option<&str>,
        is_head: bool,
    ) -> Result<Delivery, DeliveryError> {
        let path = ResolvedPath::resolve(&self.root, request_path);

        let Some(entity) = self.locate(&path).await? else {
            debug!(%path, "No live entity, passing through");
            return Ok(Delivery::PassThrough);
        };

        let response = self.respond(&entity, range_header, is_head).await?;
        Ok(Delivery::Served(response))
    }

    /// Find the live entity for a path, consulting the cache first
    async fn locate(&self, path: &ResolvedPath) -> Result<Option<ContentEntity>, DeliveryError> {
        if !self.cache.is_initialized() {
            debug!(%path, "Existence cache not ready, querying store");
            let found = self.resolver.lookup_by_full_path(path).await?;
            return Ok(found.filter(ContentEntity::is_live));
        }

        match self.cache.lookup(path) {
            Some(false) => Ok(None),
            Some(true) => {
                // Payload is never cached; fetch the current record
                let found = self.resolver.lookup_by_full_path(path).await?;
                if !found.as_ref().is_some_and(ContentEntity::is_live) {
                    warn!(%path, "Cached as live but store has no live record");
                }
                Ok(found.filter(ContentEntity::is_live))
            }
            None => {
                let found = self.resolver.lookup_by_full_path(path).await?;
                let live = found.as_ref().is_some_and(ContentEntity::is_live);
                let live = self.cache.populate(path.clone(), live);
                debug!(%path, live, "Existence cache populated");
                Ok(found.filter(|e| live && e.is_live()))
            }
        }
    }

    async fn respond(
        &self,
        entity: &ContentEntity,
        range_header: Option<&str>,
        is_head: bool,
    ) -> Result<Response<Full<Bytes>>, DeliveryError> {
        let content_type = mime::content_type_for(&entity.file_name);
        let source = ContentSource::open(&entity.payload).await?;
        let total = source.size();

        match range::parse_range_header(range_header, total, self.max_chunk) {
            RangeOutcome::NoRange => {
                let body = if is_head {
                    Bytes::new()
                } else {
                    source.read_all().await?
                };
                Ok(http::build_full_response(body, content_type, total, is_head))
            }
            RangeOutcome::Satisfiable(window) => {
                let body = if is_head {
                    Bytes::new()
                } else {
                    source.read_window(&window).await?
                };
                debug!(path = %entity.path, range = %window.content_range(), "Partial content");
                Ok(http::build_partial_response(body, content_type, &window, is_head))
            }
            RangeOutcome::Unsatisfiable => {
                debug!(path = %entity.path, header = ?range_header, "Range not satisfiable");
                let content_range = range::unsatisfiable_content_range(total, self.max_chunk);
                Ok(http::build_416_response(content_type, &content_range))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResolveError;
    use crate::notify::{NotificationBus, PersistenceMessage};
    use crate::store::ContentCatalog;
    use http_body_util::BodyExt;
    use hyper::StatusCode;
    use std::io::Write;

    const ROOT: &str = "/srv/Files";
    const CHUNK: u64 = 1_000_000;

    struct Fixture {
        cache: Arc<ExistenceCache>,
        catalog: Arc<ContentCatalog>,
        engine: DeliveryEngine,
    }

    fn fixture() -> Fixture {
        let bus = Arc::new(NotificationBus::new());
        let (cache, _) = ExistenceCache::attached(&bus);
        let catalog = Arc::new(ContentCatalog::new(ROOT, Arc::clone(&bus)));
        let resolver = Arc::clone(&catalog) as Arc<dyn ContentResolver>;
        let engine = DeliveryEngine::new(ROOT, CHUNK, Arc::clone(&cache), resolver);
        bus.publish(&PersistenceMessage::Startup);
        Fixture {
            cache,
            catalog,
            engine,
        }
    }

    fn megabyte_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let content: Vec<u8> = (0..1_000_000u32).map(|i| (i % 251) as u8).collect();
        file.write_all(&content).unwrap();
        file.flush().unwrap();
        file
    }

    async fn add_external(fx: &Fixture, request_path: &str, file: &tempfile::NamedTempFile) {
        let path = fx.catalog.resolve(request_path);
        let name = path.file_name().to_string();
        fx.catalog
            .upsert(ContentEntity::external(path, name, file.path(), 1_000_000))
            .await;
    }

    fn served(delivery: Delivery) -> Response<Full<Bytes>> {
        match delivery {
            Delivery::Served(response) => response,
            Delivery::PassThrough => panic!("Expected a served response"),
        }
    }

    fn header<'a>(response: &'a Response<Full<Bytes>>, name: &str) -> &'a str {
        response.headers()[name].to_str().unwrap()
    }

    async fn body(response: Response<Full<Bytes>>) -> Bytes {
        response.into_body().collect().await.unwrap().to_bytes()
    }

    #[tokio::test]
    async fn test_full_content_without_range() {
        let fx = fixture();
        let file = megabyte_file();
        add_external(&fx, "/movies/big.mp4", &file).await;

        let response = served(fx.engine.handle("/movies/big.mp4", None).await.unwrap());
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(header(&response, "content-length"), "1000000");
        assert_eq!(header(&response, "content-type"), "video/mp4");
        assert_eq!(body(response).await.len(), 1_000_000);
    }

    #[tokio::test]
    async fn test_open_ended_range() {
        let fx = fixture();
        let file = megabyte_file();
        add_external(&fx, "/movies/big.mp4", &file).await;

        let response = served(
            fx.engine
                .handle("/movies/big.mp4", Some("bytes=500000-"))
                .await
                .unwrap(),
        );
        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(header(&response, "content-range"), "bytes 500000-999999/1000000");
        assert_eq!(header(&response, "content-length"), "500000");
        assert_eq!(header(&response, "accept-ranges"), "bytes");

        let bytes = body(response).await;
        assert_eq!(bytes.len(), 500_000);
        assert_eq!(bytes[0], (500_000u32 % 251) as u8);
    }

    #[tokio::test]
    async fn test_multi_range_is_416() {
        let fx = fixture();
        let file = megabyte_file();
        add_external(&fx, "/movies/big.mp4", &file).await;

        let response = served(
            fx.engine
                .handle("/movies/big.mp4", Some("bytes=0-999999,900000-"))
                .await
                .unwrap(),
        );
        assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
        assert_eq!(header(&response, "content-range"), "bytes 0-999999/1000000");
        assert!(body(response).await.is_empty());
    }

    #[tokio::test]
    async fn test_explicit_window_length() {
        let fx = fixture();
        let path = fx.catalog.resolve("/notes.txt");
        fx.catalog
            .upsert(ContentEntity::inline(path, "notes.txt", "0123456789"))
            .await;

        let response = served(fx.engine.handle("/notes.txt", Some("bytes=2-5")).await.unwrap());
        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(header(&response, "content-length"), "4");
        assert_eq!(&body(response).await[..], b"2345");
    }

    #[tokio::test]
    async fn test_empty_inline_file_is_served() {
        let fx = fixture();
        let path = fx.catalog.resolve("/empty.bin");
        fx.catalog
            .upsert(ContentEntity::inline(path, "empty.bin", Bytes::new()))
            .await;

        let response = served(fx.engine.handle("/empty.bin", None).await.unwrap());
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(header(&response, "content-length"), "0");

        let response = served(fx.engine.handle("/empty.bin", Some("bytes=0-")).await.unwrap());
        assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
        assert_eq!(header(&response, "content-range"), "bytes */0");
    }

    #[tokio::test]
    async fn test_head_has_headers_only() {
        let fx = fixture();
        let file = megabyte_file();
        add_external(&fx, "/movies/big.mp4", &file).await;

        let response = served(
            fx.engine
                .handle_head("/movies/big.mp4", Some("bytes=0-99"))
                .await
                .unwrap(),
        );
        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(header(&response, "content-length"), "100");
        assert!(body(response).await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_path_passes_through_and_is_cached() {
        let fx = fixture();

        for _ in 0..3 {
            let delivery = fx.engine.handle("/nope.mp4", None).await.unwrap();
            assert!(matches!(delivery, Delivery::PassThrough));
        }
        // One miss query, then served from the cache
        assert_eq!(fx.catalog.lookup_count(), 1);
        assert_eq!(fx.cache.lookup(&fx.catalog.resolve("/nope.mp4")), Some(false));
    }

    #[tokio::test]
    async fn test_new_record_becomes_visible_through_notification() {
        let fx = fixture();
        assert!(matches!(
            fx.engine.handle("/later.txt", None).await.unwrap(),
            Delivery::PassThrough
        ));

        let path = fx.catalog.resolve("/later.txt");
        fx.catalog
            .upsert(ContentEntity::inline(path, "later.txt", "now here"))
            .await;

        let response = served(fx.engine.handle("/later.txt", None).await.unwrap());
        assert_eq!(&body(response).await[..], b"now here");
    }

    #[tokio::test]
    async fn test_soft_deleted_record_passes_through() {
        let fx = fixture();
        let path = fx.catalog.resolve("/gone.txt");
        fx.catalog
            .upsert(ContentEntity::inline(path.clone(), "gone.txt", "bye"))
            .await;
        assert!(matches!(
            fx.engine.handle("/gone.txt", None).await.unwrap(),
            Delivery::Served(_)
        ));

        fx.catalog.soft_delete(&path).await;
        let before = fx.catalog.lookup_count();
        assert!(matches!(
            fx.engine.handle("/gone.txt", None).await.unwrap(),
            Delivery::PassThrough
        ));
        assert_eq!(fx.catalog.lookup_count(), before);
    }

    #[tokio::test]
    async fn test_store_failure_is_not_cached() {
        let fx = fixture();
        fx.catalog.set_available(false);

        let result = fx.engine.handle("/x.bin", None).await;
        assert!(matches!(
            result,
            Err(DeliveryError::Resolve(ResolveError::Unavailable(_)))
        ));
        assert_eq!(fx.cache.lookup(&fx.catalog.resolve("/x.bin")), None);
    }

    #[tokio::test]
    async fn test_uninitialized_cache_queries_store_every_time() {
        let bus = Arc::new(NotificationBus::new());
        let (cache, _) = ExistenceCache::attached(&bus);
        let catalog = Arc::new(ContentCatalog::new(ROOT, Arc::clone(&bus)));
        let engine = DeliveryEngine::new(
            ROOT,
            CHUNK,
            Arc::clone(&cache),
            Arc::clone(&catalog) as Arc<dyn ContentResolver>,
        );

        for _ in 0..2 {
            assert!(matches!(
                engine.handle("/a.txt", None).await.unwrap(),
                Delivery::PassThrough
            ));
        }
        assert_eq!(catalog.lookup_count(), 2);
        assert_eq!(cache.stats().entries, 0);
    }

    #[tokio::test]
    async fn test_query_string_is_ignored() {
        let fx = fixture();
        let path = fx.catalog.resolve("/a.txt");
        fx.catalog
            .upsert(ContentEntity::inline(path, "a.txt", "abc"))
            .await;

        let response = served(fx.engine.handle("/a.txt?download=1", None).await.unwrap());
        assert_eq!(response.status(), StatusCode::OK);
    }
}
