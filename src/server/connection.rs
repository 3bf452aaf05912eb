// Connection handling module
// Accepts TCP connections and serves each one on its own task

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use crate::api;
use crate::config::AppState;
use crate::handler;
use crate::logger;

const ACCEPT_BACKOFF: Duration = Duration::from_millis(50);

/// Which request pipeline a listener feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    /// Range-aware content delivery
    Content,
    /// Catalog and cache management API
    Management,
}

/// Accept loop for one listener; runs until the task is dropped
pub async fn run(listener: TcpListener, state: Arc<AppState>, kind: ServiceKind) {
    let active = Arc::new(AtomicUsize::new(0));
    loop {
        match listener.accept().await {
            Ok((stream, peer_addr)) => {
                accept_connection(stream, peer_addr, &state, &active, kind);
            }
            Err(e) => {
                logger::log_warning(&format!("Failed to accept connection ({kind:?}): {e}"));
                // Back off so fd exhaustion does not spin the loop
                tokio::time::sleep(ACCEPT_BACKOFF).await;
            }
        }
    }
}

/// Check the connection limit, then hand the stream to a spawned task
fn accept_connection(
    stream: tokio::net::TcpStream,
    peer_addr: std::net::SocketAddr,
    state: &Arc<AppState>,
    conn_counter: &Arc<AtomicUsize>,
    kind: ServiceKind,
) {
    // Increment first so concurrent accepts cannot both slip under the limit
    let prev_count = conn_counter.fetch_add(1, Ordering::SeqCst);

    if kind == ServiceKind::Content {
        if let Some(max_conn) = state.config.performance.max_connections {
            if prev_count >= usize::try_from(max_conn).unwrap_or(usize::MAX) {
                conn_counter.fetch_sub(1, Ordering::SeqCst);
                logger::log_warning(&format!(
                    "Max connections reached: {prev_count}/{max_conn}. Rejected {peer_addr}"
                ));
                drop(stream);
                return;
            }
        }
    }

    handle_connection(stream, Arc::clone(state), Arc::clone(conn_counter), kind);
}

fn handle_connection(
    stream: tokio::net::TcpStream,
    state: Arc<AppState>,
    conn_counter: Arc<AtomicUsize>,
    kind: ServiceKind,
) {
    tokio::spawn(async move {
        let io = TokioIo::new(stream);
        let timeout = Duration::from_secs(state.config.performance.connection_timeout);

        let mut builder = http1::Builder::new();
        builder.keep_alive(state.config.performance.keep_alive);

        let service_state = Arc::clone(&state);
        let conn = builder.serve_connection(
            io,
            service_fn(move |req| {
                let state = Arc::clone(&service_state);
                async move {
                    match kind {
                        ServiceKind::Content => handler::handle_request(req, state).await,
                        ServiceKind::Management => api::handle_api_request(req, state).await,
                    }
                }
            }),
        );

        match tokio::time::timeout(timeout, conn).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => logger::log_connection_error(&err),
            Err(_) => logger::log_warning(&format!(
                "Connection timeout after {} seconds ({kind:?})",
                timeout.as_secs()
            )),
        }

        conn_counter.fetch_sub(1, Ordering::SeqCst);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::server::create_listener;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    async fn spawn_server(kind: ServiceKind, content_root: &std::path::Path) -> std::net::SocketAddr {
        let mut config = Config::load_from("/nonexistent/rangeserve/config").unwrap();
        config.delivery.content_root = Some(content_root.to_string_lossy().into_owned());
        config.delivery.max_chunk_size = 4;
        let state = Arc::new(AppState::new(config));
        state.start().await.unwrap();

        let listener = create_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(run(listener, state, kind));
        addr
    }

    async fn roundtrip(addr: std::net::SocketAddr, request: &str) -> String {
        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut buf = Vec::new();
        stream.read_to_end(&mut buf).await.unwrap();
        String::from_utf8_lossy(&buf).into_owned()
    }

    #[tokio::test]
    async fn test_serves_range_over_tcp() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("clip.mp4"), b"0123456789").unwrap();
        let addr = spawn_server(ServiceKind::Content, dir.path()).await;

        let response = roundtrip(
            addr,
            "GET /clip.mp4 HTTP/1.1\r\nHost: x\r\nRange: bytes=2-\r\nConnection: close\r\n\r\n",
        )
        .await;
        assert!(response.starts_with("HTTP/1.1 206"), "{response}");
        assert!(response.contains("content-range: bytes 2-6/10"), "{response}");
        assert!(response.ends_with("23456"), "{response}");
    }

    #[tokio::test]
    async fn test_management_listener_routes_api() {
        let dir = tempfile::tempdir().unwrap();
        let addr = spawn_server(ServiceKind::Management, dir.path()).await;

        let response = roundtrip(
            addr,
            "GET /v1/cache HTTP/1.1\r\nHost: x\r\nConnection: close\r\n\r\n",
        )
        .await;
        assert!(response.starts_with("HTTP/1.1 200"), "{response}");
        assert!(response.contains("\"initialized\": true"), "{response}");
    }
}
