//! Request routing dispatch module
//!
//! Entry point for content requests: method validation, header extraction,
//! delivery, and the fallback handler for paths the engine passes through.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::RANGE;
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Instant;

use super::delivery::Delivery;
use crate::config::AppState;
use crate::http;
use crate::logger;

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let (parts, _) = req.into_parts();
    let method = parts.method;
    let path = parts.uri.path();

    let response = match method {
        Method::GET | Method::HEAD => {
            let range_header = parts.headers.get(RANGE).and_then(|v| v.to_str().ok());
            let is_head = method == Method::HEAD;
            serve_content(&state, path, range_header, is_head).await
        }
        Method::OPTIONS => http::build_options_response(),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            http::build_405_response()
        }
    };

    if state.access_log_enabled() {
        logger::log_access(&method, path, response.status(), started.elapsed());
    }
    Ok(response)
}

async fn serve_content(
    state: &AppState,
    path: &str,
    range_header: Option<&str>,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let result = if is_head {
        state.engine.handle_head(path, range_header).await
    } else {
        state.engine.handle(path, range_header).await
    };

    match result {
        Ok(Delivery::Served(response)) => response,
        Ok(Delivery::PassThrough) => next_handler(path),
        Err(e) => {
            logger::log_error(&format!("Failed to deliver '{path}': {e}"));
            http::build_500_response()
        }
    }
}

/// Terminal handler of the pipeline
fn next_handler(path: &str) -> Response<Full<Bytes>> {
    logger::log_pass_through(path);
    http::build_404_response()
}
