// Management API module entry
// Catalog maintenance and cache inspection, served on the API listener

mod handlers;
mod response;
mod types;

use http_body_util::{BodyExt, Full};
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::fmt::Display;
use std::sync::Arc;

use crate::config::AppState;
use crate::logger;

pub use response::{bad_request, error_response, json_response, not_found};
pub use types::{CacheView, EntityList, EntityUpsert, EntityView};

/// API route handler
///
/// Dispatches to handler functions based on request path and method
pub async fn handle_api_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body,
    B::Error: Display,
{
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let target = query_param(req.uri().query(), "path");

    let response = match (&method, path.as_str(), target) {
        (&Method::GET, "/v1/entities", _) => handlers::handle_list(state).await,
        (&Method::GET, "/v1/cache", _) => handlers::handle_cache_stats(&state),
        (&Method::PUT, "/v1/entities", Some(target)) => {
            match req.into_body().collect().await {
                Ok(collected) => {
                    let body = collected.to_bytes();
                    handlers::handle_upsert(state, &target, &body)
                        .await
                        .unwrap_or_else(crate::error::CatalogError::into_response)
                }
                Err(e) => bad_request(&format!("Failed to read request body: {e}")),
            }
        }
        (&Method::DELETE, "/v1/entities", Some(target)) => {
            handlers::handle_delete(state, &target)
                .await
                .unwrap_or_else(crate::error::CatalogError::into_response)
        }
        (&Method::PUT | &Method::DELETE, "/v1/entities", None) => {
            bad_request("missing 'path' query parameter")
        }
        _ => not_found(),
    };

    logger::log_api_request(method.as_str(), &path, response.status().as_u16());
    Ok(response)
}

/// Decoded value of a query parameter
fn query_param(query: Option<&str>, name: &str) -> Option<String> {
    query?
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == name)
        .and_then(|(_, value)| {
            urlencoding::decode(&value.replace('+', " "))
                .ok()
                .map(std::borrow::Cow::into_owned)
        })
}
