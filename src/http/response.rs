//! HTTP response building module
//!
//! Builders for the statuses the content server emits. Builders never fail;
//! a header build error is logged and an empty response of the same status
//! is returned instead.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};

use super::range::RangeWindow;

/// Build 200 OK response carrying the whole payload
pub fn build_full_response(
    data: Bytes,
    content_type: &str,
    total_size: u64,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let body = if is_head { Bytes::new() } else { data };

    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", content_type)
        .header("Content-Length", total_size)
        .header("Accept-Ranges", "bytes")
        .body(Full::new(body))
        .unwrap_or_else(|e| fallback(StatusCode::OK, &e))
}

/// Build 206 Partial Content response for a single window
pub fn build_partial_response(
    data: Bytes,
    content_type: &str,
    window: &RangeWindow,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let body = if is_head { Bytes::new() } else { data };

    Response::builder()
        .status(StatusCode::PARTIAL_CONTENT)
        .header("Content-Type", content_type)
        .header("Content-Length", window.length())
        .header("Content-Range", window.content_range())
        .header("Accept-Ranges", "bytes")
        .body(Full::new(body))
        .unwrap_or_else(|e| fallback(StatusCode::PARTIAL_CONTENT, &e))
}

/// Build 416 Range Not Satisfiable response with a diagnostic `Content-Range`
pub fn build_416_response(content_type: &str, content_range: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::RANGE_NOT_SATISFIABLE)
        .header("Content-Type", content_type)
        .header("Content-Range", content_range)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| fallback(StatusCode::RANGE_NOT_SATISFIABLE, &e))
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<Full<Bytes>> {
    plain_text(StatusCode::NOT_FOUND, "404 Not Found")
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<Full<Bytes>> {
    let mut response = plain_text(StatusCode::METHOD_NOT_ALLOWED, "405 Method Not Allowed");
    response
        .headers_mut()
        .insert(hyper::header::ALLOW, hyper::header::HeaderValue::from_static("GET, HEAD, OPTIONS"));
    response
}

/// Build OPTIONS response
pub fn build_options_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Allow", "GET, HEAD, OPTIONS")
        .header("Accept-Ranges", "bytes")
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| fallback(StatusCode::NO_CONTENT, &e))
}

/// Build 500 Internal Server Error response
pub fn build_500_response() -> Response<Full<Bytes>> {
    plain_text(StatusCode::INTERNAL_SERVER_ERROR, "500 Internal Server Error")
}

fn plain_text(status: StatusCode, text: &'static str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("Content-Type", "text/plain")
        .body(Full::new(Bytes::from_static(text.as_bytes())))
        .unwrap_or_else(|e| fallback(status, &e))
}

/// Log response build error and produce an empty response
fn fallback(status: StatusCode, error: &hyper::http::Error) -> Response<Full<Bytes>> {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = status;
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header<'a>(response: &'a Response<Full<Bytes>>, name: &str) -> &'a str {
        response.headers()[name].to_str().unwrap()
    }

    #[test]
    fn test_full_response_headers() {
        let response = build_full_response(Bytes::from_static(b"hello"), "text/plain", 5, false);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(header(&response, "content-length"), "5");
        assert_eq!(header(&response, "accept-ranges"), "bytes");
    }

    #[test]
    fn test_partial_response_headers() {
        let window = RangeWindow { start: 10, end: 19, total: 100 };
        let response = build_partial_response(Bytes::from(vec![0; 10]), "video/mp4", &window, false);
        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(header(&response, "content-range"), "bytes 10-19/100");
        assert_eq!(header(&response, "content-length"), "10");
        assert_eq!(header(&response, "content-type"), "video/mp4");
    }

    #[test]
    fn test_416_response() {
        let response = build_416_response("video/mp4", "bytes 0-99/100");
        assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
        assert_eq!(header(&response, "content-range"), "bytes 0-99/100");
    }

    #[test]
    fn test_405_lists_allowed_methods() {
        let response = build_405_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(header(&response, "allow"), "GET, HEAD, OPTIONS");
    }
}
