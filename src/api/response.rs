// API response utility functions module

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::error::CatalogError;
use crate::logger;

/// Build JSON response
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    let json = match serde_json::to_string_pretty(body) {
        Ok(j) => j,
        Err(e) => {
            logger::log_error(&format!("Failed to serialize response: {e}"));
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
        }
    };

    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(json)))
        .unwrap_or_else(|e| {
            logger::log_error(&format!("Failed to build response: {e}"));
            Response::new(Full::new(Bytes::from("Error")))
        })
}

/// JSON error body with the given status
pub fn error_response(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    let body = serde_json::json!({ "error": message });
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap_or_else(|_| Response::new(Full::new(Bytes::from("Error"))))
}

/// 404 Not Found response
pub fn not_found() -> Response<Full<Bytes>> {
    error_response(StatusCode::NOT_FOUND, "Not Found")
}

/// 400 Bad Request response
pub fn bad_request(message: &str) -> Response<Full<Bytes>> {
    error_response(StatusCode::BAD_REQUEST, message)
}

impl CatalogError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidPayload(_) | Self::Location(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::OutsideRoot(_) => StatusCode::FORBIDDEN,
        }
    }

    pub fn into_response(self) -> Response<Full<Bytes>> {
        error_response(self.status(), &self.to_string())
    }
}
