//! Error types
//!
//! Failures that abort a single request, a management call, or startup.
//! A missing entity is not an error; it is a pass-through.

use std::io;

/// Backing store lookup failures
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The store did not answer; nothing may be recorded about the path
    #[error("backing store unavailable: {0}")]
    Unavailable(String),
    #[error("backing store I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Errors raised while serving content for a resolved entity
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error("content I/O error: {0}")]
    Io(#[from] io::Error),
    /// Payload ended before the requested window was filled
    #[error("short read: expected {expected} bytes, got {actual}")]
    ShortRead { expected: u64, actual: u64 },
    /// Window offset does not fit the platform's address space
    #[error("window offset {0} exceeds addressable memory")]
    WindowOverflow(u64),
}

/// Configuration loading and validation failures
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Source(#[from] config::ConfigError),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Management API request failures
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
    #[error("no record for {0}")]
    NotFound(String),
    #[error("location not readable: {0}")]
    Location(#[from] io::Error),
    #[error("location {0} is outside the content root")]
    OutsideRoot(String),
}
