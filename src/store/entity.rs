//! Content entity model

use hyper::body::Bytes;
use std::path::PathBuf;

use super::ResolvedPath;

/// Where an entity's bytes live
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Bytes held by the store itself; may legitimately be empty
    Inline(Bytes),
    /// File in secondary storage
    External(PathBuf),
}

impl Payload {
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Inline(_) => "inline",
            Self::External(_) => "external",
        }
    }
}

/// A stored file: metadata plus payload reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentEntity {
    pub path: ResolvedPath,
    pub file_name: String,
    pub payload: Payload,
    /// Size recorded by the store; serving uses the payload's real length
    pub size_bytes: u64,
    /// Soft-delete flag
    pub is_deleted: bool,
}

impl ContentEntity {
    pub fn inline(path: ResolvedPath, file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let data = data.into();
        Self {
            path,
            file_name: file_name.into(),
            size_bytes: data.len() as u64,
            payload: Payload::Inline(data),
            is_deleted: false,
        }
    }

    pub fn external(
        path: ResolvedPath,
        file_name: impl Into<String>,
        location: impl Into<PathBuf>,
        size_bytes: u64,
    ) -> Self {
        Self {
            path,
            file_name: file_name.into(),
            payload: Payload::External(location.into()),
            size_bytes,
            is_deleted: false,
        }
    }

    /// Whether the record should be served
    pub const fn is_live(&self) -> bool {
        !self.is_deleted
    }
}
