//! Content source
//!
//! Opens a payload and reads it into a single buffer, either whole or one
//! seeked window at a time.

use hyper::body::Bytes;
use std::io::SeekFrom;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

use super::Payload;
use crate::error::DeliveryError;
use crate::http::RangeWindow;

/// An opened payload with its authoritative size
#[derive(Debug)]
pub enum ContentSource {
    Inline(Bytes),
    File { file: File, size: u64 },
}

impl ContentSource {
    /// Open the payload; external files report their current on-disk size
    pub async fn open(payload: &Payload) -> Result<Self, DeliveryError> {
        match payload {
            Payload::Inline(data) => Ok(Self::Inline(data.clone())),
            Payload::External(location) => {
                let file = File::open(location).await?;
                let size = file.metadata().await?.len();
                Ok(Self::File { file, size })
            }
        }
    }

    pub fn size(&self) -> u64 {
        match self {
            Self::Inline(data) => data.len() as u64,
            Self::File { size, .. } => *size,
        }
    }

    /// Read the whole payload
    pub async fn read_all(self) -> Result<Bytes, DeliveryError> {
        match self {
            Self::Inline(data) => Ok(data),
            Self::File { mut file, size } => read_exactly(&mut file, size).await,
        }
    }

    /// Seek to `window.start` and read exactly `window.length()` bytes
    pub async fn read_window(self, window: &RangeWindow) -> Result<Bytes, DeliveryError> {
        match self {
            Self::Inline(data) => {
                let start = to_usize(window.start)?;
                let end = to_usize(window.end)?;
                if end >= data.len() {
                    return Err(DeliveryError::ShortRead {
                        expected: window.length(),
                        actual: (data.len() as u64).saturating_sub(window.start),
                    });
                }
                Ok(data.slice(start..=end))
            }
            Self::File { mut file, .. } => {
                file.seek(SeekFrom::Start(window.start)).await?;
                read_exactly(&mut file, window.length()).await
            }
        }
    }
}

async fn read_exactly(file: &mut File, length: u64) -> Result<Bytes, DeliveryError> {
    let mut buffer = Vec::with_capacity(to_usize(length)?);
    let read = file.take(length).read_to_end(&mut buffer).await? as u64;
    if read != length {
        return Err(DeliveryError::ShortRead {
            expected: length,
            actual: read,
        });
    }
    Ok(Bytes::from(buffer))
}

fn to_usize(value: u64) -> Result<usize, DeliveryError> {
    usize::try_from(value).map_err(|_| DeliveryError::WindowOverflow(value))
}
