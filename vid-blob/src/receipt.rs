use serde::{Deserialize, Serialize};

use crate::{BlobKey, ByteStream, ObjectHead};

/// Receipt returned after successfully storing a blob
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlobReceipt {
    pub key: BlobKey,
    pub size_bytes: u64,
    pub content_type: Option<String>,
    pub filename: Option<String>,
}

impl BlobReceipt {
    /// Create a new blob receipt
    pub fn new(key: BlobKey, size_bytes: u64) -> Self {
        Self {
            key,
            size_bytes,
            content_type: None,
            filename: None,
        }
    }

    /// Set content type
    pub fn with_content_type<S: Into<String>>(mut self, content_type: S) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Set filename
    pub fn with_filename<S: Into<String>>(mut self, filename: S) -> Self {
        self.filename = Some(filename.into());
        self
    }
}

/// A byte window checked against the size of the blob it was resolved for.
///
/// Invariant: `start <= end < total_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRange {
    pub start: u64,
    pub end: u64,
    pub total_size: u64,
}

impl ResolvedRange {
    pub fn content_length(&self) -> u64 {
        self.end - self.start + 1
    }

    pub fn is_full_content(&self) -> bool {
        self.start == 0 && self.end + 1 == self.total_size
    }

    /// Value for the `Content-Range` response header.
    pub fn content_range(&self) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, self.total_size)
    }
}

/// Result of opening a blob for reading
pub struct OpenedBlob {
    pub key: BlobKey,
    pub head: ObjectHead,
    pub content_type: String,
    pub stream: ByteStream,
    /// Set when a range was requested; the stream then carries only that window.
    pub range: Option<ResolvedRange>,
}

impl OpenedBlob {
    /// Check if this is a partial content response
    pub fn is_partial(&self) -> bool {
        self.range.is_some()
    }

    /// Number of bytes the stream will yield
    pub fn content_length(&self) -> u64 {
        self.range
            .map_or(self.head.size_bytes, |r| r.content_length())
    }
}

impl std::fmt::Debug for OpenedBlob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenedBlob")
            .field("key", &self.key)
            .field("head", &self.head)
            .field("content_type", &self.content_type)
            .field("range", &self.range)
            .finish_non_exhaustive()
    }
}
