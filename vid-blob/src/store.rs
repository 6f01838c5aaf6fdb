use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{BlobError, BlobKey, BlobResult, ByteStream, ResolvedRange};

/// Core blob storage operations - must be implemented by all storage backends
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store a blob from a stream.
    ///
    /// The blob must not become readable under `key` unless the whole stream
    /// was written; a failed put leaves nothing behind.
    async fn put(
        &self,
        key: &BlobKey,
        content_type: Option<&str>,
        stream: ByteStream,
    ) -> BlobResult<PutResult>;

    /// Get a blob as a stream, optionally restricted to a resolved range.
    ///
    /// Every call reads through its own handle; concurrent gets never share
    /// a cursor.
    async fn get(&self, key: &BlobKey, range: Option<ResolvedRange>) -> BlobResult<GetResult>;

    /// Get blob metadata without content. Always reads fresh.
    async fn head(&self, key: &BlobKey) -> BlobResult<ObjectHead>;
}

/// Result of a successful put operation
#[derive(Debug, Clone)]
pub struct PutResult {
    pub size_bytes: u64,
}

/// Result of a get operation
pub struct GetResult {
    pub stream: ByteStream,
    pub resolved_range: Option<ResolvedRange>,
}

/// Metadata about a blob
#[derive(Debug, Clone)]
pub struct ObjectHead {
    pub size_bytes: u64,
    pub content_type: Option<String>,
}

/// Strategy for generating blob keys
pub trait BlobKeyStrategy: Send + Sync {
    /// Generate a key for a newly uploaded blob from its client filename
    fn object_key(&self, filename: &str) -> BlobResult<BlobKey>;
}

/// Default key strategy: `<upload time in ms>-<original filename>`.
///
/// Only the final path component of the client filename is kept. Two uploads
/// of the same name within the same millisecond map to the same key.
#[derive(Debug, Clone, Default)]
pub struct TimestampKeyStrategy;

impl TimestampKeyStrategy {
    pub fn key_at(&self, filename: &str, now: DateTime<Utc>) -> BlobResult<BlobKey> {
        let base = base_name(filename)
            .ok_or_else(|| BlobError::invalid(format!("Invalid filename: {:?}", filename)))?;

        let name = format!("{}-{}", now.timestamp_millis(), base);
        BlobKey::parse(&name).ok_or_else(|| BlobError::invalid("Invalid filename"))
    }
}

impl BlobKeyStrategy for TimestampKeyStrategy {
    fn object_key(&self, filename: &str) -> BlobResult<BlobKey> {
        self.key_at(filename, Utc::now())
    }
}

fn base_name(filename: &str) -> Option<&str> {
    let base = filename
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or_default()
        .trim();

    match base {
        "" | "." | ".." => None,
        base => Some(base),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(ms: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(ms).unwrap()
    }

    #[test]
    fn keys_are_timestamp_prefixed() {
        let key = TimestampKeyStrategy
            .key_at("holiday.mp4", at(1_700_000_000_123))
            .unwrap();
        assert_eq!(key.as_str(), "1700000000123-holiday.mp4");
    }

    #[test]
    fn directories_in_client_filenames_are_dropped() {
        let key = TimestampKeyStrategy
            .key_at("../../etc/passwd", at(5))
            .unwrap();
        assert_eq!(key.as_str(), "5-passwd");

        let key = TimestampKeyStrategy
            .key_at("C:\\Users\\me\\clip.mp4", at(5))
            .unwrap();
        assert_eq!(key.as_str(), "5-clip.mp4");
    }

    #[test]
    fn filenames_too_long_for_the_disk_are_rejected() {
        let name = format!("{}.mp4", "a".repeat(300));
        assert!(matches!(
            TimestampKeyStrategy.key_at(&name, at(1_700_000_000_000)),
            Err(BlobError::Invalid { .. })
        ));

        // The timestamp prefix counts toward the limit.
        let fits = "a".repeat(crate::MAX_KEY_BYTES - "1700000000000-".len());
        assert!(TimestampKeyStrategy.key_at(&fits, at(1_700_000_000_000)).is_ok());
        let spills = format!("{}a", fits);
        assert!(TimestampKeyStrategy.key_at(&spills, at(1_700_000_000_000)).is_err());
    }

    #[test]
    fn empty_or_dot_filenames_are_rejected() {
        for name in ["", "  ", ".", "..", "videos/", "a/.."] {
            assert!(
                matches!(TimestampKeyStrategy.key_at(name, at(1)), Err(BlobError::Invalid { .. })),
                "{name:?} should be rejected"
            );
        }
    }
}
