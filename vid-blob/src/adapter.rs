use std::sync::Arc;

use futures_util::StreamExt;

use crate::{
    BlobConfig, BlobError, BlobKey, BlobKeyStrategy, BlobPut, BlobReceipt, BlobResult, BlobStore,
    ByteRange, ByteStream, ObjectHead, OpenedBlob, RangeError, SizeLimitExceeded,
    TimestampKeyStrategy,
};

/// The main blob adapter - validation, naming and range resolution on top
/// of a [`BlobStore`].
#[derive(Clone)]
pub struct BlobAdapter {
    store: Arc<dyn BlobStore>,
    keys: Arc<dyn BlobKeyStrategy>,
    config: BlobConfig,
}

impl BlobAdapter {
    /// Create a new blob adapter with timestamp-prefixed keys
    pub fn new<S: BlobStore + 'static>(store: S, config: BlobConfig) -> Self {
        Self {
            store: Arc::new(store),
            keys: Arc::new(TimestampKeyStrategy),
            config,
        }
    }

    /// Create with custom key strategy
    pub fn with_key_strategy<S: BlobStore + 'static, K: BlobKeyStrategy + 'static>(
        store: S,
        keys: K,
        config: BlobConfig,
    ) -> Self {
        Self {
            store: Arc::new(store),
            keys: Arc::new(keys),
            config,
        }
    }

    /// Check an upload's declared metadata before any byte is read.
    pub fn validate(&self, put: &BlobPut) -> BlobResult<()> {
        let content_type = put.content_type.as_deref().unwrap_or_default();
        if !self.config.accepts(content_type) {
            return Err(BlobError::unsupported_content_type(content_type));
        }

        Ok(())
    }

    /// Store a blob from a stream (single-shot upload)
    pub async fn put(&self, put: BlobPut, body: ByteStream) -> BlobResult<BlobReceipt> {
        self.validate(&put)?;

        let filename = put
            .filename
            .as_deref()
            .ok_or_else(|| BlobError::invalid("Missing filename"))?;
        let key = self.keys.object_key(filename)?;

        let body = limit_stream(body, self.config.max_blob_bytes);
        let result = self
            .store
            .put(&key, put.content_type.as_deref(), body)
            .await
            .map_err(BlobError::surface_size_limit)?;

        tracing::info!(key = %key, size = result.size_bytes, "blob stored");

        let mut receipt = BlobReceipt::new(key, result.size_bytes);
        if let Some(ct) = put.content_type {
            receipt = receipt.with_content_type(ct);
        }
        if let Some(filename) = put.filename {
            receipt = receipt.with_filename(filename);
        }

        Ok(receipt)
    }

    /// Open a blob for reading, optionally restricted to a byte range.
    ///
    /// Existence and size are checked first; a missing blob never gets a
    /// read handle. The range is resolved against that fresh size.
    pub async fn open(&self, name: &str, range: Option<ByteRange>) -> BlobResult<OpenedBlob> {
        let (key, head) = self.locate(name).await?;
        self.read(key, head, range).await
    }

    /// Like [`BlobAdapter::open`], taking the raw `Range` header value.
    ///
    /// The header is only looked at once the blob is known to exist, so a
    /// missing blob is `NotFound` whatever the header says. A multi-range
    /// request is reported as unsatisfiable against the current size.
    pub async fn open_with_range_header(
        &self,
        name: &str,
        header: Option<&str>,
    ) -> BlobResult<OpenedBlob> {
        let (key, head) = self.locate(name).await?;

        let range = match header.map(ByteRange::parse) {
            None => None,
            Some(Ok(range)) => Some(range),
            Some(Err(RangeError::MultipleRanges)) => {
                return Err(BlobError::RangeNotSatisfiable {
                    size: head.size_bytes,
                })
            }
            Some(Err(e)) => return Err(e.into()),
        };

        self.read(key, head, range).await
    }

    async fn locate(&self, name: &str) -> BlobResult<(BlobKey, ObjectHead)> {
        let key = BlobKey::parse(name).ok_or_else(|| BlobError::not_found(name))?;
        let head = self.store.head(&key).await?;
        Ok((key, head))
    }

    async fn read(
        &self,
        key: BlobKey,
        head: ObjectHead,
        range: Option<ByteRange>,
    ) -> BlobResult<OpenedBlob> {
        let resolved = match range {
            Some(range) => Some(range.resolve(head.size_bytes).ok_or(
                BlobError::RangeNotSatisfiable {
                    size: head.size_bytes,
                },
            )?),
            None => None,
        };

        if let Some(r) = &resolved {
            tracing::debug!(key = %key, start = r.start, end = r.end, total = r.total_size, "range resolved");
        }

        let get_result = self.store.get(&key, resolved).await?;
        let content_type = head
            .content_type
            .clone()
            .unwrap_or_else(|| self.config.default_content_type.clone());

        Ok(OpenedBlob {
            key,
            head,
            content_type,
            stream: get_result.stream,
            range: get_result.resolved_range,
        })
    }
}

/// Pass a byte stream through, failing it once more than `limit` bytes went by.
fn limit_stream(mut body: ByteStream, limit: u64) -> ByteStream {
    let stream = async_stream::stream! {
        let mut seen = 0u64;
        while let Some(chunk) = body.next().await {
            match chunk {
                Ok(bytes) => {
                    seen += bytes.len() as u64;
                    if seen > limit {
                        yield Err(std::io::Error::other(SizeLimitExceeded { limit }));
                        return;
                    }
                    yield Ok(bytes);
                }
                Err(e) => {
                    yield Err(e);
                    return;
                }
            }
        }
    };
    Box::pin(stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FsBlobStore;
    use bytes::Bytes;
    use futures_util::stream;

    fn adapter(dir: &std::path::Path, max: u64) -> BlobAdapter {
        BlobAdapter::new(
            FsBlobStore::new(dir),
            BlobConfig::default().with_max_blob_bytes(max),
        )
    }

    fn body(data: Vec<u8>) -> ByteStream {
        let chunks: Vec<Result<Bytes, std::io::Error>> = data
            .chunks(7)
            .map(|c| Ok(Bytes::copy_from_slice(c)))
            .collect();
        Box::pin(stream::iter(chunks))
    }

    fn mp4(name: &str) -> BlobPut {
        BlobPut::new()
            .with_content_type("video/mp4")
            .with_filename(name)
    }

    async fn read_all(mut stream: ByteStream) -> Vec<u8> {
        let mut out = Vec::new();
        while let Some(chunk) = stream.next().await {
            out.extend_from_slice(&chunk.unwrap());
        }
        out
    }

    fn file_count(dir: &std::path::Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[tokio::test]
    async fn put_names_blob_after_timestamp_and_filename() {
        let dir = tempfile::tempdir().unwrap();
        let blobs = adapter(dir.path(), 1000);

        let receipt = blobs.put(mp4("clip.mp4"), body(vec![1u8; 50])).await.unwrap();

        assert!(receipt.key.as_str().ends_with("-clip.mp4"));
        let (millis, _) = receipt.key.as_str().split_once('-').unwrap();
        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(receipt.size_bytes, 50);
        assert_eq!(receipt.content_type.as_deref(), Some("video/mp4"));
        assert!(dir.path().join(receipt.key.as_str()).is_file());
    }

    struct FixedKeys;

    impl BlobKeyStrategy for FixedKeys {
        fn object_key(&self, filename: &str) -> BlobResult<BlobKey> {
            TimestampKeyStrategy.key_at(filename, chrono::DateTime::from_timestamp_millis(42).unwrap())
        }
    }

    #[tokio::test]
    async fn key_strategy_is_pluggable() {
        let dir = tempfile::tempdir().unwrap();
        let blobs = BlobAdapter::with_key_strategy(
            FsBlobStore::new(dir.path()),
            FixedKeys,
            BlobConfig::default(),
        );

        let receipt = blobs
            .put(mp4("../clips/a.mp4"), body(vec![7u8; 20]))
            .await
            .unwrap();
        assert_eq!(receipt.key.as_str(), "42-a.mp4");
        assert_eq!(receipt.filename.as_deref(), Some("../clips/a.mp4"));

        let opened = blobs.open("42-a.mp4", None).await.unwrap();
        assert_eq!(read_all(opened.stream).await, vec![7u8; 20]);
    }

    #[tokio::test]
    async fn wrong_content_type_is_rejected_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let blobs = adapter(dir.path(), 1000);

        let put = BlobPut::new()
            .with_content_type("image/png")
            .with_filename("cat.png");
        let err = blobs.put(put, body(vec![0u8; 10])).await.unwrap_err();

        assert!(matches!(err, BlobError::UnsupportedContentType { content_type } if content_type == "image/png"));
        assert_eq!(file_count(dir.path()), 0);
    }

    #[tokio::test]
    async fn oversized_stream_is_rejected_and_cleaned_up() {
        let dir = tempfile::tempdir().unwrap();
        let blobs = adapter(dir.path(), 100);

        let err = blobs.put(mp4("big.mp4"), body(vec![9u8; 101])).await.unwrap_err();

        assert!(matches!(err, BlobError::TooLarge { limit: 100 }));
        assert_eq!(file_count(dir.path()), 0);
    }

    #[tokio::test]
    async fn stream_of_exactly_the_limit_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let blobs = adapter(dir.path(), 100);

        let receipt = blobs.put(mp4("edge.mp4"), body(vec![9u8; 100])).await.unwrap();
        assert_eq!(receipt.size_bytes, 100);
    }

    #[tokio::test]
    async fn open_serves_full_and_ranged_reads() {
        let dir = tempfile::tempdir().unwrap();
        let blobs = adapter(dir.path(), 10_000);
        let data: Vec<u8> = (0..1000u32).map(|i| (i % 251) as u8).collect();
        let receipt = blobs.put(mp4("a.mp4"), body(data.clone())).await.unwrap();
        let name = receipt.key.as_str();

        let full = blobs.open(name, None).await.unwrap();
        assert!(!full.is_partial());
        assert_eq!(full.content_length(), 1000);
        assert_eq!(full.content_type, "video/mp4");
        assert_eq!(read_all(full.stream).await, data);

        let ranged = blobs
            .open(name, Some(ByteRange::new(100, Some(199))))
            .await
            .unwrap();
        assert!(ranged.is_partial());
        assert_eq!(ranged.content_length(), 100);
        assert_eq!(read_all(ranged.stream).await, &data[100..200]);
    }

    #[tokio::test]
    async fn open_rejects_ranges_past_the_end() {
        let dir = tempfile::tempdir().unwrap();
        let blobs = adapter(dir.path(), 10_000);
        let receipt = blobs.put(mp4("a.mp4"), body(vec![1u8; 10])).await.unwrap();

        let err = blobs
            .open(receipt.key.as_str(), Some(ByteRange::from_start(10)))
            .await
            .unwrap_err();
        assert!(matches!(err, BlobError::RangeNotSatisfiable { size: 10 }));
    }

    #[tokio::test]
    async fn open_unknown_or_unsafe_names_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let blobs = adapter(dir.path(), 10_000);

        for name in ["missing.mp4", "..", "../etc/passwd", ""] {
            assert!(
                matches!(blobs.open(name, None).await, Err(BlobError::NotFound { .. })),
                "{name:?}"
            );
        }
    }

    #[tokio::test]
    async fn range_header_is_checked_only_after_existence() {
        let dir = tempfile::tempdir().unwrap();
        let blobs = adapter(dir.path(), 10_000);

        let err = blobs
            .open_with_range_header("missing.mp4", Some("garbage"))
            .await
            .unwrap_err();
        assert!(matches!(err, BlobError::NotFound { .. }));

        let receipt = blobs.put(mp4("a.mp4"), body(vec![1u8; 300])).await.unwrap();
        let name = receipt.key.as_str();

        let err = blobs
            .open_with_range_header(name, Some("garbage"))
            .await
            .unwrap_err();
        assert!(matches!(err, BlobError::InvalidRange { .. }));

        let err = blobs
            .open_with_range_header(name, Some("bytes=0-9,20-29"))
            .await
            .unwrap_err();
        assert!(matches!(err, BlobError::RangeNotSatisfiable { size: 300 }));

        let opened = blobs
            .open_with_range_header(name, Some("bytes=-50"))
            .await
            .unwrap();
        let range = opened.range.unwrap();
        assert_eq!((range.start, range.end), (250, 299));
    }

    #[tokio::test]
    async fn concurrent_ranges_do_not_share_a_cursor() {
        let dir = tempfile::tempdir().unwrap();
        let blobs = adapter(dir.path(), 100_000);
        let data: Vec<u8> = (0..50_000u32).map(|i| (i % 253) as u8).collect();
        let receipt = blobs.put(mp4("c.mp4"), body(data.clone())).await.unwrap();
        let name = receipt.key.as_str().to_string();

        let windows = [(0u64, 9_999u64), (20_000, 29_999), (45_000, 49_999)];
        let reads = windows.iter().map(|&(start, end)| {
            let blobs = blobs.clone();
            let name = name.clone();
            tokio::spawn(async move {
                let opened = blobs
                    .open(&name, Some(ByteRange::new(start, Some(end))))
                    .await
                    .unwrap();
                read_all(opened.stream).await
            })
        });
        let results: Vec<Vec<u8>> = futures_util::future::join_all(reads)
            .await
            .into_iter()
            .map(|r| r.unwrap())
            .collect();

        for ((start, end), got) in windows.iter().zip(results) {
            assert_eq!(got, &data[*start as usize..=*end as usize]);
        }
    }
}
