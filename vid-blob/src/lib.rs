//! # vid-blob: streaming video blob storage
//!
//! `vid-blob` stores uploaded videos and reads them back as byte streams,
//! whole or as a single byte range. It knows nothing about HTTP: the web
//! layer hands it a [`ByteStream`] and a [`BlobPut`], and gets back a
//! [`BlobReceipt`] or an [`OpenedBlob`].
//!
//! ## Key Features
//!
//! - **Streaming-first**: uploads and downloads never buffer a whole file
//! - **Atomic uploads**: a blob only becomes readable once fully written
//! - **Range requests**: `bytes=a-b`, `bytes=a-` and `bytes=-n`, clamped and
//!   checked against the size on disk at request time
//! - **Storage agnostic**: [`BlobStore`] is a trait; [`FsBlobStore`] is the
//!   local directory backend
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use vid_blob::prelude::*;
//!
//! # #[tokio::main]
//! # async fn main() -> BlobResult<()> {
//! let store = FsBlobStore::create("uploads").await?;
//! let adapter = BlobAdapter::new(store, BlobConfig::default());
//!
//! let body: ByteStream = Box::pin(futures_util::stream::once(async {
//!     Ok(bytes::Bytes::from_static(b"not really an mp4"))
//! }));
//! let put = BlobPut::new()
//!     .with_content_type("video/mp4")
//!     .with_filename("clip.mp4");
//! let receipt = adapter.put(put, body).await?;
//!
//! // First hundred bytes, as a player would ask for them
//! let opened = adapter
//!     .open(receipt.key.as_str(), Some(ByteRange::parse("bytes=0-99")?))
//!     .await?;
//! assert!(opened.is_partial());
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │   HTTP handler  │  ← multipart parsing, headers, status codes
//! ├─────────────────┤
//! │   BlobAdapter   │  ← content type, size limit, naming, ranges
//! ├─────────────────┤
//! │   BlobStore     │  ← storage primitives
//! └─────────────────┘
//! ```

pub mod adapter;
mod config;
mod error;
mod fs_store;
mod receipt;
pub mod store;
mod types;

// Re-export main types for clean API
pub use adapter::BlobAdapter;
pub use config::BlobConfig;
pub use error::{BlobError, BlobResult};
pub use fs_store::FsBlobStore;
pub use receipt::{BlobReceipt, OpenedBlob, ResolvedRange};
pub use store::{
    BlobKeyStrategy, BlobStore, GetResult, ObjectHead, PutResult, TimestampKeyStrategy,
};
pub use types::{
    BlobKey, BlobPut, ByteRange, ByteStream, RangeError, SizeLimitExceeded, MAX_KEY_BYTES,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        BlobAdapter, BlobConfig, BlobError, BlobKey, BlobPut, BlobReceipt, BlobResult, BlobStore,
        ByteRange, ByteStream, FsBlobStore, OpenedBlob,
    };
}
