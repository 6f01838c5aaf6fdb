use std::sync::Arc;

use vid_blob::{BlobAdapter, BlobKey};

use crate::multipart::MultipartConfig;

/// Public address clients use to reach the streaming endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicUrl {
    origin: String,
}

impl PublicUrl {
    /// `base_url` without a port (e.g. `http://localhost`) plus the port.
    pub fn new(base_url: &str, port: u16) -> Self {
        Self {
            origin: format!("{}:{}", base_url.trim_end_matches('/'), port),
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// `<origin>/stream/<name>`, the name percent-encoded as one path segment.
    pub fn stream_url(&self, key: &BlobKey) -> String {
        format!(
            "{}/stream/{}",
            self.origin,
            urlencoding::encode(key.as_str())
        )
    }
}

pub struct VidAxumState {
    pub blobs: Arc<BlobAdapter>,
    pub public_url: PublicUrl,
    pub multipart: MultipartConfig,
}

impl Clone for VidAxumState {
    fn clone(&self) -> Self {
        Self {
            blobs: Arc::clone(&self.blobs),
            public_url: self.public_url.clone(),
            multipart: self.multipart.clone(),
        }
    }
}

impl VidAxumState {
    pub fn new(blobs: BlobAdapter, public_url: PublicUrl) -> Self {
        Self {
            blobs: Arc::new(blobs),
            public_url,
            multipart: MultipartConfig::default(),
        }
    }

    pub fn with_multipart(mut self, multipart: MultipartConfig) -> Self {
        self.multipart = multipart;
        self
    }
}
