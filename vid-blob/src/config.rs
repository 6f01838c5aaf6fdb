/// Configuration for blob operations
#[derive(Debug, Clone)]
pub struct BlobConfig {
    /// Absolute max size allowed for a single blob
    pub max_blob_bytes: u64,

    /// Declared content types accepted on upload (compared on the media type,
    /// parameters and case ignored)
    pub allowed_content_types: Vec<String>,

    /// Content type reported when serving a blob whose store keeps no type
    pub default_content_type: String,
}

impl Default for BlobConfig {
    fn default() -> Self {
        Self {
            max_blob_bytes: 100_000_000, // 100MB
            allowed_content_types: vec!["video/mp4".to_string()],
            default_content_type: "video/mp4".to_string(),
        }
    }
}

impl BlobConfig {
    /// Create a new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set max blob size
    pub fn with_max_blob_bytes(mut self, bytes: u64) -> Self {
        self.max_blob_bytes = bytes;
        self
    }

    /// Replace the accepted content types
    pub fn with_allowed_content_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_content_types = types.into_iter().map(Into::into).collect();
        self
    }

    /// Set the content type used when serving
    pub fn with_default_content_type<S: Into<String>>(mut self, content_type: S) -> Self {
        self.default_content_type = content_type.into();
        self
    }

    /// Whether a declared content type may be uploaded
    pub fn accepts(&self, content_type: &str) -> bool {
        let essence = media_type(content_type);
        self.allowed_content_types
            .iter()
            .any(|allowed| media_type(allowed).eq_ignore_ascii_case(essence))
    }
}

fn media_type(content_type: &str) -> &str {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
}
