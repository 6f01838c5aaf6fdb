use thiserror::Error;

use crate::{RangeError, SizeLimitExceeded};

/// Result type for blob operations
pub type BlobResult<T> = Result<T, BlobError>;

/// Errors that can occur during blob operations
#[derive(Error, Debug)]
pub enum BlobError {
    #[error("Blob not found: {key}")]
    NotFound { key: String },

    #[error("Invalid request: {message}")]
    Invalid { message: String },

    #[error("Content type not allowed: {content_type}")]
    UnsupportedContentType { content_type: String },

    #[error("Blob exceeds maximum size of {limit} bytes")]
    TooLarge { limit: u64 },

    #[error("Range not satisfiable for blob of {size} bytes")]
    RangeNotSatisfiable { size: u64 },

    #[error("Invalid range: {source}")]
    InvalidRange {
        #[from]
        source: RangeError,
    },

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl BlobError {
    /// Create an invalid request error
    pub fn invalid<S: Into<String>>(message: S) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found<S: Into<String>>(key: S) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Create an unsupported content type error
    pub fn unsupported_content_type<S: Into<String>>(content_type: S) -> Self {
        Self::UnsupportedContentType {
            content_type: content_type.into(),
        }
    }

    /// Map an I/O failure on `key`, turning `NotFound` into [`BlobError::NotFound`].
    pub fn from_io(key: &str, error: std::io::Error) -> Self {
        if error.kind() == std::io::ErrorKind::NotFound {
            Self::not_found(key)
        } else {
            Self::Io { source: error }
        }
    }

    /// Lift a size-limit breach raised inside a byte stream into
    /// [`BlobError::TooLarge`]; every other error is returned unchanged.
    pub fn surface_size_limit(self) -> Self {
        match self {
            Self::Io { source } => {
                let limit = source
                    .get_ref()
                    .and_then(|inner| inner.downcast_ref::<SizeLimitExceeded>())
                    .map(|exceeded| exceeded.limit);
                match limit {
                    Some(limit) => Self::TooLarge { limit },
                    None => Self::Io { source },
                }
            }
            other => other,
        }
    }

    /// The inner error carried by a failed body stream, if it is of type `E`.
    pub fn stream_cause<E>(&self) -> Option<&E>
    where
        E: std::error::Error + 'static,
    {
        match self {
            Self::Io { source } => source.get_ref().and_then(|inner| inner.downcast_ref::<E>()),
            _ => None,
        }
    }
}
