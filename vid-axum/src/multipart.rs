//! Streaming reader for the upload form.
//!
//! The form is parsed with `multer` straight off the request body. The file
//! field is handed on as a [`ByteStream`] so it can be written to storage
//! chunk by chunk; nothing is buffered here.

use axum::http::{header, HeaderMap};
use futures::StreamExt;
use multer::{Field, Multipart};
use thiserror::Error;
use vid_blob::{BlobPut, ByteStream};
use vid_core::errors::VidError;

pub const DEFAULT_FILE_FIELD: &str = "video";
pub const UNEXPECTED_FIELD: &str = "Unexpected field";
pub const EXPECTED_MULTIPART: &str = "Expected multipart/form-data";

/// Configuration for reading the upload form
#[derive(Debug, Clone)]
pub struct MultipartConfig {
    /// Form field the file must arrive under
    pub file_field: String,
}

impl Default for MultipartConfig {
    fn default() -> Self {
        Self {
            file_field: DEFAULT_FILE_FIELD.to_string(),
        }
    }
}

impl MultipartConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the form field name carrying the file
    pub fn file_field(mut self, field_name: &str) -> Self {
        self.file_field = field_name.to_string();
        self
    }
}

/// A second file arrived after the upload's file field.
#[derive(Debug, Clone, Error)]
#[error("{}", UNEXPECTED_FIELD)]
pub struct ExtraFileField {
    pub field: Option<String>,
}

/// The uploaded file, still unread.
pub struct FilePart {
    pub put: BlobPut,
    pub body: ByteStream,
}

/// Boundary of a `multipart/form-data` request; anything else is a 400.
pub fn boundary(headers: &HeaderMap) -> Result<String, VidError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| VidError::bad_request(EXPECTED_MULTIPART))?;

    multer::parse_boundary(content_type).map_err(|_| VidError::bad_request(EXPECTED_MULTIPART))
}

/// Advance to the file field.
///
/// Text fields are skipped. A file under any name other than the configured
/// field is rejected before it is read. Returns `None` when the form ends
/// without a file.
///
/// The returned body owns the rest of the form. Once the file's bytes run
/// out it reads to the end of the form and fails with [`ExtraFileField`] if
/// another file follows, so a store never commits a multi-file upload.
pub async fn next_file(
    mut form: Multipart<'static>,
    config: &MultipartConfig,
) -> Result<Option<FilePart>, VidError> {
    while let Some(field) = form.next_field().await.map_err(malformed)? {
        if field.file_name().is_none() {
            tracing::debug!(field = ?field.name(), "skipping text field");
            continue;
        }

        if field.name() != Some(config.file_field.as_str()) {
            tracing::warn!(field = ?field.name(), expected = %config.file_field, "unexpected file field");
            return Err(VidError::bad_request(UNEXPECTED_FIELD));
        }

        let mut put = BlobPut::new();
        if let Some(content_type) = field.content_type() {
            put = put.with_content_type(content_type.to_string());
        }
        if let Some(filename) = field.file_name() {
            put = put.with_filename(filename);
        }

        let body = file_then_rest(field, form);
        return Ok(Some(FilePart { put, body }));
    }

    Ok(None)
}

fn file_then_rest(mut field: Field<'static>, mut form: Multipart<'static>) -> ByteStream {
    Box::pin(async_stream::stream! {
        while let Some(chunk) = field.next().await {
            match chunk {
                Ok(bytes) => yield Ok(bytes),
                Err(e) => {
                    yield Err(std::io::Error::other(e));
                    return;
                }
            }
        }
        drop(field);

        loop {
            match form.next_field().await {
                Ok(None) => break,
                Ok(Some(next)) if next.file_name().is_none() => continue,
                Ok(Some(next)) => {
                    let field = next.name().map(str::to_string);
                    tracing::warn!(field = ?field, "extra file field after upload");
                    yield Err(std::io::Error::other(ExtraFileField { field }));
                    return;
                }
                Err(e) => {
                    yield Err(std::io::Error::other(e));
                    return;
                }
            }
        }
    })
}

fn malformed(err: multer::Error) -> VidError {
    VidError::bad_request(err.to_string())
}
