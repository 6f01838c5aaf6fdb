use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use vid_blob::BlobError;
use vid_core::errors::{ErrorKind, VidError};

use crate::multipart::{ExtraFileField, UNEXPECTED_FIELD};

pub const VIDEO_NOT_FOUND: &str = "Video not found";
pub const INVALID_MIMETYPE: &str = "Invalid mimetype";
pub const FILE_TOO_LARGE: &str = "File too large";
pub const INVALID_RANGE_HEADER: &str = "Invalid Range header";
pub const RANGE_NOT_SATISFIABLE: &str = "Range Not Satisfiable";

#[derive(Debug)]
pub struct VidAxumError(pub anyhow::Error);

impl From<anyhow::Error> for VidAxumError {
    fn from(e: anyhow::Error) -> Self {
        Self(e)
    }
}

impl From<VidError> for VidAxumError {
    fn from(e: VidError) -> Self {
        Self(e.into_anyhow())
    }
}

impl From<BlobError> for VidAxumError {
    fn from(e: BlobError) -> Self {
        Self(anyhow::Error::new(e))
    }
}

/// Map a storage failure onto the client-facing error kinds.
pub fn blob_error_to_vid(err: &BlobError) -> VidError {
    match err {
        BlobError::NotFound { .. } => VidError::not_found(VIDEO_NOT_FOUND),
        BlobError::Invalid { message } => VidError::bad_request(message.clone()),
        BlobError::UnsupportedContentType { .. } => VidError::bad_request(INVALID_MIMETYPE),
        BlobError::TooLarge { .. } => VidError::bad_request(FILE_TOO_LARGE),
        BlobError::RangeNotSatisfiable { size } => {
            VidError::range_not_satisfiable(RANGE_NOT_SATISFIABLE, *size)
        }
        BlobError::InvalidRange { .. } => VidError::bad_request(INVALID_RANGE_HEADER),
        BlobError::Io { .. } => {
            if err.stream_cause::<ExtraFileField>().is_some() {
                return VidError::bad_request(UNEXPECTED_FIELD);
            }
            match err.stream_cause::<multer::Error>() {
                // The upload body itself was broken, not the disk.
                Some(multipart) => VidError::bad_request(multipart.to_string()),
                None => VidError::general_error(err.to_string()),
            }
        }
    }
}

impl VidAxumError {
    fn resolve(&self) -> VidError {
        if let Some(vid) = self.0.chain().find_map(|e| e.downcast_ref::<VidError>()) {
            return vid.sanitize_for_client();
        }

        if let Some(blob) = self.0.chain().find_map(|e| e.downcast_ref::<BlobError>()) {
            return blob_error_to_vid(blob);
        }

        VidError::general_error(self.0.to_string())
    }
}

impl IntoResponse for VidAxumError {
    fn into_response(self) -> Response {
        let vid = self.resolve();

        if vid.kind.is_server_error() {
            tracing::error!(error = ?self.0, "unexpected error");
        } else {
            tracing::warn!(code = vid.code(), reason = %vid.message, "request rejected");
        }

        let safe = vid.sanitize_for_client();
        let status = StatusCode::from_u16(safe.code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (status, Json(safe.to_json())).into_response();

        if safe.kind == ErrorKind::RangeNotSatisfiable {
            if let Some(size) = safe.unsatisfied_size() {
                if let Ok(value) = HeaderValue::from_str(&format!("bytes */{}", size)) {
                    response.headers_mut().insert(header::CONTENT_RANGE, value);
                }
            }
        }

        response
    }
}
