use axum::{
    body::Body,
    extract::State,
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};
use vid_core::errors::VidError;

use crate::{multipart, VidAxumError, VidAxumState};

pub const UPLOAD_SUCCESS: &str = "Video uploaded successfully!";
pub const NO_VIDEO_FILE: &str = "No video file provided";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub video_path: String,
}

/// `POST /upload`: store the file field of a multipart form and answer with
/// the URL it can be streamed from.
pub async fn upload(
    State(state): State<VidAxumState>,
    headers: HeaderMap,
    body: Body,
) -> Result<Json<UploadResponse>, VidAxumError> {
    let boundary = multipart::boundary(&headers)?;
    let form = multer::Multipart::new(body.into_data_stream(), boundary);

    let file = multipart::next_file(form, &state.multipart)
        .await?
        .ok_or_else(|| VidError::bad_request(NO_VIDEO_FILE))?;

    let receipt = state.blobs.put(file.put, file.body).await?;
    let video_path = state.public_url.stream_url(&receipt.key);

    tracing::info!(
        key = %receipt.key,
        size = receipt.size_bytes,
        filename = ?receipt.filename,
        "video uploaded"
    );

    Ok(Json(UploadResponse {
        success: true,
        message: UPLOAD_SUCCESS.to_string(),
        video_path,
    }))
}
