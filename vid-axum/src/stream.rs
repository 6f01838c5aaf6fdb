use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use crate::{VidAxumError, VidAxumState};

/// `GET /stream/{name}`: the stored video, whole or as one byte range.
///
/// Without `Range` the full file is sent with 200. With a satisfiable range
/// only that window is sent with 206 and `Content-Range`. The body is read
/// from disk as the client drains it.
pub async fn stream(
    State(state): State<VidAxumState>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> Result<Response, VidAxumError> {
    // A non-ASCII header value can never be a valid range; let it fail parsing.
    let range = headers
        .get(header::RANGE)
        .map(|v| v.to_str().unwrap_or_default());

    let opened = state.blobs.open_with_range_header(&name, range).await?;

    let mut response_headers = HeaderMap::new();
    response_headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(&opened.content_type).map_err(anyhow::Error::from)?,
    );
    response_headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
    response_headers.insert(
        header::CONTENT_LENGTH,
        HeaderValue::from(opened.content_length()),
    );

    let status = match opened.range {
        Some(range) => {
            response_headers.insert(
                header::CONTENT_RANGE,
                HeaderValue::from_str(&range.content_range()).map_err(anyhow::Error::from)?,
            );
            tracing::info!(key = %opened.key, start = range.start, end = range.end, total = range.total_size, "serving range");
            StatusCode::PARTIAL_CONTENT
        }
        None => {
            tracing::info!(key = %opened.key, size = opened.head.size_bytes, "serving full video");
            StatusCode::OK
        }
    };

    Ok((status, response_headers, Body::from_stream(opened.stream)).into_response())
}
