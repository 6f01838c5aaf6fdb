//! vid-server: wires settings, storage and the HTTP layer together.

pub mod settings;

use vid_axum::multipart::MultipartConfig;
use vid_axum::{vid_app, PublicUrl, VidApp, VidAxumState};
use vid_blob::{BlobAdapter, BlobConfig, FsBlobStore};
use vid_core::{VidError, VidResult};

pub use settings::Settings;

/// Build the app: make sure the uploads directory exists, then mount the
/// upload and stream routes over it.
pub async fn build(settings: &Settings) -> VidResult<VidApp> {
    let store = FsBlobStore::create(&settings.upload_dir)
        .await
        .map_err(|e| {
            VidError::general_error(format!(
                "cannot create uploads directory {}",
                settings.upload_dir.display()
            ))
            .with_source(e.into())
            .into_anyhow()
        })?;

    let blobs = BlobAdapter::new(
        store,
        BlobConfig::new()
            .with_max_blob_bytes(settings.max_upload_bytes)
            .with_allowed_content_types([settings.upload_mime.clone()])
            .with_default_content_type(settings.upload_mime.clone()),
    );

    let state = VidAxumState::new(blobs, PublicUrl::new(&settings.base_url, settings.port))
        .with_multipart(MultipartConfig::new().file_field(&settings.upload_field));

    tracing::info!(
        uploads = %settings.upload_dir.display(),
        max_bytes = settings.max_upload_bytes,
        public = %state.public_url.origin(),
        "vidrs configured"
    );

    Ok(vid_app(state))
}
