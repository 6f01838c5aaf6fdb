//! vid-axum: Axum adapter for vidrs.
//!
//! Exposes the `POST /upload` and `GET /stream/{name}` handlers over a
//! [`vid_blob::BlobAdapter`], JSON error rendering, and [`VidApp`] to serve
//! them.

pub mod app;
pub mod multipart;
pub mod state;
pub mod stream;
pub mod upload;
mod error;
pub use error::{blob_error_to_vid, VidAxumError};
pub use state::{PublicUrl, VidAxumState};

pub use app::{routes, vid_app, VidApp};
