//! Library template created with FerrisUp

//! vid-core: transport-agnostic core for vidrs.
//!
//! Holds the structured error taxonomy shared by the storage and HTTP
//! crates, and the key/value configuration store the server is built from.

pub mod config;
pub mod errors;

pub use config::VidConfig;
pub use errors::{ErrorKind, VidError, VidResult};
