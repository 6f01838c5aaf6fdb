//! # Errors
//!
//! vidrs carries a small set of structured errors through `anyhow::Error`.
//! Core goals:
//! - one status code per kind
//! - can be carried through anyhow::Error (handlers, storage, startup)
//! - transport-agnostic (the HTTP crate decides how to render)
//!
//! Every error renders to the client as `{ "success": false, "message": ... }`.
//! Server-side kinds never leak their message; see [`VidError::sanitize_for_client`].

use std::fmt;

use anyhow::Error as AnyError;

/// A convenience result type for vidrs APIs.
pub type VidResult<T> = std::result::Result<T, AnyError>;

/// Message returned to clients for every 5xx outcome.
pub const UNEXPECTED_ERROR_MESSAGE: &str = "Unexpected error";

/// Error classes + status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadRequest,          // 400
    NotFound,            // 404
    RangeNotSatisfiable, // 416
    GeneralError,        // 500
}

impl ErrorKind {
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::BadRequest => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::RangeNotSatisfiable => 416,
            ErrorKind::GeneralError => 500,
        }
    }

    /// Error `name` (e.g. "NotFound"), used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "BadRequest",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::RangeNotSatisfiable => "RangeNotSatisfiable",
            ErrorKind::GeneralError => "GeneralError",
        }
    }

    pub fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }
}

/// A structured vidrs error that can live inside `anyhow::Error`.
///
/// Fields:
/// - kind (status code + name)
/// - message (client-facing for 4xx)
/// - data (optional, e.g. the resource size for a 416)
/// - source (never rendered)
#[derive(Debug)]
pub struct VidError {
    pub kind: ErrorKind,
    pub message: String,
    pub data: Option<serde_json::Value>,
    pub source: Option<AnyError>,
}

impl VidError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            data: None,
            source: None,
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_source(mut self, source: AnyError) -> Self {
        self.source = Some(source);
        self
    }

    pub fn code(&self) -> u16 {
        self.kind.status_code()
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Convert into `anyhow::Error` so it flows through `?`.
    pub fn into_anyhow(self) -> AnyError {
        AnyError::new(self)
    }

    /// A "safe" version suitable for returning to clients:
    /// - 4xx keep kind/message/data
    /// - 5xx keep only the kind, with a generic message
    /// - the inner `source` is always dropped
    pub fn sanitize_for_client(&self) -> VidError {
        if self.kind.is_server_error() {
            return VidError::new(self.kind, UNEXPECTED_ERROR_MESSAGE);
        }
        VidError {
            kind: self.kind,
            message: self.message.clone(),
            data: self.data.clone(),
            source: None,
        }
    }

    /// JSON payload: `{ "success": false, "message": ... }`.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "success": false,
            "message": self.message,
        })
    }

    // ---- Constructors ----

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequest, msg)
    }
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, msg)
    }
    /// 416 carrying the current resource size so the transport can emit
    /// `Content-Range: bytes */<size>`.
    pub fn range_not_satisfiable(msg: impl Into<String>, size: u64) -> Self {
        Self::new(ErrorKind::RangeNotSatisfiable, msg)
            .with_data(serde_json::json!({ "size": size }))
    }
    pub fn general_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::GeneralError, msg)
    }

    /// Size attached by [`VidError::range_not_satisfiable`].
    pub fn unsatisfied_size(&self) -> Option<u64> {
        self.data
            .as_ref()
            .and_then(|d| d.get("size"))
            .and_then(|s| s.as_u64())
    }
}

impl fmt::Display for VidError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.name(), self.code(), self.message)
    }
}

impl std::error::Error for VidError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}
