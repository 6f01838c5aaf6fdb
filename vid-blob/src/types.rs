use bytes::Bytes;
use futures_core::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use thiserror::Error;

use crate::ResolvedRange;

/// Stream of bytes for blob content
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Longest key a filesystem will accept as a single file name.
pub const MAX_KEY_BYTES: usize = 255;

/// Name of a stored blob.
///
/// A key is always a single plain path segment: never empty, never `.`/`..`,
/// never hidden (leading `.`, which is reserved for in-flight uploads), and
/// free of separators and control characters. It is at most
/// [`MAX_KEY_BYTES`] long. Anything that does not parse cannot address a
/// file in the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlobKey(String);

impl BlobKey {
    /// Validate a stored name, e.g. the `:name` segment of a stream URL.
    pub fn parse(name: &str) -> Option<Self> {
        let valid = !name.is_empty()
            && name.len() <= MAX_KEY_BYTES
            && !name.starts_with('.')
            && !name
                .chars()
                .any(|c| c == '/' || c == '\\' || c.is_control());

        valid.then(|| Self(name.to_string()))
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BlobKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Request to store a blob
#[derive(Debug, Clone, Default)]
pub struct BlobPut {
    pub content_type: Option<String>,
    pub filename: Option<String>,
}

impl BlobPut {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_content_type<S: Into<String>>(mut self, content_type: S) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_filename<S: Into<String>>(mut self, filename: S) -> Self {
        self.filename = Some(filename.into());
        self
    }
}

/// Why a `Range` header could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("Range unit must be bytes")]
    UnsupportedUnit,

    #[error("Multiple ranges are not supported")]
    MultipleRanges,

    #[error("Malformed range: {0}")]
    Malformed(String),
}

/// A single byte range as requested by a client (`Range: bytes=...`).
///
/// Offsets are inclusive and not yet checked against any file size; see
/// [`ByteRange::resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteRange {
    /// `bytes=<start>-<end>`
    FromTo { start: u64, end: u64 },
    /// `bytes=<start>-`, to the end of the file
    From { start: u64 },
    /// `bytes=-<len>`, the last `len` bytes
    Suffix { len: u64 },
}

impl ByteRange {
    pub fn new(start: u64, end: Option<u64>) -> Self {
        match end {
            Some(end) => Self::FromTo { start, end },
            None => Self::From { start },
        }
    }

    pub fn from_start(start: u64) -> Self {
        Self::From { start }
    }

    /// Parse a `Range` header value.
    ///
    /// Only a single range is accepted; a list (`bytes=0-99,200-299`) is
    /// reported as [`RangeError::MultipleRanges`] rather than served partially.
    pub fn parse(header: &str) -> Result<Self, RangeError> {
        let header = header.trim();
        let (unit, ranges) = header
            .split_once('=')
            .ok_or_else(|| RangeError::Malformed(header.to_string()))?;

        if !unit.trim().eq_ignore_ascii_case("bytes") {
            return Err(RangeError::UnsupportedUnit);
        }
        if ranges.contains(',') {
            return Err(RangeError::MultipleRanges);
        }

        let (start, end) = ranges
            .split_once('-')
            .ok_or_else(|| RangeError::Malformed(ranges.to_string()))?;
        let (start, end) = (start.trim(), end.trim());

        match (start.is_empty(), end.is_empty()) {
            (true, true) => Err(RangeError::Malformed(ranges.to_string())),
            (true, false) => Ok(Self::Suffix {
                len: parse_offset(end)?,
            }),
            (false, true) => Ok(Self::From {
                start: parse_offset(start)?,
            }),
            (false, false) => Ok(Self::FromTo {
                start: parse_offset(start)?,
                end: parse_offset(end)?,
            }),
        }
    }

    /// Resolve against the current size of the blob.
    ///
    /// An end past the last byte is clamped. Returns `None` when nothing can
    /// be served: empty blob, start at or past the end, end before start, or
    /// a zero-length suffix.
    pub fn resolve(&self, total_size: u64) -> Option<ResolvedRange> {
        if total_size == 0 {
            return None;
        }
        let last = total_size - 1;

        let (start, end) = match *self {
            Self::FromTo { start, end } => {
                if end < start {
                    return None;
                }
                (start, end.min(last))
            }
            Self::From { start } => (start, last),
            Self::Suffix { len } => {
                if len == 0 {
                    return None;
                }
                (total_size.saturating_sub(len), last)
            }
        };

        if start > last {
            return None;
        }

        Some(ResolvedRange {
            start,
            end,
            total_size,
        })
    }
}

fn parse_offset(digits: &str) -> Result<u64, RangeError> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RangeError::Malformed(digits.to_string()));
    }
    digits
        .parse::<u64>()
        .map_err(|_| RangeError::Malformed(digits.to_string()))
}

/// Raised inside a byte stream when it carries more than the allowed bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("stream exceeded the limit of {limit} bytes")]
pub struct SizeLimitExceeded {
    pub limit: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_closed_open_and_suffix_ranges() {
        assert_eq!(
            ByteRange::parse("bytes=0-99").unwrap(),
            ByteRange::FromTo { start: 0, end: 99 }
        );
        assert_eq!(
            ByteRange::parse("bytes=500-").unwrap(),
            ByteRange::From { start: 500 }
        );
        assert_eq!(
            ByteRange::parse("bytes=-200").unwrap(),
            ByteRange::Suffix { len: 200 }
        );
        assert_eq!(
            ByteRange::parse("  Bytes = 10 - 20 ").unwrap(),
            ByteRange::FromTo { start: 10, end: 20 }
        );
    }

    #[test]
    fn rejects_multiple_ranges() {
        assert_eq!(
            ByteRange::parse("bytes=0-99,200-299"),
            Err(RangeError::MultipleRanges)
        );
    }

    #[test]
    fn rejects_malformed_headers() {
        assert_eq!(ByteRange::parse("items=0-5"), Err(RangeError::UnsupportedUnit));
        assert!(matches!(ByteRange::parse("bytes 0-5"), Err(RangeError::Malformed(_))));
        assert!(matches!(ByteRange::parse("bytes=-"), Err(RangeError::Malformed(_))));
        assert!(matches!(ByteRange::parse("bytes=abc-"), Err(RangeError::Malformed(_))));
        assert!(matches!(ByteRange::parse("bytes=+5-9"), Err(RangeError::Malformed(_))));
        assert!(matches!(ByteRange::parse("bytes=5"), Err(RangeError::Malformed(_))));
        assert!(matches!(
            ByteRange::parse("bytes=99999999999999999999-"),
            Err(RangeError::Malformed(_))
        ));
    }

    #[test]
    fn resolve_clamps_end_to_last_byte() {
        let r = ByteRange::parse("bytes=100-9999").unwrap().resolve(500).unwrap();
        assert_eq!((r.start, r.end, r.total_size), (100, 499, 500));
        assert_eq!(r.content_length(), 400);
    }

    #[test]
    fn resolve_open_ended_runs_to_eof() {
        let r = ByteRange::from_start(500).resolve(1000).unwrap();
        assert_eq!((r.start, r.end), (500, 999));
        assert_eq!(r.content_length(), 500);
    }

    #[test]
    fn resolve_suffix_longer_than_file_serves_everything() {
        let r = ByteRange::Suffix { len: 5000 }.resolve(1000).unwrap();
        assert_eq!((r.start, r.end), (0, 999));
        assert!(r.is_full_content());
    }

    #[test]
    fn unsatisfiable_ranges_resolve_to_none() {
        assert!(ByteRange::from_start(1000).resolve(1000).is_none());
        assert!(ByteRange::new(10, Some(5)).resolve(1000).is_none());
        assert!(ByteRange::Suffix { len: 0 }.resolve(1000).is_none());
        assert!(ByteRange::new(0, Some(0)).resolve(0).is_none());
    }

    #[test]
    fn blob_keys_are_single_plain_segments() {
        assert!(BlobKey::parse("1700000000000-clip.mp4").is_some());
        assert!(BlobKey::parse("1700000000000-my clip.mp4").is_some());
        assert!(BlobKey::parse("").is_none());
        assert!(BlobKey::parse("..").is_none());
        assert!(BlobKey::parse(".upload-abc.part").is_none());
        assert!(BlobKey::parse("a/b.mp4").is_none());
        assert!(BlobKey::parse("a\\b.mp4").is_none());
        assert!(BlobKey::parse("a\0b.mp4").is_none());
    }

    #[test]
    fn blob_keys_fit_in_one_file_name() {
        assert!(BlobKey::parse(&"a".repeat(MAX_KEY_BYTES)).is_some());
        assert!(BlobKey::parse(&"a".repeat(MAX_KEY_BYTES + 1)).is_none());
        // Multi-byte characters count by encoded length.
        assert!(BlobKey::parse(&"\u{e9}".repeat(128)).is_none());
    }
}
