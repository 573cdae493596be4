//! Error types for transcoding operations.

use smol_str::SmolStr;
use thiserror::Error;

/// Error returned by [`Transcoder::transcode`](crate::Transcoder::transcode).
///
/// Transcoding is a pure in-memory operation: the only way it can fail is a
/// configuration that names a source encoding with no registered decoder.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TranscodeError {
    /// The configured source encoding is not present in the
    /// [`EncodingRegistry`](crate::EncodingRegistry).
    #[error("unsupported source encoding: {0}")]
    UnsupportedEncoding(SmolStr),
}

impl TranscodeError {
    /// Name of the source encoding that caused the error.
    pub fn encoding(&self) -> &str {
        match self {
            TranscodeError::UnsupportedEncoding(name) => name.as_str(),
        }
    }
}
