//! Error types for response recoding.

use recode::TranscodeError;
use thiserror::Error;

/// Type-erased error, used for errors of arbitrary response bodies.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Reasons a response cannot be recoded.
///
/// Each of these is reported to the client as a `500 Internal Server Error`
/// whose body is the error text.
#[derive(Debug, Error)]
pub enum RecodeError {
    /// The body could not be transcoded, e.g. the source encoding is unsupported.
    #[error(transparent)]
    Transcode(#[from] TranscodeError),

    /// Reading the upstream response body failed.
    #[error("failed to read response body: {0}")]
    Body(#[source] BoxError),
}
