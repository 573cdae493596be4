//! Transcoding of whole bodies to UTF-8.

use std::borrow::Cow;
use std::sync::Arc;

use bytes::Bytes;
use smol_str::SmolStr;
use tracing::debug;

use crate::detect::{Detection, detect};
use crate::encoding::EncodingRegistry;
use crate::error::TranscodeError;
use crate::metrics;

/// What happened to a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The body was already UTF-8 and was returned as-is.
    Unchanged,
    /// The body was decoded from the source encoding.
    Transcoded,
    /// The source encoding is not registered.
    Unsupported,
    /// The body could not be read, so nothing was transcoded.
    BodyError,
}

impl Outcome {
    /// Label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Unchanged => "unchanged",
            Outcome::Transcoded => "transcoded",
            Outcome::Unsupported => "unsupported",
            Outcome::BodyError => "body_error",
        }
    }
}

/// A body after transcoding.
#[derive(Debug, Clone)]
pub struct Transcoded {
    body: Bytes,
    detection: Detection,
    decoded_from: Option<SmolStr>,
}

impl Transcoded {
    /// The UTF-8 body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Consumes the result, returning the UTF-8 body.
    pub fn into_body(self) -> Bytes {
        self.body
    }

    /// What the sniffer guessed for the input.
    pub fn detection(&self) -> Detection {
        self.detection
    }

    /// Source encoding the body was decoded from, `None` if it was already UTF-8.
    pub fn decoded_from(&self) -> Option<&str> {
        self.decoded_from.as_deref()
    }

    /// Whether the body was decoded or returned as-is.
    pub fn outcome(&self) -> Outcome {
        match self.decoded_from {
            Some(_) => Outcome::Transcoded,
            None => Outcome::Unchanged,
        }
    }
}

/// Converts bodies to UTF-8 using an [`EncodingRegistry`].
///
/// Cloning is cheap; the registry is shared.
#[derive(Debug, Clone, Default)]
pub struct Transcoder {
    registry: Arc<EncodingRegistry>,
}

impl Transcoder {
    /// Creates a transcoder resolving source encodings in `registry`.
    pub fn new(registry: EncodingRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    /// The registry source encodings are resolved in.
    pub fn registry(&self) -> &EncodingRegistry {
        &self.registry
    }

    /// Transcodes `input` to UTF-8.
    ///
    /// Input the sniffer classifies as UTF-8 is returned unchanged without copying.
    /// Anything else is decoded with the decoder registered for `source_encoding`.
    ///
    /// # Errors
    ///
    /// [`TranscodeError::UnsupportedEncoding`] if `source_encoding` is not
    /// registered. The name is resolved before the input is inspected, so the error
    /// does not depend on the body.
    pub fn transcode(
        &self,
        input: Bytes,
        source_encoding: &str,
    ) -> Result<Transcoded, TranscodeError> {
        let decoder = self.registry.lookup(source_encoding).inspect_err(|_| {
            metrics::record_transcode(Outcome::Unsupported, 0);
        })?;

        let detection = detect(&input);
        if detection.is_utf8() {
            debug!(%detection, "body is already UTF-8");
            metrics::record_transcode(Outcome::Unchanged, input.len());
            return Ok(Transcoded {
                body: input,
                detection,
                decoded_from: None,
            });
        }

        let decoded = match decoder.decode(&input) {
            Cow::Borrowed(text) if text.as_ptr() == input.as_ptr() && text.len() == input.len() => {
                None
            }
            Cow::Borrowed(text) => Some(Bytes::copy_from_slice(text.as_bytes())),
            Cow::Owned(text) => Some(Bytes::from(text)),
        };
        let body = decoded.unwrap_or(input);

        debug!(
            %detection,
            source_encoding,
            len = body.len(),
            "decoded body to UTF-8"
        );
        metrics::record_transcode(Outcome::Transcoded, body.len());

        Ok(Transcoded {
            body,
            detection,
            decoded_from: Some(SmolStr::new(source_encoding)),
        })
    }
}

/// Transcodes `input` to UTF-8 using the default registry.
///
/// ```
/// assert_eq!(recode::transcode(b"caf\xE9", "ISO-8859-1").unwrap(), "café".as_bytes());
/// assert_eq!(recode::transcode(b"hello", "ISO-8859-1").unwrap(), b"hello");
/// assert!(recode::transcode(b"hello", "Shift_JIS").is_err());
/// ```
pub fn transcode(
    input: impl AsRef<[u8]>,
    source_encoding: &str,
) -> Result<Vec<u8>, TranscodeError> {
    Transcoder::default()
        .transcode(Bytes::copy_from_slice(input.as_ref()), source_encoding)
        .map(|transcoded| transcoded.into_body().to_vec())
}
