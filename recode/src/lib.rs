//! # recode
//!
//! Charset detection and transcoding to UTF-8.
//!
//! This crate is the protocol-agnostic core of the recode middleware. It decides
//! whether a body is already UTF-8 and, if not, decodes it from a configured legacy
//! source encoding. HTTP handling lives in `recode-http`, the Tower layer in
//! `recode-tower`.
//!
//! ## Core Concepts
//!
//! - **[`detect`]**: sniffs a byte sequence (byte-order mark, UTF-8 validity,
//!   `<meta>` charset declaration, statistical scoring) and returns a [`Detection`].
//! - **[`EncodingRegistry`]**: maps source encoding names to [`SourceDecoder`]s.
//!   Only `ISO-8859-1` is registered by default.
//! - **[`Transcoder`]**: resolves the configured encoding, sniffs the body, and
//!   decodes it unless it is already UTF-8.
//! - **[`ConverterConfig`]**: the source encoding and the charset labelling mode.
//!
//! ## Example
//!
//! ```
//! use bytes::Bytes;
//! use recode::{Outcome, Transcoder};
//!
//! let transcoder = Transcoder::default();
//!
//! let latin1 = transcoder.transcode(Bytes::from_static(b"caf\xE9"), "ISO-8859-1")?;
//! assert_eq!(latin1.outcome(), Outcome::Transcoded);
//! assert_eq!(latin1.body(), "café".as_bytes());
//!
//! let utf8 = transcoder.transcode(Bytes::from_static(b"hello"), "ISO-8859-1")?;
//! assert_eq!(utf8.outcome(), Outcome::Unchanged);
//! # Ok::<(), recode::TranscodeError>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `metrics` - Record transcode outcomes with the [`metrics`](https://docs.rs/metrics) crate

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

/// Converter configuration.
pub mod config;

/// Charset sniffing.
pub mod detect;

/// Source decoders and the encoding registry.
pub mod encoding;

/// Error types.
pub mod error;

/// Metrics collection for transcode outcomes.
///
/// When the `metrics` feature is enabled, counts processed bodies per outcome and
/// the number of bytes produced by decoding.
pub mod metrics;

/// Whole-body transcoding.
pub mod transcode;

pub use config::{CharsetLabel, ConverterConfig, DEFAULT_SOURCE_ENCODING, UTF8_CHARSET};
pub use detect::{Detection, DetectionSource, detect};
pub use encoding::{EncodingRegistry, Latin1, SourceDecoder};
pub use error::TranscodeError;
pub use transcode::{Outcome, Transcoded, Transcoder, transcode};
