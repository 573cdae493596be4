//! Source encodings and the registry that resolves them by name.
//!
//! A [`SourceDecoder`] turns bytes of one legacy encoding into UTF-8 text. The
//! [`EncodingRegistry`] maps configuration names (`"ISO-8859-1"`) to decoders, so
//! new encodings are added with [`EncodingRegistry::register`] without touching
//! [`Transcoder`](crate::Transcoder).

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use smol_str::SmolStr;

use crate::config::DEFAULT_SOURCE_ENCODING;
use crate::error::TranscodeError;

/// Decoder for a single source encoding.
///
/// Implementations must accept any byte sequence: single-byte code pages map every
/// byte value to a code point, and multi-byte encodings are expected to substitute
/// U+FFFD for malformed sequences rather than fail.
pub trait SourceDecoder: Send + Sync {
    /// Canonical name of the encoding.
    fn name(&self) -> &'static str;

    /// Decodes `input` into UTF-8 text.
    fn decode<'a>(&self, input: &'a [u8]) -> Cow<'a, str>;
}

/// ISO-8859-1 (Latin-1) decoder.
///
/// Every byte is mapped to the Unicode code point with the same value. Unlike the
/// WHATWG `iso-8859-1` label, which resolves to windows-1252, bytes `0x80..=0x9F`
/// decode to C1 control characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct Latin1;

impl SourceDecoder for Latin1 {
    fn name(&self) -> &'static str {
        DEFAULT_SOURCE_ENCODING
    }

    fn decode<'a>(&self, input: &'a [u8]) -> Cow<'a, str> {
        encoding_rs::mem::decode_latin1(input)
    }
}

/// Registry of source encodings keyed by configuration name.
///
/// Names are matched exactly, so `"ISO-8859-1"` and `"iso-8859-1"` are distinct
/// entries.
#[derive(Clone)]
pub struct EncodingRegistry {
    decoders: HashMap<SmolStr, Arc<dyn SourceDecoder>>,
}

impl EncodingRegistry {
    /// Creates a registry with no encodings.
    pub fn empty() -> Self {
        Self {
            decoders: HashMap::new(),
        }
    }

    /// Registers `decoder` under `name`, replacing any previous entry.
    pub fn register<D>(&mut self, name: impl Into<SmolStr>, decoder: D) -> &mut Self
    where
        D: SourceDecoder + 'static,
    {
        self.decoders.insert(name.into(), Arc::new(decoder));
        self
    }

    /// Builder-style variant of [`register`](Self::register).
    pub fn with<D>(mut self, name: impl Into<SmolStr>, decoder: D) -> Self
    where
        D: SourceDecoder + 'static,
    {
        self.register(name, decoder);
        self
    }

    /// Resolves the decoder registered under `name`.
    pub fn lookup(&self, name: &str) -> Result<Arc<dyn SourceDecoder>, TranscodeError> {
        self.decoders
            .get(name)
            .cloned()
            .ok_or_else(|| TranscodeError::UnsupportedEncoding(SmolStr::new(name)))
    }

    /// Returns `true` if a decoder is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.decoders.contains_key(name)
    }

    /// Registered encoding names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.decoders.keys().map(SmolStr::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for EncodingRegistry {
    /// Registry containing only ISO-8859-1.
    fn default() -> Self {
        Self::empty().with(DEFAULT_SOURCE_ENCODING, Latin1)
    }
}

impl fmt::Debug for EncodingRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodingRegistry")
            .field("encodings", &self.names())
            .finish()
    }
}
