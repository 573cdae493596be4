use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Source encoding assumed when none is configured.
pub const DEFAULT_SOURCE_ENCODING: &str = "ISO-8859-1";

/// Charset name declared for transcoded output.
pub const UTF8_CHARSET: &str = "UTF-8";

/// How the `Content-Type` charset parameter of a response is labelled.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CharsetLabel {
    /// Append `charset=<source encoding>` when the response declares no charset.
    ///
    /// The label is applied before the body is inspected, so a body that is already
    /// UTF-8 is still labelled with the configured source encoding.
    #[default]
    Source,
    /// Declare `charset=UTF-8` once the body has been transcoded, replacing any
    /// charset the upstream declared.
    Utf8,
}

/// Converter configuration.
///
/// Deserializes from the plugin-style `sourceEncoding` key as well as
/// `source_encoding`:
///
/// ```
/// use recode::{CharsetLabel, ConverterConfig};
///
/// let config: ConverterConfig =
///     serde_json::from_str(r#"{"sourceEncoding": "ISO-8859-1"}"#).unwrap();
/// assert_eq!(config.source_encoding(), "ISO-8859-1");
/// assert_eq!(config.charset_label(), CharsetLabel::Source);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConverterConfig {
    /// Name of the encoding non-UTF-8 bodies are decoded from.
    #[serde(default = "default_source_encoding", alias = "source_encoding")]
    pub source_encoding: SmolStr,
    /// Charset labelling mode.
    #[serde(default, alias = "charset_label")]
    pub charset_label: CharsetLabel,
}

fn default_source_encoding() -> SmolStr {
    SmolStr::new_static(DEFAULT_SOURCE_ENCODING)
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            source_encoding: default_source_encoding(),
            charset_label: CharsetLabel::default(),
        }
    }
}

impl ConverterConfig {
    /// Creates a configuration for the given source encoding.
    pub fn new(source_encoding: impl Into<SmolStr>) -> Self {
        Self {
            source_encoding: source_encoding.into(),
            ..Default::default()
        }
    }

    /// Sets the charset labelling mode.
    pub fn with_charset_label(self, charset_label: CharsetLabel) -> Self {
        Self {
            charset_label,
            ..self
        }
    }

    /// Name of the configured source encoding.
    pub fn source_encoding(&self) -> &str {
        &self.source_encoding
    }

    /// Configured charset labelling mode.
    pub fn charset_label(&self) -> CharsetLabel {
        self.charset_label
    }
}
