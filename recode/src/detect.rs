//! Charset sniffing.
//!
//! [`detect`] guesses the encoding of a byte sequence from content signals only,
//! checked in this order:
//!
//! 1. a byte-order mark,
//! 2. the whole input being valid UTF-8 (pure ASCII and empty input included),
//! 3. an HTML `<meta>` charset declaration near the start of the document,
//! 4. statistical scoring by [`chardetng`].
//!
//! The result is a guess. It is never overridden by the configured source encoding.

use std::fmt;

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};

/// Number of leading bytes searched for a `<meta>` charset declaration.
pub const PRESCAN_LIMIT: usize = 1024;

/// Signal that produced a [`Detection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionSource {
    /// Byte-order mark at the start of the input.
    ByteOrderMark,
    /// The input is valid UTF-8.
    Utf8,
    /// A `<meta charset>` or `<meta http-equiv="Content-Type">` declaration.
    MetaTag,
    /// Statistical guess.
    Statistical,
}

impl DetectionSource {
    /// Label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionSource::ByteOrderMark => "bom",
            DetectionSource::Utf8 => "utf8",
            DetectionSource::MetaTag => "meta",
            DetectionSource::Statistical => "statistical",
        }
    }
}

/// Result of sniffing a byte sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detection {
    encoding: &'static Encoding,
    source: DetectionSource,
}

impl Detection {
    /// The guessed encoding.
    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    /// WHATWG name of the guessed encoding, e.g. `"UTF-8"` or `"windows-1252"`.
    pub fn name(&self) -> &'static str {
        self.encoding.name()
    }

    /// Signal the guess was based on.
    pub fn source(&self) -> DetectionSource {
        self.source
    }

    /// Whether the input is classified as already being UTF-8.
    pub fn is_utf8(&self) -> bool {
        self.name().eq_ignore_ascii_case(UTF_8.name())
    }
}

impl fmt::Display for Detection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.source.as_str())
    }
}

/// Guesses the encoding of `input`.
pub fn detect(input: &[u8]) -> Detection {
    if let Some((encoding, _bom_len)) = Encoding::for_bom(input) {
        return Detection {
            encoding,
            source: DetectionSource::ByteOrderMark,
        };
    }

    if std::str::from_utf8(input).is_ok() {
        return Detection {
            encoding: UTF_8,
            source: DetectionSource::Utf8,
        };
    }

    let head = &input[..input.len().min(PRESCAN_LIMIT)];
    if let Some(encoding) = prescan_meta(head) {
        return Detection {
            encoding,
            source: DetectionSource::MetaTag,
        };
    }

    let mut detector = EncodingDetector::new();
    detector.feed(input, true);
    Detection {
        encoding: detector.guess(None, true),
        source: DetectionSource::Statistical,
    }
}

/// Finds the first `<meta>` tag in `head` declaring a known charset.
///
/// A tag declares a charset through its `charset` attribute, or through its
/// `content` attribute when `http-equiv` is `content-type`.
fn prescan_meta(head: &[u8]) -> Option<&'static Encoding> {
    let lower = head.to_ascii_lowercase();
    let mut rest = lower.as_slice();

    while let Some(start) = find(rest, b"<meta") {
        let after = &rest[start + b"<meta".len()..];
        if !after
            .first()
            .is_some_and(|&b| b.is_ascii_whitespace() || b == b'/')
        {
            rest = after;
            continue;
        }

        let mut attributes = Attributes::new(after);
        if let Some(encoding) = meta_charset(&mut attributes).and_then(Encoding::for_label) {
            return Some(encoding);
        }
        rest = attributes.remaining();
    }

    None
}

/// Charset label declared by the attributes of one `<meta>` tag.
///
/// Consumes the attributes up to the end of the tag.
fn meta_charset<'a>(attributes: &mut Attributes<'a>) -> Option<&'a [u8]> {
    let mut charset = None;
    let mut content = None;
    let mut pragma = false;

    for (name, value) in attributes.by_ref() {
        match name {
            b"charset" if charset.is_none() => charset = Some(value),
            b"content" if content.is_none() => content = Some(value),
            b"http-equiv" => pragma |= value.trim_ascii() == b"content-type",
            _ => {}
        }
    }

    match charset {
        Some(label) => Some(label.trim_ascii()).filter(|label| !label.is_empty()),
        None if pragma => content.and_then(content_charset),
        None => None,
    }
}

/// Extracts the charset from a `content` value such as `text/html; charset=label`.
fn content_charset(content: &[u8]) -> Option<&[u8]> {
    let mut rest = content;
    while let Some(start) = find(rest, b"charset") {
        let value = rest[start + b"charset".len()..].trim_ascii_start();
        let Some(value) = value.strip_prefix(b"=") else {
            rest = value;
            continue;
        };
        let value = value.trim_ascii_start();

        let label = match value.first() {
            Some(&quote @ (b'"' | b'\'')) => {
                let quoted = &value[1..];
                let end = quoted.iter().position(|&b| b == quote)?;
                &quoted[..end]
            }
            _ => {
                let end = value
                    .iter()
                    .position(|&b| b.is_ascii_whitespace() || b == b';')
                    .unwrap_or(value.len());
                &value[..end]
            }
        };
        return (!label.is_empty()).then_some(label);
    }
    None
}

/// Iterator over the `name=value` attributes of a tag, stopping at its closing `>`.
///
/// Attributes without a value yield an empty value.
struct Attributes<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Attributes<'a> {
    fn new(input: &'a [u8]) -> Self {
        Self { input, pos: 0 }
    }

    /// Input following the last consumed byte.
    fn remaining(&self) -> &'a [u8] {
        &self.input[self.pos..]
    }

    fn skip_whitespace(&mut self) {
        while self
            .input
            .get(self.pos)
            .is_some_and(|b| b.is_ascii_whitespace())
        {
            self.pos += 1;
        }
    }

    fn take_while(&mut self, mut accept: impl FnMut(u8) -> bool) -> &'a [u8] {
        let start = self.pos;
        while self.input.get(self.pos).is_some_and(|&b| accept(b)) {
            self.pos += 1;
        }
        &self.input[start..self.pos]
    }
}

impl<'a> Iterator for Attributes<'a> {
    type Item = (&'a [u8], &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.skip_whitespace();
            match self.input.get(self.pos) {
                None => return None,
                Some(b'>') => {
                    self.pos += 1;
                    return None;
                }
                Some(b'/') => self.pos += 1,
                Some(_) => break,
            }
        }

        let name = self.take_while(|b| !b.is_ascii_whitespace() && !matches!(b, b'=' | b'>' | b'/'));
        self.skip_whitespace();
        if self.input.get(self.pos) != Some(&b'=') {
            return Some((name, &b""[..]));
        }
        self.pos += 1;
        self.skip_whitespace();

        let value = match self.input.get(self.pos) {
            Some(&quote @ (b'"' | b'\'')) => {
                self.pos += 1;
                let value = self.take_while(|b| b != quote);
                self.pos = (self.pos + 1).min(self.input.len());
                value
            }
            _ => self.take_while(|b| !b.is_ascii_whitespace() && b != b'>'),
        };
        Some((name, value))
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
