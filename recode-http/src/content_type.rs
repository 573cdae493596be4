//! `Content-Type` charset parameter handling.
//!
//! A header counts as declaring a charset if the word `charset` appears anywhere
//! in it, in any case.

use http::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use tracing::warn;

/// Returns `true` if `value` mentions `charset`, case-insensitively.
pub fn has_charset(value: &[u8]) -> bool {
    value
        .windows(b"charset".len())
        .any(|window| window.eq_ignore_ascii_case(b"charset"))
}

/// Appends `; charset=<charset>` to the `Content-Type` header unless it already
/// declares a charset.
///
/// A missing header is treated as empty, so it becomes `; charset=<charset>`.
/// Returns `true` if the header was changed.
pub fn append_charset(headers: &mut HeaderMap, charset: &str) -> bool {
    let current = headers
        .get(CONTENT_TYPE)
        .map(HeaderValue::as_bytes)
        .unwrap_or_default();
    if has_charset(current) {
        return false;
    }

    let mut value = Vec::with_capacity(current.len() + charset.len() + 10);
    value.extend_from_slice(current);
    value.extend_from_slice(b"; charset=");
    value.extend_from_slice(charset.as_bytes());
    insert(headers, &value, charset)
}

/// Sets the charset parameter of the `Content-Type` header to `charset`,
/// rewriting any charset already declared.
///
/// Other parameters are kept in order. Values that are not visible ASCII are left
/// untouched. Returns `true` if the header was changed.
pub fn replace_charset(headers: &mut HeaderMap, charset: &str) -> bool {
    let Some(current) = headers.get(CONTENT_TYPE) else {
        return append_charset(headers, charset);
    };
    if !has_charset(current.as_bytes()) {
        return append_charset(headers, charset);
    }
    let Ok(current) = current.to_str() else {
        return false;
    };

    let mut params = current.split(';');
    let mut value = String::from(params.next().unwrap_or_default().trim());
    let mut declared = None;
    for param in params.map(str::trim).filter(|param| !param.is_empty()) {
        let (name, param_value) = param.split_once('=').unwrap_or((param, ""));
        if name.trim().eq_ignore_ascii_case("charset") {
            declared = Some(param_value.trim().trim_matches('"'));
            continue;
        }
        value.push_str("; ");
        value.push_str(param);
    }

    if declared.is_some_and(|declared| declared.eq_ignore_ascii_case(charset)) {
        return false;
    }

    value.push_str("; charset=");
    value.push_str(charset);
    insert(headers, value.as_bytes(), charset)
}

fn insert(headers: &mut HeaderMap, value: &[u8], charset: &str) -> bool {
    match HeaderValue::from_bytes(value) {
        Ok(value) => {
            headers.insert(CONTENT_TYPE, value);
            true
        }
        Err(_) => {
            warn!(charset, "charset is not a valid header value, Content-Type left unchanged");
            false
        }
    }
}
