//! Per-response recoding.
//!
//! [`Recoder`] turns a [`CapturedResponse`] into the response sent to the client:
//!
//! 1. Responses with a `Content-Encoding` other than `identity` are passed through,
//!    body and headers alike. Their `Content-Type` is not given a charset.
//! 2. With [`CharsetLabel::Source`], `charset=<source encoding>` is appended to a
//!    `Content-Type` that declares no charset. This happens before the body is
//!    inspected.
//! 3. The body is transcoded to UTF-8.
//! 4. On success the captured status is kept, `Content-Length` is updated for
//!    decoded bodies and, with [`CharsetLabel::Utf8`], the charset is set to UTF-8.
//! 5. On failure the client gets a `500` with the error text as a plain-text body.

use bytes::Bytes;
use http::header::{
    CONTENT_ENCODING, CONTENT_LENGTH, CONTENT_TYPE, HeaderMap, HeaderValue, X_CONTENT_TYPE_OPTIONS,
};
use http::response::Parts;
use http::{Response, StatusCode};
use http_body::Body as HttpBody;
use recode::{
    CharsetLabel, ConverterConfig, EncodingRegistry, Outcome, Transcoder, UTF8_CHARSET,
};
use tracing::{Span, debug, warn};

use crate::body::RecodedBody;
use crate::content_type::{append_charset, replace_charset};
use crate::error::{BoxError, RecodeError};
use crate::interceptor::{CapturedResponse, ResponseInterceptor};

/// Applies a [`ConverterConfig`] to captured responses.
///
/// Compressed responses (any `Content-Encoding` but `identity`) keep their body and
/// their `Content-Type` as-is.
///
/// Immutable after construction and safe to share between concurrent requests.
#[derive(Debug, Clone, Default)]
pub struct Recoder {
    config: ConverterConfig,
    transcoder: Transcoder,
}

impl Recoder {
    /// Creates a recoder using the default encoding registry.
    pub fn new(config: ConverterConfig) -> Self {
        Self {
            config,
            transcoder: Transcoder::default(),
        }
    }

    /// Creates a recoder resolving source encodings in `registry`.
    pub fn with_registry(config: ConverterConfig, registry: EncodingRegistry) -> Self {
        Self {
            config,
            transcoder: Transcoder::new(registry),
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// The transcoder used for bodies.
    pub fn transcoder(&self) -> &Transcoder {
        &self.transcoder
    }

    /// Captures `response` and recodes it.
    ///
    /// Convenience for callers outside of Tower, e.g. `axum::middleware::from_fn`.
    pub async fn recode_response<B>(&self, response: Response<B>) -> Response<RecodedBody>
    where
        B: HttpBody,
        B::Error: Into<BoxError>,
    {
        match ResponseInterceptor::new(response).await {
            Ok(captured) => self.recode(captured),
            Err(error) => {
                let (parts, source) = error.into_parts();
                self.fail(parts, RecodeError::Body(source))
            }
        }
    }

    /// Builds the client response for a captured upstream response.
    pub fn recode(&self, captured: CapturedResponse) -> Response<RecodedBody> {
        let (mut parts, body) = captured.into_parts();

        if is_content_encoded(&parts.headers) {
            debug!(
                content_encoding = ?parts.headers.get(CONTENT_ENCODING),
                "encoded body passed through"
            );
            return Response::from_parts(parts, RecodedBody::new(body));
        }

        let source_encoding = self.config.source_encoding();
        if self.config.charset_label() == CharsetLabel::Source {
            append_charset(&mut parts.headers, source_encoding);
        }

        let transcoded = match self.transcoder.transcode(body, source_encoding) {
            Ok(transcoded) => transcoded,
            Err(error) => return self.fail(parts, error.into()),
        };

        let span = Span::current();
        span.record("detected", transcoded.detection().name());
        span.record("outcome", transcoded.outcome().as_str());

        if self.config.charset_label() == CharsetLabel::Utf8 {
            replace_charset(&mut parts.headers, UTF8_CHARSET);
        }

        let outcome = transcoded.outcome();
        let body = transcoded.into_body();
        if outcome == Outcome::Transcoded && parts.headers.contains_key(CONTENT_LENGTH) {
            parts
                .headers
                .insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
        }

        Response::from_parts(parts, RecodedBody::new(body))
    }

    /// Builds the `500` response reporting `error`.
    ///
    /// The upstream headers are kept apart from those describing the body, which is
    /// replaced by the error text.
    pub fn fail(&self, mut parts: Parts, error: RecodeError) -> Response<RecodedBody> {
        warn!(
            %error,
            source_encoding = self.config.source_encoding(),
            upstream_status = parts.status.as_u16(),
            "responding with internal server error"
        );
        Span::current().record("outcome", "error");
        if matches!(error, RecodeError::Body(_)) {
            recode::metrics::record_transcode(Outcome::BodyError, 0);
        }

        parts.status = StatusCode::INTERNAL_SERVER_ERROR;
        parts.headers.remove(CONTENT_LENGTH);
        parts.headers.remove(CONTENT_ENCODING);
        parts.headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        parts
            .headers
            .insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));

        Response::from_parts(parts, RecodedBody::new(Bytes::from(format!("{error}\n"))))
    }
}

fn is_content_encoded(headers: &HeaderMap) -> bool {
    headers
        .get_all(CONTENT_ENCODING)
        .iter()
        .any(|value| !value.as_bytes().trim_ascii().eq_ignore_ascii_case(b"identity"))
}
