use std::borrow::Cow;
use std::convert::Infallible;
use std::io;

use bytes::Bytes;
use futures::stream;
use http::header::{CONTENT_ENCODING, CONTENT_LENGTH, CONTENT_TYPE, X_CONTENT_TYPE_OPTIONS};
use http::{Response, StatusCode};
use http_body::Frame;
use http_body_util::{BodyExt, Full, StreamBody};
use pretty_assertions::assert_eq;
use recode::{CharsetLabel, ConverterConfig, EncodingRegistry, SourceDecoder};
use recode_http::{CapturedResponse, Recoder, RecodedBody};

fn captured(content_type: Option<&str>, body: &'static [u8]) -> CapturedResponse {
    let mut builder = Response::builder();
    if let Some(content_type) = content_type {
        builder = builder.header(CONTENT_TYPE, content_type);
    }
    let (parts, ()) = builder.body(()).unwrap().into_parts();
    CapturedResponse::from_parts(parts, Bytes::from_static(body))
}

async fn body_bytes(response: Response<RecodedBody>) -> Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn content_type(response: &Response<RecodedBody>) -> &str {
    response.headers()[CONTENT_TYPE].to_str().unwrap()
}

#[tokio::test]
async fn test_latin1_body_is_transcoded() {
    let response = Recoder::default().recode(captured(Some("text/plain"), b"\xe9"));

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(content_type(&response), "text/plain; charset=ISO-8859-1");
    assert_eq!(body_bytes(response).await, Bytes::from_static(&[0xC3, 0xA9]));
}

#[tokio::test]
async fn test_utf8_body_is_unchanged() {
    let response =
        Recoder::default().recode(captured(Some("text/plain; charset=utf-8"), b"hello"));

    assert_eq!(content_type(&response), "text/plain; charset=utf-8");
    assert_eq!(body_bytes(response).await, Bytes::from("hello"));
}

#[tokio::test]
async fn test_missing_content_type_gets_bare_charset() {
    let response = Recoder::default().recode(captured(None, b"plain ascii"));

    assert_eq!(content_type(&response), "; charset=ISO-8859-1");
    assert_eq!(body_bytes(response).await, Bytes::from("plain ascii"));
}

#[tokio::test]
async fn test_unsupported_encoding_fails_for_any_body() {
    let recoder = Recoder::new(ConverterConfig::new("Shift_JIS"));

    for body in [&b""[..], &b"ascii"[..], &b"\xe9"[..]] {
        let (parts, ()) = Response::builder()
            .status(StatusCode::NOT_FOUND)
            .header(CONTENT_TYPE, "text/html")
            .header(CONTENT_LENGTH, body.len())
            .header("x-request-id", "42")
            .body(())
            .unwrap()
            .into_parts();
        let response = recoder.recode(CapturedResponse::from_parts(
            parts,
            Bytes::copy_from_slice(body),
        ));

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(content_type(&response), "text/plain; charset=utf-8");
        assert_eq!(response.headers()[X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert_eq!(response.headers()["x-request-id"], "42");
        assert!(!response.headers().contains_key(CONTENT_LENGTH));
        assert_eq!(
            body_bytes(response).await,
            Bytes::from("unsupported source encoding: Shift_JIS\n")
        );
    }
}

#[tokio::test]
async fn test_status_is_preserved() {
    let (parts, ()) = Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header(CONTENT_TYPE, "text/html")
        .body(())
        .unwrap()
        .into_parts();
    let response = Recoder::default().recode(CapturedResponse::from_parts(
        parts,
        Bytes::from_static(b"<p>introuvable \xe0 cette adresse</p>"),
    ));

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_bytes(response).await,
        Bytes::from("<p>introuvable à cette adresse</p>")
    );
}

#[tokio::test]
async fn test_content_length_follows_transcoded_body() {
    let (parts, ()) = Response::builder()
        .header(CONTENT_TYPE, "text/plain")
        .header(CONTENT_LENGTH, "4")
        .body(())
        .unwrap()
        .into_parts();
    let response = Recoder::default().recode(CapturedResponse::from_parts(
        parts,
        Bytes::from_static(b"caf\xe9"),
    ));

    assert_eq!(response.headers()[CONTENT_LENGTH], "5");
    assert_eq!(body_bytes(response).await, Bytes::from("café"));
}

#[tokio::test]
async fn test_content_length_kept_for_unchanged_body() {
    // HEAD responses announce a length without carrying a body.
    let (parts, ()) = Response::builder()
        .header(CONTENT_TYPE, "text/plain")
        .header(CONTENT_LENGTH, "1024")
        .body(())
        .unwrap()
        .into_parts();
    let response =
        Recoder::default().recode(CapturedResponse::from_parts(parts, Bytes::new()));

    assert_eq!(response.headers()[CONTENT_LENGTH], "1024");
}

#[tokio::test]
async fn test_content_encoded_body_passes_through() {
    let (parts, ()) = Response::builder()
        .header(CONTENT_TYPE, "text/plain")
        .header(CONTENT_ENCODING, "gzip")
        .body(())
        .unwrap()
        .into_parts();
    let gzipped: &[u8] = &[0x1f, 0x8b, 0x08, 0x00, 0xff];
    let response = Recoder::default().recode(CapturedResponse::from_parts(
        parts,
        Bytes::copy_from_slice(gzipped),
    ));

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(content_type(&response), "text/plain");
    assert_eq!(body_bytes(response).await, Bytes::copy_from_slice(gzipped));
}

#[tokio::test]
async fn test_utf8_label_mode() {
    let recoder = Recoder::new(ConverterConfig::default().with_charset_label(CharsetLabel::Utf8));

    let response = recoder.recode(captured(Some("text/html; charset=ISO-8859-1"), b"\xe9t\xe9"));
    assert_eq!(content_type(&response), "text/html; charset=UTF-8");
    assert_eq!(body_bytes(response).await, Bytes::from("été"));

    let response = recoder.recode(captured(Some("application/json"), b"{}"));
    assert_eq!(content_type(&response), "application/json; charset=UTF-8");
}

#[tokio::test]
async fn test_custom_registry() {
    struct Rot13;

    impl SourceDecoder for Rot13 {
        fn name(&self) -> &'static str {
            "ROT13-LATIN1"
        }

        fn decode<'a>(&self, input: &'a [u8]) -> Cow<'a, str> {
            Cow::Owned(
                input
                    .iter()
                    .map(|&byte| match byte {
                        b'a'..=b'z' => ((byte - b'a' + 13) % 26 + b'a') as char,
                        other => other as char,
                    })
                    .collect(),
            )
        }
    }

    let recoder = Recoder::with_registry(
        ConverterConfig::new("ROT13-LATIN1"),
        EncodingRegistry::empty().with("ROT13-LATIN1", Rot13),
    );

    let response = recoder.recode(captured(Some("text/plain"), b"uryyb \xff"));
    assert_eq!(content_type(&response), "text/plain; charset=ROT13-LATIN1");
    assert_eq!(body_bytes(response).await, Bytes::from("hello ÿ"));

    let response = recoder.recode(captured(Some("text/plain"), b"ascii"));
    assert_eq!(body_bytes(response).await, Bytes::from("ascii"));
}

#[tokio::test]
async fn test_recode_response_buffers_stream() {
    let stream = stream::iter(vec![
        Ok::<_, Infallible>(Frame::data(Bytes::from_static(b"na\xef"))),
        Ok(Frame::data(Bytes::from_static(b"ve"))),
    ]);
    let response = Response::builder()
        .header(CONTENT_TYPE, "text/plain")
        .body(StreamBody::new(stream))
        .unwrap();

    let response = Recoder::default().recode_response(response).await;

    assert_eq!(content_type(&response), "text/plain; charset=ISO-8859-1");
    assert_eq!(body_bytes(response).await, Bytes::from("naïve"));
}

#[tokio::test]
async fn test_recode_response_reports_body_error() {
    let stream = stream::iter(vec![
        Ok(Frame::data(Bytes::from("partial"))),
        Err(io::Error::other("connection lost")),
    ]);
    let response = Response::new(StreamBody::new(stream));

    let response = Recoder::default().recode_response(response).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_bytes(response).await,
        Bytes::from("failed to read response body: connection lost\n")
    );
}

#[tokio::test]
async fn test_full_body_roundtrip_through_recode_response() {
    let response = Response::new(Full::new(Bytes::from_static(b"\xc0 bient\xf4t")));

    let response = Recoder::default().recode_response(response).await;

    assert_eq!(body_bytes(response).await, Bytes::from("À bientôt"));
}
