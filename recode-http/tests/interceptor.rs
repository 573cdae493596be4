use std::convert::Infallible;
use std::io;

use bytes::Bytes;
use futures::stream;
use http::{HeaderMap, HeaderValue, Response, StatusCode};
use http_body::Frame;
use http_body_util::{Empty, Full, StreamBody};
use pretty_assertions::assert_eq;
use recode_http::ResponseInterceptor;

#[tokio::test]
async fn test_captures_full_body_and_head() {
    let response = Response::builder()
        .status(StatusCode::CREATED)
        .header("x-upstream", "yes")
        .body(Full::new(Bytes::from_static(b"caf\xe9")))
        .unwrap();

    let captured = ResponseInterceptor::new(response).await.unwrap();

    assert_eq!(captured.status(), StatusCode::CREATED);
    assert_eq!(captured.headers()["x-upstream"], "yes");
    assert_eq!(captured.body(), &Bytes::from_static(b"caf\xe9"));
}

#[tokio::test]
async fn test_concatenates_chunks_in_order() {
    let stream = stream::iter(vec![
        Ok::<_, Infallible>(Frame::data(Bytes::from("Gr"))),
        Ok(Frame::data(Bytes::from_static(b"\xfc"))),
        Ok(Frame::data(Bytes::new())),
        Ok(Frame::data(Bytes::from("n"))),
    ]);
    let response = Response::new(StreamBody::new(stream));

    let captured = ResponseInterceptor::new(response).await.unwrap();

    assert_eq!(captured.body(), &Bytes::from_static(b"Gr\xfcn"));
}

#[tokio::test]
async fn test_drops_trailers() {
    let mut trailers = HeaderMap::new();
    trailers.insert("x-checksum", HeaderValue::from_static("abc"));
    let stream = stream::iter(vec![
        Ok::<_, Infallible>(Frame::data(Bytes::from("body"))),
        Ok(Frame::trailers(trailers)),
    ]);

    let captured = ResponseInterceptor::new(Response::new(StreamBody::new(stream)))
        .await
        .unwrap();

    assert_eq!(captured.body(), &Bytes::from("body"));
    assert!(!captured.headers().contains_key("x-checksum"));
}

#[tokio::test]
async fn test_empty_body_defaults_to_ok() {
    let captured = ResponseInterceptor::new(Response::new(Empty::<Bytes>::new()))
        .await
        .unwrap();

    assert_eq!(captured.status(), StatusCode::OK);
    assert!(captured.body().is_empty());
}

#[tokio::test]
async fn test_body_error_keeps_response_head() {
    let stream = stream::iter(vec![
        Ok(Frame::data(Bytes::from("partial"))),
        Err(io::Error::new(io::ErrorKind::ConnectionReset, "upstream reset")),
    ]);
    let response = Response::builder()
        .status(StatusCode::ACCEPTED)
        .body(StreamBody::new(stream))
        .unwrap();

    let error = ResponseInterceptor::new(response).await.unwrap_err();

    assert_eq!(error.status(), StatusCode::ACCEPTED);
    assert_eq!(
        error.to_string(),
        "response body failed after 7 bytes: upstream reset"
    );
    let (parts, source) = error.into_parts();
    assert_eq!(parts.status, StatusCode::ACCEPTED);
    assert_eq!(source.to_string(), "upstream reset");
}
