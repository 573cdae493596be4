//! Response capture.
//!
//! [`ResponseInterceptor`] stands between the upstream service and the client. It
//! takes the upstream response, keeps its status and headers aside, and reads the
//! whole body into memory. Nothing reaches the client until the body is complete,
//! so the final response can be decided on the full content and written once.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::{BufMut, Bytes, BytesMut};
use futures::ready;
use http::response::Parts;
use http::{HeaderMap, Response, StatusCode};
use http_body::Body as HttpBody;
use pin_project::pin_project;
use thiserror::Error;

use crate::error::BoxError;

/// Upper bound for the buffer allocated up front from a body's size hint.
const PREALLOCATE_LIMIT: u64 = 1024 * 1024;

/// An upstream response with its body fully read.
#[derive(Debug)]
pub struct CapturedResponse {
    parts: Parts,
    body: Bytes,
}

impl CapturedResponse {
    /// Assembles a captured response from a response head and body.
    pub fn from_parts(parts: Parts, body: Bytes) -> Self {
        Self { parts, body }
    }

    /// Status set by upstream. Responses that never set one carry `200 OK`.
    pub fn status(&self) -> StatusCode {
        self.parts.status
    }

    /// Headers set by upstream.
    pub fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }

    /// Mutable access to the captured headers.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.parts.headers
    }

    /// Every byte upstream wrote, in order.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Splits into response head and body.
    pub fn into_parts(self) -> (Parts, Bytes) {
        (self.parts, self.body)
    }
}

/// The upstream body failed before it was fully read.
#[derive(Debug, Error)]
#[error("response body failed after {buffered} bytes: {source}")]
pub struct CaptureError {
    parts: Parts,
    buffered: usize,
    source: BoxError,
}

impl CaptureError {
    /// Status set by upstream.
    pub fn status(&self) -> StatusCode {
        self.parts.status
    }

    /// Splits into the captured response head and the body error.
    ///
    /// Bytes read before the failure are discarded.
    pub fn into_parts(self) -> (Parts, BoxError) {
        (self.parts, self.source)
    }
}

/// Future that buffers an upstream response body.
///
/// Every data frame is appended to an owned buffer in arrival order. Trailers are
/// dropped. Resolves to a [`CapturedResponse`] at end of stream, or a
/// [`CaptureError`] if the body yields an error.
#[pin_project]
pub struct ResponseInterceptor<B> {
    parts: Option<Parts>,
    #[pin]
    body: B,
    buffer: BytesMut,
}

impl<B> ResponseInterceptor<B>
where
    B: HttpBody,
{
    /// Starts capturing `response`.
    pub fn new(response: Response<B>) -> Self {
        let (parts, body) = response.into_parts();
        let capacity = body
            .size_hint()
            .exact()
            .map(|len| len.min(PREALLOCATE_LIMIT))
            .and_then(|len| usize::try_from(len).ok())
            .unwrap_or(0);
        Self {
            parts: Some(parts),
            body,
            buffer: BytesMut::with_capacity(capacity),
        }
    }
}

impl<B> Future for ResponseInterceptor<B>
where
    B: HttpBody,
    B::Error: Into<BoxError>,
{
    type Output = Result<CapturedResponse, CaptureError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut this = self.project();
        loop {
            match ready!(this.body.as_mut().poll_frame(cx)) {
                Some(Ok(frame)) => {
                    if let Ok(data) = frame.into_data() {
                        this.buffer.put(data);
                    }
                }
                Some(Err(error)) => {
                    let parts = this
                        .parts
                        .take()
                        .expect("ResponseInterceptor polled after completion");
                    return Poll::Ready(Err(CaptureError {
                        parts,
                        buffered: this.buffer.len(),
                        source: error.into(),
                    }));
                }
                None => {
                    let parts = this
                        .parts
                        .take()
                        .expect("ResponseInterceptor polled after completion");
                    let body = std::mem::take(this.buffer).freeze();
                    return Poll::Ready(Ok(CapturedResponse { parts, body }));
                }
            }
        }
    }
}
