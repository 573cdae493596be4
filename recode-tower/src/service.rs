use std::sync::Arc;
use std::task::{Context, Poll};

use http::{Request, Response};
use hyper::body::Body as HttpBody;
use recode_http::{BoxError, RecodedBody, Recoder};
use tower::Service;
use tracing::{debug_span, field};

use crate::future::RecodeFuture;

/// Tower [`Service`] produced by [`Recode`](crate::Recode).
///
/// Forwards every request to the wrapped service unchanged, then buffers and
/// transcodes its response.
#[derive(Debug)]
pub struct RecodeService<S> {
    upstream: S,
    recoder: Arc<Recoder>,
}

impl<S> RecodeService<S> {
    /// Wraps `upstream`.
    pub fn new(upstream: S, recoder: Arc<Recoder>) -> Self {
        RecodeService { upstream, recoder }
    }

    /// The wrapped service.
    pub fn get_ref(&self) -> &S {
        &self.upstream
    }

    /// Consumes the middleware, returning the wrapped service.
    pub fn into_inner(self) -> S {
        self.upstream
    }
}

impl<S> Clone for RecodeService<S>
where
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            upstream: self.upstream.clone(),
            recoder: Arc::clone(&self.recoder),
        }
    }
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for RecodeService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    ResBody: HttpBody,
    ResBody::Error: Into<BoxError>,
{
    type Response = Response<RecodedBody>;
    type Error = S::Error;
    type Future = RecodeFuture<S::Future, ResBody>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.upstream.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let span = debug_span!(
            "recode.response",
            method = %req.method(),
            uri = %req.uri(),
            status = field::Empty,
            detected = field::Empty,
            outcome = field::Empty,
        );
        let upstream = {
            let _entered = span.enter();
            self.upstream.call(req)
        };
        RecodeFuture::new(upstream, Arc::clone(&self.recoder), span)
    }
}
