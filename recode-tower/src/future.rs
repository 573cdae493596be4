use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::ready;
use http::Response;
use hyper::body::Body as HttpBody;
use pin_project::pin_project;
use recode_http::{BoxError, RecodeError, RecodedBody, Recoder, ResponseInterceptor};
use tracing::Span;

#[pin_project(project = StateProj)]
enum State<F, B> {
    Upstream {
        #[pin]
        future: F,
    },
    Capturing {
        #[pin]
        interceptor: ResponseInterceptor<B>,
    },
    Done,
}

/// Response future of [`RecodeService`](crate::service::RecodeService).
///
/// Waits for the upstream response, buffers its body and resolves to the recoded
/// response. Errors of the upstream service are returned as they are; failures
/// of the upstream body become `500` responses.
#[pin_project]
pub struct RecodeFuture<F, B> {
    #[pin]
    state: State<F, B>,
    recoder: Arc<Recoder>,
    span: Span,
}

impl<F, B> RecodeFuture<F, B> {
    /// Creates a future driving `upstream` inside `span`.
    pub fn new(upstream: F, recoder: Arc<Recoder>, span: Span) -> Self {
        RecodeFuture {
            state: State::Upstream { future: upstream },
            recoder,
            span,
        }
    }
}

impl<F, B, E> Future for RecodeFuture<F, B>
where
    F: Future<Output = Result<Response<B>, E>>,
    B: HttpBody,
    B::Error: Into<BoxError>,
{
    type Output = Result<Response<RecodedBody>, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut this = self.project();
        let _entered = this.span.enter();

        loop {
            match this.state.as_mut().project() {
                StateProj::Upstream { future } => {
                    let response = match ready!(future.poll(cx)) {
                        Ok(response) => response,
                        Err(error) => {
                            this.state.set(State::Done);
                            return Poll::Ready(Err(error));
                        }
                    };
                    this.span.record("status", response.status().as_u16());
                    this.state.set(State::Capturing {
                        interceptor: ResponseInterceptor::new(response),
                    });
                }
                StateProj::Capturing { interceptor } => {
                    let response = match ready!(interceptor.poll(cx)) {
                        Ok(captured) => this.recoder.recode(captured),
                        Err(error) => {
                            let (parts, source) = error.into_parts();
                            this.recoder.fail(parts, RecodeError::Body(source))
                        }
                    };
                    this.state.set(State::Done);
                    return Poll::Ready(Ok(response));
                }
                StateProj::Done => panic!("RecodeFuture polled after completion"),
            }
        }
    }
}
