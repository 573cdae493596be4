//! Response body produced by the recode middleware.

use std::convert::Infallible;
use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use http_body::{Body as HttpBody, Frame, SizeHint};

/// A fully buffered body.
///
/// Yields its bytes as a single data frame, then ends. Every response leaving the
/// middleware carries one of these: the transcoded body, the untouched body of a
/// passed-through response, or the text of an error response.
#[derive(Default)]
pub struct RecodedBody {
    data: Option<Bytes>,
}

impl RecodedBody {
    /// Creates a body yielding `data`.
    pub fn new(data: Bytes) -> Self {
        Self {
            data: (!data.is_empty()).then_some(data),
        }
    }

    /// Creates an empty body.
    pub fn empty() -> Self {
        Self::default()
    }
}

impl From<Bytes> for RecodedBody {
    fn from(data: Bytes) -> Self {
        Self::new(data)
    }
}

impl From<String> for RecodedBody {
    fn from(text: String) -> Self {
        Self::new(Bytes::from(text))
    }
}

impl HttpBody for RecodedBody {
    type Data = Bytes;
    type Error = Infallible;

    fn poll_frame(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        Poll::Ready(self.data.take().map(|bytes| Ok(Frame::data(bytes))))
    }

    fn size_hint(&self) -> SizeHint {
        let len = self.data.as_ref().map(|bytes| bytes.len() as u64).unwrap_or(0);
        SizeHint::with_exact(len)
    }

    fn is_end_stream(&self) -> bool {
        self.data.is_none()
    }
}

impl fmt::Debug for RecodedBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.data {
            Some(bytes) => f
                .debug_tuple("RecodedBody")
                .field(&format!("{} bytes", bytes.len()))
                .finish(),
            None => f.debug_tuple("RecodedBody").field(&"consumed").finish(),
        }
    }
}
