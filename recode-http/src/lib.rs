//! HTTP plumbing for [`recode`]: response capture, `Content-Type` charset handling
//! and the per-response recoding logic shared by the middleware integrations.
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod body;
pub mod content_type;
pub mod error;
pub mod interceptor;
mod recoder;

pub use body::RecodedBody;
pub use error::{BoxError, RecodeError};
pub use interceptor::{CaptureError, CapturedResponse, ResponseInterceptor};
pub use recoder::Recoder;
