//! Tower middleware that transcodes HTTP response bodies to UTF-8.
//!
//! [`Recode`] is a Tower [`Layer`] for servers whose handlers emit text in a legacy
//! single-byte encoding. Each response of the wrapped service is buffered in full,
//! checked for UTF-8 and, if it is not UTF-8, decoded from the configured source
//! encoding (ISO-8859-1 by default).
//!
//! # Quick Start
//!
//! ```
//! use recode::CharsetLabel;
//! use recode_tower::Recode;
//! use tower::{ServiceBuilder, service_fn};
//!
//! let layer = Recode::builder()
//!     .source_encoding("ISO-8859-1")
//!     .charset_label(CharsetLabel::Source)
//!     .build();
//!
//! let service = ServiceBuilder::new()
//!     .layer(layer)
//!     .service(service_fn(|_req: http::Request<()>| async {
//!         Ok::<_, std::convert::Infallible>(http::Response::new(String::from("caf\u{e9}")))
//!     }));
//! # drop(service);
//! ```
//!
//! # Responses
//!
//! | Upstream response | Client receives |
//! |-------------------|-----------------|
//! | UTF-8 body (ASCII included) | The same bytes |
//! | Any other body | The body decoded from the source encoding |
//! | Body with a `Content-Encoding` other than `identity` | The same bytes and headers |
//! | Unsupported source encoding, or a body that fails mid-stream | `500` with the error text |
//!
//! With [`CharsetLabel::Source`] the source encoding is appended to a `Content-Type`
//! without a charset, exactly as configured. [`CharsetLabel::Utf8`] rewrites the
//! charset to `UTF-8` instead. The status code of upstream is kept, except for
//! error responses.
//!
//! Responses are buffered in memory, so streaming bodies such as server-sent
//! events are only delivered once the stream ends.
//!
//! # Tracing
//!
//! Every request runs in a `recode.response` debug span recording the upstream
//! status, the detected encoding and the outcome.
//!
//! # Feature Flags
//!
//! - `metrics`: counts responses per outcome and transcoded bytes through the
//!   [`metrics`](https://docs.rs/metrics) facade.
//!
//! [`Layer`]: tower::Layer
//! [`CharsetLabel::Source`]: recode::CharsetLabel::Source
//! [`CharsetLabel::Utf8`]: recode::CharsetLabel::Utf8

#![warn(missing_docs)]

/// Response future of the recode service.
pub mod future;
/// Tower layer and builder.
pub mod layer;
/// The Tower service wrapping upstream.
pub mod service;

pub use layer::{Recode, RecodeBuilder};
pub use recode::{CharsetLabel, ConverterConfig, EncodingRegistry, SourceDecoder};
pub use recode_http::{RecodeError, RecodedBody, Recoder};
pub use service::RecodeService;
