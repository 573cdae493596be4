//! Axum Integration Example
//!
//! Serves pages from handlers that still emit ISO-8859-1 and lets the recode
//! middleware deliver them as UTF-8.
//!
//! Features shown:
//! - Loading the converter configuration from YAML
//! - Applying the `Recode` Tower layer to a router through a `ServiceBuilder` stack
//! - Calling `Recoder::recode_response` from an Axum middleware function
//!
//! Run:
//!   RUST_LOG=debug cargo run -p recode-examples --example axum
//!
//! Endpoints:
//!   - http://localhost:3000/menu        - Latin-1 HTML, transcoded
//!   - http://localhost:3000/greeting    - Already UTF-8, passed through
//!   - http://localhost:3000/legacy/menu - Same page through `from_fn_with_state`
//!
//! Try it:
//!   curl -i http://localhost:3000/menu
//!   curl -i http://localhost:3000/greeting

use std::sync::Arc;

use axum::{
    Router,
    extract::{Request, State},
    middleware::{Next, from_fn_with_state},
    response::IntoResponse,
    routing::get,
};
use bytes::Bytes;
use http::header::CONTENT_TYPE;
use recode::ConverterConfig;
use recode_http::{RecodedBody, Recoder};
use recode_tower::Recode;
use tower::ServiceBuilder;
use tracing_subscriber::EnvFilter;

const CONFIG: &str = r#"
sourceEncoding: ISO-8859-1
charsetLabel: source
"#;

// Handlers

async fn menu() -> impl IntoResponse {
    (
        [(CONTENT_TYPE, "text/html")],
        Bytes::from_static(b"<h1>Cr\xe8me br\xfbl\xe9e</h1><p>Caf\xe9 au lait, 3 \xa4</p>"),
    )
}

async fn greeting() -> impl IntoResponse {
    (
        [(CONTENT_TYPE, "text/plain; charset=utf-8")],
        "Grüße aus Zürich",
    )
}

async fn recode_legacy(
    State(recoder): State<Arc<Recoder>>,
    request: Request,
    next: Next,
) -> http::Response<RecodedBody> {
    recoder.recode_response(next.run(request).await).await
}

// Main

#[tokio::main]
async fn main() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,recode=debug")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    let config: ConverterConfig = serde_saphyr::from_str(CONFIG).expect("Invalid configuration");
    tracing::info!(
        source_encoding = config.source_encoding(),
        charset_label = ?config.charset_label(),
        "Loaded configuration"
    );

    let recoder = Arc::new(Recoder::new(config.clone()));
    let legacy = Router::new()
        .route("/menu", get(menu))
        .layer(from_fn_with_state(recoder, recode_legacy));

    let app = Router::new()
        .route("/menu", get(menu))
        .route("/greeting", get(greeting))
        .layer(ServiceBuilder::new().layer(Recode::new(config)))
        .nest("/legacy", legacy);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000")
        .await
        .expect("Failed to bind to port 3000");
    tracing::info!("Listening on http://{}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.expect("Server error");
}
