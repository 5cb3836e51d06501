//! HTTP deployment surface
//!
//! Two ways to run: `serve` binds a local listener for interactive use;
//! `router` hands the same routes to an embedding host when the process is
//! running under a managed deployment (the `DEPLOY_ENV` flag selects which).
//! The pipeline is rebuilt per request from a fresh environment snapshot so
//! credential rotation takes effect without a restart.

use crate::audio;
use crate::config::Config;
use crate::pipeline::{ConsultRequest, ImageInput, LogProgress, Pipeline};
use anyhow::{Context, Result};
use axum::{
    extract::{DefaultBodyLimit, Multipart},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Uploads larger than this are rejected before they reach the pipeline.
const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// Build the consultation router. Embeddable into a host application.
pub fn router() -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/consult", post(consult))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(RequestBodyLimitLayer::new(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any))
        .layer(TraceLayer::new_for_http())
}

/// Bind the local listener and serve until shutdown.
pub async fn serve(host: &str, port: u16) -> Result<()> {
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .with_context(|| format!("Invalid bind address {host}:{port}"))?;

    info!("Serving consultation API on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, router())
        .await
        .context("Server terminated")?;
    Ok(())
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// `POST /api/consult`: multipart with an optional `audio` WAV part and an
/// optional `image` part. Responds with the five-field pipeline result; the
/// pipeline's own failure boundary means this handler never surfaces a 500
/// for a stage failure, only for malformed uploads.
async fn consult(mut multipart: Multipart) -> Result<impl IntoResponse, (StatusCode, String)> {
    let mut request = ConsultRequest::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("Malformed multipart: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| (StatusCode::BAD_REQUEST, format!("Unreadable field {name}: {e}")))?;

        match name.as_str() {
            "audio" => {
                let capture = audio::capture_from_wav_bytes(&bytes).map_err(|e| {
                    (StatusCode::BAD_REQUEST, format!("Invalid WAV payload: {e}"))
                })?;
                request.capture = Some(capture);
            }
            "image" => {
                request.image = Some(ImageInput::Bytes(bytes.to_vec()));
            }
            other => warn!("Ignoring unknown multipart field {other}"),
        }
    }

    // Fresh environment snapshot per request: rotated credentials apply
    // without restarting the process.
    let config = Config::from_env();
    let pipeline = Pipeline::from_config(&config);
    let result = pipeline.run(request, &LogProgress).await;

    Ok(Json(result))
}
