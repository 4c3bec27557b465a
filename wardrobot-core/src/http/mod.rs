// src/http/mod.rs
//
// HTTP surface for the wardrobe service: the ingestion endpoint, the two
// narrower single-stage endpoints (palette, background removal), item CRUD,
// outfit suggestions, and stored-image serving.

pub mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_server::{Handle, Server};
use tokio::sync::oneshot;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use wardrobot_ai::AiClient;
use wardrobot_common::traits::WardrobeItemRepo;
use wardrobot_common::Error;

use crate::processing::Segmenter;
use crate::services::IngestService;
use crate::storage::MediaStore;

/// Uploads above this size are rejected outright.
const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Shared state for all routes.
#[derive(Clone)]
pub struct AppState {
    pub ingest: Arc<IngestService>,
    pub repo: Arc<dyn WardrobeItemRepo>,
    pub store: Arc<MediaStore>,
    pub segmenter: Arc<dyn Segmenter>,
    pub ai: Arc<AiClient>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/items/ingest", post(handlers::ingest_item))
        .route("/api/images/palette", post(handlers::extract_image_palette))
        .route(
            "/api/images/remove-background",
            post(handlers::remove_image_background),
        )
        .route(
            "/api/items",
            get(handlers::list_items).post(handlers::create_item),
        )
        .route(
            "/api/items/{id}",
            get(handlers::get_item)
                .put(handlers::update_item)
                .delete(handlers::delete_item),
        )
        .route("/api/outfits/suggest", post(handlers::suggest_outfits))
        .route("/media/{name}", get(handlers::serve_media))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
}

/// Bind and serve until the returned sender fires, then shut down gracefully.
pub async fn start_http_server(
    addr: SocketAddr,
    state: AppState,
) -> Result<oneshot::Sender<()>, Error> {
    let app = build_router(state);

    let (shutdown_send, shutdown_recv) = oneshot::channel::<()>();
    info!("HTTP server listening on http://{}", addr);

    let handle = Handle::new();
    let handle_clone = handle.clone();

    tokio::spawn(async move {
        let _ = shutdown_recv.await;
        handle_clone.graceful_shutdown(None);
    });

    let server = Server::bind(addr)
        .handle(handle)
        .serve(app.into_make_service());

    tokio::spawn(async move {
        if let Err(e) = server.await {
            error!("HTTP server error: {}", e);
        }
        info!("HTTP server shut down.");
    });

    Ok(shutdown_send)
}

/// Error wrapper that maps the shared error taxonomy onto HTTP statuses.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::Decode(_) | Error::Parse(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!("request failed: {}", self.0);
        }
        let body = Json(serde_json::json!({ "error": self.0.to_string() }));
        (status, body).into_response()
    }
}
