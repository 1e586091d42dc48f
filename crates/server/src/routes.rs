use std::path::Path;
use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, routing::get, Json, Router};
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;

use common::types::Health;
use configs::StorageConfig;
use service::{assets::AssetDir, catalog::ProductCatalog};

use crate::openapi::{ApiDoc, HealthResponse};

pub mod products;

#[derive(Clone)]
pub struct ServerState {
    pub catalog: Arc<dyn ProductCatalog>,
    pub assets: Arc<AssetDir>,
}

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the full application router: product API, stored images, admin page.
pub fn build_router(state: ServerState, storage: &StorageConfig, cors: CorsLayer) -> Router {
    let index = Path::new(&storage.frontend_dir).join("index.html");
    let frontend = ServeDir::new(&storage.frontend_dir).fallback(ServeFile::new(index));
    let assets_route = format!("/{}", storage.public_prefix.trim_matches('/'));

    let api = Router::new()
        .route("/api/products", get(products::list).post(products::create))
        .route(
            "/api/products/:id",
            get(products::get).put(products::update).delete(products::delete),
        )
        .layer(DefaultBodyLimit::max(storage.max_upload_bytes));

    Router::new()
        .route("/health", get(health))
        .route("/api-docs/openapi.json", get(openapi_json))
        .merge(api)
        .nest_service(&assets_route, ServeDir::new(&storage.assets_dir))
        .fallback_service(frontend)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                // 5xx
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
