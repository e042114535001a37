pub mod error;
pub mod handlers;
pub mod requests;
pub mod responses;

use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::ingest::IngestEngine;
use crate::core::Storage;

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub ingest: IngestEngine,
}

impl AppState {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            ingest: IngestEngine::new(storage.clone()),
            storage,
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/candidates/upload",
            post(handlers::upload_candidates).fallback(error::method_not_allowed),
        )
        .route(
            "/assignments/create",
            post(handlers::create_assignments).fallback(error::method_not_allowed),
        )
        .route(
            "/summary",
            get(handlers::employee_summary).fallback(error::method_not_allowed),
        )
}

pub fn build_router(state: AppState, allowed_origins: &[String]) -> Router {
    // 設定驗證時已檢查過 origin，這裡忽略無法轉成 header 的值
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    router()
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
