use axum::{
    http::{header, Method},
    middleware,
    routing::{get, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::handlers;
use crate::shared::state::AppState;
use crate::system::middleware::request_logger::request_logger;

/// Конфигурация всех роутов приложения
pub fn configure_routes(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    Router::new()
        .route("/", get(handlers::a001_requerimiento::index))
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // REQUERIMIENTOS
        // ========================================
        .route(
            "/requerimientos",
            get(handlers::a001_requerimiento::list_all).post(handlers::a001_requerimiento::create),
        )
        .route(
            "/requerimientos/:id",
            get(handlers::a001_requerimiento::get_by_id).put(handlers::a001_requerimiento::update),
        )
        .route(
            "/requerimientos/:id/historial",
            get(handlers::a001_requerimiento::get_historial),
        )
        .route(
            "/requerimientos/desactivar/:id",
            put(handlers::a001_requerimiento::deactivate),
        )
        .with_state(state)
        .layer(middleware::from_fn(request_logger))
        .layer(cors)
}
