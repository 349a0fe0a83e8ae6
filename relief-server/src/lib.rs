pub mod config;
pub mod live;
pub mod routes;

use axum::Router;
use relief_core::store::ReportStore;
use std::path::Path;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub store: ReportStore,
}

/// API routes plus, when configured, the built dashboard as static files.
pub fn app(state: AppState, static_dir: Option<&Path>) -> Router {
    let mut router = routes::report_router(state);
    if let Some(dir) = static_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }
    router
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
