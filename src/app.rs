use axum::{middleware, routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::AppMode;
use crate::handlers;
use crate::middleware::{masjid_context_middleware, ContextServices, RouteGuard};

/// Full application router: service endpoints plus one guarded group per mode
pub fn app(services: ContextServices) -> Router {
    Router::new()
        // Public
        .route("/", get(handlers::system::root))
        .route("/health", get(handlers::system::health))
        // Masjid-scoped groups
        .nest("/api/a", scoped_routes(&services, AppMode::Admin))
        .nest("/api/t", scoped_routes(&services, AppMode::Teacher))
        .nest("/api/u", scoped_routes(&services, AppMode::Public))
        .fallback(handlers::system::not_found)
        // Global middleware
        .layer(TraceLayer::new_for_http())
}

/// Routes guarded by the masjid context middleware in the given mode.
/// `route_layer` keeps path parameters visible to the middleware.
fn scoped_routes(services: &ContextServices, mode: AppMode) -> Router {
    let guard = RouteGuard::new(services.clone(), mode);

    Router::new()
        .route("/context", get(handlers::context::context_get))
        .route("/:slug/context", get(handlers::context::context_get))
        .route_layer(middleware::from_fn_with_state(guard, masjid_context_middleware))
}

/// CORS from configuration; permissive when no origins are listed
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let parsed: Vec<axum::http::HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    if parsed.is_empty() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(parsed)
            .allow_methods(tower_http::cors::Any)
            .allow_headers(tower_http::cors::Any)
    }
}
