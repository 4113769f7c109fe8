use axum::response::Json;
use serde_json::{json, Value};

use crate::database::DatabaseManager;
use crate::error::ApiError;

/// GET / - service banner and route map
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Masjid API",
            "version": version,
            "endpoints": {
                "health": "/health (public)",
                "admin": "/api/a/context, /api/a/:slug/context (owner, admin, dkm)",
                "teacher": "/api/t/context, /api/t/:slug/context (owner, teacher)",
                "public": "/api/u/context, /api/u/:slug/context (members; anonymous GET when enabled)",
            },
            "context_headers": ["Authorization", "X-Masjid-ID", "X-Masjid-Slug"],
        }
    }))
}

/// GET /health - liveness plus database reachability
pub async fn health() -> Result<Json<Value>, ApiError> {
    DatabaseManager::health_check().await?;

    Ok(Json(json!({
        "success": true,
        "data": {
            "status": "ok",
            "timestamp": chrono::Utc::now(),
            "database": "ok"
        }
    })))
}

pub async fn not_found() -> ApiError {
    ApiError::not_found("Route not found")
}
