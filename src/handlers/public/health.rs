// handlers/public/health.rs - GET /health

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::context::AppContext;

/// Liveness plus a database round-trip.
///
/// Not a dispatch handler: the degraded case is a 503 that still carries
/// a status document rather than an error envelope.
pub async fn health(State(ctx): State<AppContext>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match ctx.devices().ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "database": "unavailable"
                })),
            )
        }
    }
}
