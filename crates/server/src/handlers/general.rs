//! # General Route Handlers
//!
//! The root liveness endpoint and the plain health check.

use crate::types::StatusResponse;
use axum::Json;
use chrono::Utc;

/// The handler for the root (`/`) endpoint.
pub async fn root() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok".to_string(),
        message: "Artwork metadata server is running.".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// The handler for the health check (`/health`) endpoint.
pub async fn health_check() -> &'static str {
    "OK"
}
