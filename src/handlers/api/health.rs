// handlers/api/health.rs - GET /api/health

use axum::{extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::app::AppState;
use crate::database::DatabaseError;
use crate::middleware::ApiResponse;

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub version: &'static str,
    pub database: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_error: Option<String>,
}

pub async fn health(State(state): State<AppState>) -> ApiResponse<Health> {
    let mut health = Health {
        status: "ok",
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION"),
        database: "ok",
        database_error: None,
    };

    match state.users.health_check().await {
        Ok(()) => ApiResponse::success(health),
        // Running without a database is a supported mode
        Err(DatabaseError::ConfigMissing(_)) => {
            health.database = "not_configured";
            ApiResponse::success(health)
        }
        Err(err) => {
            tracing::error!(error = %err, "database health check failed");
            health.status = "degraded";
            health.database = "unavailable";
            health.database_error = Some(err.to_string());
            ApiResponse::with_status(health, StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}
