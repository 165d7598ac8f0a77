// handlers/api/session.rs - GET /api/session

use axum::{extract::State, http::HeaderMap};

use crate::app::AppState;
use crate::auth::SessionRecord;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

/// Current session, `data: null` when signed out
pub async fn session(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Option<SessionRecord>> {
    match state.auth.get_session(&headers).await {
        Ok(record) => Ok(ApiResponse::success(record.filter(|r| !r.is_expired()))),
        Err(err) => {
            tracing::warn!(error = %err, "session lookup failed");
            Err(ApiError::bad_gateway("Session lookup failed"))
        }
    }
}
