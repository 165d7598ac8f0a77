// handlers/api/proxy.rs - ANY /api/auth/* forwarded to the auth service

use axum::{
    body::to_bytes,
    extract::{Request, State},
    response::{IntoResponse, Response},
};

use crate::app::AppState;
use crate::auth::proxy::MAX_PROXY_BODY;
use crate::error::ApiError;

pub async fn auth_proxy(State(state): State<AppState>, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let body = match to_bytes(body, MAX_PROXY_BODY).await {
        Ok(body) => body,
        Err(_) => return ApiError::bad_request("Request body too large").into_response(),
    };

    match state.proxy.forward(parts, body).await {
        Ok(response) => response,
        Err(err) => ApiError::from(err).into_response(),
    }
}
