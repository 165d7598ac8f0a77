// handlers/protected/signout.rs - POST /signout

use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
};

use crate::app::AppState;
use crate::auth::cookie::removal_cookies;
use crate::handlers::with_cookies;
use crate::route::SIGN_IN_PATH;

/// Sign out with the auth service, then clear the local session cookie
/// whatever the service answered.
pub async fn signout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let forwarded = match state.auth.sign_out(&headers).await {
        Ok(exchange) => {
            tracing::info!("signed out");
            exchange.cookies
        }
        Err(err) => {
            tracing::warn!(error = %err, "sign-out failed upstream, clearing local session anyway");
            Vec::new()
        }
    };

    let jar = removal_cookies(&state.config.auth.session_cookie, state.config.security.secure_cookies);
    with_cookies((jar, Redirect::to(SIGN_IN_PATH)).into_response(), forwarded)
}
