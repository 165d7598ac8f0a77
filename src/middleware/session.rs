use axum::{
    extract::{Request, State},
    http::{header::LOCATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::app::AppState;
use crate::auth::SessionRecord;
use crate::guard::{evaluate, GuardDecision};
use crate::route::SIGN_IN_PATH;

/// Session confirmed by the edge guard, available to protected handlers
#[derive(Clone, Debug)]
pub struct GuardedSession(pub SessionRecord);

/// Edge request guard: runs before every handler, public or not
pub async fn session_guard(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let decision = evaluate(
        state.auth.as_ref(),
        &state.config.auth.session_cookie,
        &path,
        request.headers(),
    )
    .await;

    match decision {
        GuardDecision::Pass => next.run(request).await,
        GuardDecision::Allow(record) => {
            tracing::debug!(path = %path, user_id = %record.user.id, "session confirmed");
            request.extensions_mut().insert(GuardedSession(*record));
            next.run(request).await
        }
        GuardDecision::Deny(reason) => {
            tracing::debug!(path = %path, reason = reason.as_str(), "redirecting to sign-in");
            sign_in_redirect()
        }
    }
}

/// `302 Found` to the sign-in page
pub fn sign_in_redirect() -> Response {
    (StatusCode::FOUND, [(LOCATION, SIGN_IN_PATH)]).into_response()
}
