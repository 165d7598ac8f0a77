// handlers/protected/mod.rs - Shell pages (session confirmed by the edge guard)
//
// Every page is gated a second time by the layout guard, which decides
// between the loading state, a redirect to sign-in, and the shell itself.

pub mod dashboard;
pub mod signout;

pub use dashboard::{dashboard, not_found, uploads};
pub use signout::signout;

use axum::{
    http::{header::LOCATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Extension,
};
use tera::Context;

use crate::app::AppState;
use crate::auth::SessionRecord;
use crate::guard::{LayoutGuard, RedirectSlot, Rendering, SessionQuery};
use crate::middleware::GuardedSession;

/// Session snapshot for a shell page: the record the edge guard confirmed,
/// or a fresh lookup when the page was reached without one.
pub(crate) async fn session_query(
    state: &AppState,
    guarded: Option<Extension<GuardedSession>>,
    headers: &HeaderMap,
) -> SessionQuery {
    match guarded {
        Some(Extension(GuardedSession(record))) => SessionQuery::resolved(Some(record)),
        None => SessionQuery::from_lookup(state.auth.get_session(headers).await),
    }
}

/// Run the layout guard over `query`; `Err` carries the response to send
/// instead of the shell.
pub(crate) fn gate_shell(state: &AppState, query: &SessionQuery) -> Result<Box<SessionRecord>, Response> {
    let mut guard = LayoutGuard::new(RedirectSlot::default());
    match guard.observe(query) {
        Rendering::Shell(record) => Ok(record),
        Rendering::Loading => Err(state.templates.render("loading.html", &Context::new())),
        Rendering::Nothing => match guard.navigator().location() {
            Some(location) => Err((StatusCode::FOUND, [(LOCATION, location)]).into_response()),
            None => Err(StatusCode::NO_CONTENT.into_response()),
        },
    }
}
