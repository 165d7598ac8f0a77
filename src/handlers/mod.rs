// handlers/mod.rs - Handler tiers
//
// Public (no session) → API (no session, JSON) → Protected (session confirmed
// by the edge guard, rendered inside the shell)
pub mod api;
pub mod protected;
pub mod public;

use axum::{
    http::{header::SET_COOKIE, HeaderValue},
    response::Response,
};

/// Append `Set-Cookie` values handed back by the auth service
pub(crate) fn with_cookies(mut response: Response, cookies: Vec<HeaderValue>) -> Response {
    let headers = response.headers_mut();
    for cookie in cookies {
        headers.append(SET_COOKIE, cookie);
    }
    response
}
