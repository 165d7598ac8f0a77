// handlers/public/mod.rs - Auth pages (no session required)
//
// Every page renders its form again on failure: `422` for local validation
// failures (no call to the auth service) and the remote status for errors the
// auth service reports.

pub mod password;
pub mod signin;
pub mod signup;
pub mod verify_email;

pub use password::{forgot_password_get, forgot_password_post, reset_password_get, reset_password_post};
pub use signin::{signin_get, signin_post, signin_social};
pub use signup::{signup_get, signup_post};
pub use verify_email::verify_email_get;

use axum::{http::StatusCode, response::Response};
use serde::Serialize;
use tera::Context;

use crate::app::AppState;
use crate::auth::AuthError;
use crate::forms::FormErrors;

/// Render an auth page with its submitted values and inline errors
pub(crate) fn auth_page(
    state: &AppState,
    template: &str,
    status: StatusCode,
    form: &impl Serialize,
    errors: &FormErrors,
    extend: impl FnOnce(&mut Context),
) -> Response {
    let mut context = Context::new();
    context.insert("form", form);
    context.insert("errors", errors);
    context.insert("social_providers", &state.config.auth.social_providers);
    extend(&mut context);
    state.templates.render_with_status(status, template, &context)
}

/// Root-level form error for a failed auth service call
pub(crate) fn remote_failure(err: &AuthError, fallback: &str) -> (StatusCode, FormErrors) {
    tracing::warn!(error = %err, "auth service rejected request");
    let message = err.user_message().unwrap_or(fallback);
    (err.response_status(), FormErrors::root(message))
}
