// handlers/public/password.rs - GET/POST /forgot-password, GET/POST /reset-password

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Response,
    Form,
};
use serde::{Deserialize, Serialize};

use super::{auth_page, remote_failure};
use crate::app::AppState;
use crate::forms::{
    self, ForgotPasswordForm, FormErrors, ResetPasswordForm, FORGOT_PASSWORD_FALLBACK, MISSING_RESET_TOKEN,
    RESET_PASSWORD_FALLBACK,
};
use crate::route::RESET_PASSWORD_PATH;

const FORGOT_TEMPLATE: &str = "auth/forgot_password.html";
const RESET_TEMPLATE: &str = "auth/reset_password.html";

/// Error code the auth service appends to the reset link when the token is bad
pub const INVALID_TOKEN: &str = "INVALID_TOKEN";

pub async fn forgot_password_get(State(state): State<AppState>) -> Response {
    render_forgot(&state, StatusCode::OK, &ForgotPasswordForm::default(), &FormErrors::default(), false)
}

pub async fn forgot_password_post(
    State(state): State<AppState>,
    Form(form): Form<ForgotPasswordForm>,
) -> Response {
    if let Err(errors) = forms::check(&form) {
        return render_forgot(&state, StatusCode::UNPROCESSABLE_ENTITY, &form, &errors, false);
    }

    match state.auth.request_password_reset(&form.email, RESET_PASSWORD_PATH).await {
        Ok(()) => {
            tracing::info!("password reset requested");
            render_forgot(&state, StatusCode::OK, &form, &FormErrors::default(), true)
        }
        Err(err) => {
            let (status, errors) = remote_failure(&err, FORGOT_PASSWORD_FALLBACK);
            render_forgot(&state, status, &form, &errors, false)
        }
    }
}

fn render_forgot(
    state: &AppState,
    status: StatusCode,
    form: &ForgotPasswordForm,
    errors: &FormErrors,
    sent: bool,
) -> Response {
    auth_page(state, FORGOT_TEMPLATE, status, form, errors, |context| {
        context.insert("sent", &sent);
    })
}

#[derive(Debug, Default, Deserialize)]
pub struct ResetPasswordQuery {
    pub token: Option<String>,
    pub error: Option<String>,
}

/// Which state of the reset page to show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResetView {
    Form,
    Invalid,
    Success,
}

pub async fn reset_password_get(
    State(state): State<AppState>,
    Query(query): Query<ResetPasswordQuery>,
) -> Response {
    let view = if query.error.as_deref() == Some(INVALID_TOKEN) {
        ResetView::Invalid
    } else {
        ResetView::Form
    };
    render_reset(&state, StatusCode::OK, view, query.token.as_deref(), &FormErrors::default())
}

pub async fn reset_password_post(
    State(state): State<AppState>,
    Form(form): Form<ResetPasswordForm>,
) -> Response {
    if let Err(errors) = forms::check(&form) {
        return render_reset(&state, StatusCode::UNPROCESSABLE_ENTITY, ResetView::Form, form.token(), &errors);
    }

    let Some(token) = form.token() else {
        let errors = FormErrors::root(MISSING_RESET_TOKEN);
        return render_reset(&state, StatusCode::BAD_REQUEST, ResetView::Form, None, &errors);
    };

    match state.auth.reset_password(&form.password, token).await {
        Ok(()) => {
            tracing::info!("password reset completed");
            render_reset(&state, StatusCode::OK, ResetView::Success, None, &FormErrors::default())
        }
        Err(err) => {
            let (status, errors) = remote_failure(&err, RESET_PASSWORD_FALLBACK);
            render_reset(&state, status, ResetView::Form, Some(token), &errors)
        }
    }
}

fn render_reset(
    state: &AppState,
    status: StatusCode,
    view: ResetView,
    token: Option<&str>,
    errors: &FormErrors,
) -> Response {
    auth_page(state, RESET_TEMPLATE, status, &(), errors, |context| {
        context.insert("view", &view);
        context.insert("token", token.unwrap_or_default());
    })
}
