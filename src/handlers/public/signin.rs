// handlers/public/signin.rs - GET/POST /signin, POST /signin/social

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;

use super::{auth_page, remote_failure};
use crate::app::AppState;
use crate::forms::{self, FormErrors, SignInForm, SIGN_IN_FALLBACK};
use crate::handlers::with_cookies;

const TEMPLATE: &str = "auth/signin.html";

pub async fn signin_get(State(state): State<AppState>) -> Response {
    render(&state, StatusCode::OK, &SignInForm::default(), &FormErrors::default())
}

pub async fn signin_post(State(state): State<AppState>, Form(form): Form<SignInForm>) -> Response {
    if let Err(errors) = forms::check(&form) {
        return render(&state, StatusCode::UNPROCESSABLE_ENTITY, &form, &errors);
    }

    match state.auth.sign_in_email(&form.credentials()).await {
        Ok(exchange) => {
            tracing::info!(user_id = %exchange.data.id, "signed in with email");
            with_cookies(Redirect::to("/").into_response(), exchange.cookies)
        }
        Err(err) => {
            let (status, errors) = remote_failure(&err, SIGN_IN_FALLBACK);
            render(&state, status, &form, &errors)
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SocialSignIn {
    pub provider: String,
}

/// Start the provider's OAuth flow; the browser is sent to the provider
pub async fn signin_social(State(state): State<AppState>, Form(request): Form<SocialSignIn>) -> Response {
    if !state.config.social_enabled(&request.provider) {
        let errors = FormErrors::root("This sign-in provider is not available.");
        return render(&state, StatusCode::BAD_REQUEST, &SignInForm::default(), &errors);
    }

    match state
        .auth
        .sign_in_social(&request.provider, &state.config.server.base_url)
        .await
    {
        Ok(url) => {
            tracing::info!(provider = %request.provider, "starting social sign-in");
            Redirect::to(&url).into_response()
        }
        Err(err) => {
            let (status, errors) = remote_failure(&err, SIGN_IN_FALLBACK);
            render(&state, status, &SignInForm::default(), &errors)
        }
    }
}

fn render(state: &AppState, status: StatusCode, form: &SignInForm, errors: &FormErrors) -> Response {
    auth_page(state, TEMPLATE, status, form, errors, |_| {})
}
