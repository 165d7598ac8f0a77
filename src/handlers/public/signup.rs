// handlers/public/signup.rs - GET/POST /signup

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form,
};

use super::{auth_page, remote_failure};
use crate::app::AppState;
use crate::forms::{self, FormErrors, SignUpForm, SIGN_UP_FALLBACK};
use crate::handlers::with_cookies;
use crate::route::VERIFY_EMAIL_PATH;

const TEMPLATE: &str = "auth/signup.html";

pub async fn signup_get(State(state): State<AppState>) -> Response {
    render(&state, StatusCode::OK, &SignUpForm::default(), &FormErrors::default())
}

pub async fn signup_post(State(state): State<AppState>, Form(form): Form<SignUpForm>) -> Response {
    if let Err(errors) = forms::check(&form) {
        return render(&state, StatusCode::UNPROCESSABLE_ENTITY, &form, &errors);
    }

    match state.auth.sign_up_email(&form.account()).await {
        Ok(exchange) => {
            tracing::info!(user_id = %exchange.data.id, "account created");
            let location = verify_email_location(&form.email);
            with_cookies(Redirect::to(&location).into_response(), exchange.cookies)
        }
        Err(err) => {
            let (status, errors) = remote_failure(&err, SIGN_UP_FALLBACK);
            render(&state, status, &form, &errors)
        }
    }
}

/// `/verify-email?email=<urlencoded>`
pub fn verify_email_location(email: &str) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("email", email)
        .finish();
    format!("{VERIFY_EMAIL_PATH}?{query}")
}

fn render(state: &AppState, status: StatusCode, form: &SignUpForm, errors: &FormErrors) -> Response {
    auth_page(state, TEMPLATE, status, form, errors, |_| {})
}
