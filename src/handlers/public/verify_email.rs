// handlers/public/verify_email.rs - GET /verify-email

use axum::{
    extract::{Query, State},
    response::Response,
};
use serde::Deserialize;
use tera::Context;

use crate::app::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct VerifyEmailQuery {
    pub email: Option<String>,
}

pub async fn verify_email_get(State(state): State<AppState>, Query(query): Query<VerifyEmailQuery>) -> Response {
    let email = query.email.filter(|email| !email.trim().is_empty());

    let mut context = Context::new();
    context.insert("email", &email);
    state.templates.render("auth/verify_email.html", &context)
}
