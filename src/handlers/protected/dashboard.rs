// handlers/protected/dashboard.rs - GET /, GET /uploads, fallback 404

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode, Uri},
    response::Response,
    Extension,
};

use super::{gate_shell, session_query};
use crate::app::AppState;
use crate::database::DatabaseError;
use crate::middleware::GuardedSession;
use crate::web::{shell_context, DirectoryEntry};

/// Dashboard with the directory of registered users
pub async fn dashboard(
    State(state): State<AppState>,
    guarded: Option<Extension<GuardedSession>>,
    headers: HeaderMap,
) -> Response {
    let query = session_query(&state, guarded, &headers).await;
    let record = match gate_shell(&state, &query) {
        Ok(record) => record,
        Err(response) => return response,
    };

    let mut context = shell_context(&record, "/", "Dashboard");
    match state.users.list_users().await {
        Ok(users) => {
            let entries: Vec<DirectoryEntry> = users.iter().map(DirectoryEntry::from).collect();
            context.insert("users", &entries);
            context.insert("directory_error", &Option::<String>::None);
        }
        Err(DatabaseError::ConfigMissing(_)) => {
            context.insert("users", &Vec::<DirectoryEntry>::new());
            context.insert("directory_error", "No database is configured.");
        }
        Err(err) => {
            tracing::error!(error = %err, "failed to load user directory");
            context.insert("users", &Vec::<DirectoryEntry>::new());
            context.insert("directory_error", "The user directory is unavailable right now.");
        }
    }

    state.templates.render("shell/dashboard.html", &context)
}

pub async fn uploads(
    State(state): State<AppState>,
    guarded: Option<Extension<GuardedSession>>,
    headers: HeaderMap,
) -> Response {
    let query = session_query(&state, guarded, &headers).await;
    match gate_shell(&state, &query) {
        Ok(record) => {
            let context = shell_context(&record, "/uploads", "File Uploads");
            state.templates.render("shell/uploads.html", &context)
        }
        Err(response) => response,
    }
}

pub async fn not_found(State(state): State<AppState>, uri: Uri) -> Response {
    let mut context = tera::Context::new();
    context.insert("path", uri.path());
    state
        .templates
        .render_with_status(StatusCode::NOT_FOUND, "not_found.html", &context)
}
