//! Server-rendered pages.
//!
//! Templates are embedded at compile time and registered once into a shared
//! [`Tera`] instance, so the binary needs no template directory at runtime.

use std::sync::Arc;

use axum::{
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
};
use serde::Serialize;
use tera::{Context, Tera};
use thiserror::Error;

use crate::auth::SessionRecord;
use crate::database::User;

const TPL_BASE: &str = include_str!("templates/base.html");
const TPL_SIGN_IN: &str = include_str!("templates/auth/signin.html");
const TPL_SIGN_UP: &str = include_str!("templates/auth/signup.html");
const TPL_FORGOT_PASSWORD: &str = include_str!("templates/auth/forgot_password.html");
const TPL_RESET_PASSWORD: &str = include_str!("templates/auth/reset_password.html");
const TPL_VERIFY_EMAIL: &str = include_str!("templates/auth/verify_email.html");
const TPL_SHELL: &str = include_str!("templates/shell/layout.html");
const TPL_DASHBOARD: &str = include_str!("templates/shell/dashboard.html");
const TPL_UPLOADS: &str = include_str!("templates/shell/uploads.html");
const TPL_LOADING: &str = include_str!("templates/loading.html");
const TPL_NOT_FOUND: &str = include_str!("templates/not_found.html");

pub const APP_CSS: &str = include_str!("static/app.css");

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template error: {0}")]
    Tera(#[from] tera::Error),
}

/// Registered page templates
#[derive(Clone)]
pub struct Templates {
    tera: Arc<Tera>,
}

impl Templates {
    pub fn new() -> Result<Self, TemplateError> {
        let mut tera = Tera::default();

        // base.html and the shell layout first; pages extend them
        tera.add_raw_templates(vec![
            ("base.html", TPL_BASE),
            ("shell/layout.html", TPL_SHELL),
            ("auth/signin.html", TPL_SIGN_IN),
            ("auth/signup.html", TPL_SIGN_UP),
            ("auth/forgot_password.html", TPL_FORGOT_PASSWORD),
            ("auth/reset_password.html", TPL_RESET_PASSWORD),
            ("auth/verify_email.html", TPL_VERIFY_EMAIL),
            ("shell/dashboard.html", TPL_DASHBOARD),
            ("shell/uploads.html", TPL_UPLOADS),
            ("loading.html", TPL_LOADING),
            ("not_found.html", TPL_NOT_FOUND),
        ])?;

        Ok(Self { tera: Arc::new(tera) })
    }

    pub fn render_to_string(&self, name: &str, context: &Context) -> Result<String, TemplateError> {
        Ok(self.tera.render(name, context)?)
    }

    pub fn render(&self, name: &str, context: &Context) -> Response {
        self.render_with_status(StatusCode::OK, name, context)
    }

    pub fn render_with_status(&self, status: StatusCode, name: &str, context: &Context) -> Response {
        match self.render_to_string(name, context) {
            Ok(html) => (status, Html(html)).into_response(),
            Err(err) => {
                tracing::error!(template = name, "Template error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
            }
        }
    }
}

impl std::fmt::Debug for Templates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Templates").finish_non_exhaustive()
    }
}

pub async fn stylesheet() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], APP_CSS)
}

/// Entry in the shell sidebar
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavItem {
    pub title: &'static str,
    pub href: &'static str,
    pub active: bool,
}

const NAV_MAIN: [(&str, &str); 2] = [("Dashboard", "/"), ("File Uploads", "/uploads")];

pub fn nav_items(current_path: &str) -> Vec<NavItem> {
    NAV_MAIN
        .iter()
        .map(|&(title, href)| NavItem {
            title,
            href,
            active: href == current_path,
        })
        .collect()
}

/// User menu fields derived from the session
#[derive(Debug, Clone, Serialize)]
pub struct UserMenu {
    pub name: String,
    pub first_name: String,
    pub email: String,
    pub image: Option<String>,
    pub initial: String,
}

impl From<&SessionRecord> for UserMenu {
    fn from(record: &SessionRecord) -> Self {
        let user = &record.user;
        Self {
            name: user.name.clone(),
            first_name: user.first_name().to_string(),
            email: user.email.clone(),
            image: user.image.clone().filter(|src| !src.is_empty()),
            initial: user.initial(),
        }
    }
}

/// Row of the dashboard user directory
#[derive(Debug, Clone, Serialize)]
pub struct DirectoryEntry {
    pub name: String,
    pub email: String,
    pub verified: bool,
    pub joined: String,
}

impl From<&User> for DirectoryEntry {
    fn from(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            verified: user.email_verified,
            joined: user.created_at.format("%Y-%m-%d").to_string(),
        }
    }
}

/// Context shared by every page inside the shell
pub fn shell_context(record: &SessionRecord, current_path: &str, title: &str) -> Context {
    let mut context = Context::new();
    context.insert("title", title);
    context.insert("nav", &nav_items(current_path));
    context.insert("user", &UserMenu::from(record));
    context
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::session_record;

    #[test]
    fn all_templates_register() {
        assert!(Templates::new().is_ok());
    }

    #[test]
    fn nav_marks_current_path() {
        let items = nav_items("/uploads");
        assert!(!items[0].active);
        assert!(items[1].active);
        assert!(nav_items("/other").iter().all(|item| !item.active));
    }

    #[test]
    fn shell_shows_initial_without_avatar() {
        let templates = Templates::new().expect("templates");
        let record = session_record();
        let mut context = shell_context(&record, "/", "Dashboard");
        context.insert("users", &Vec::<DirectoryEntry>::new());
        context.insert("directory_error", &Option::<String>::None);

        let html = templates.render_to_string("shell/dashboard.html", &context).expect("renders");
        assert!(html.contains("Ada Lovelace"));
        assert!(html.contains("ada@example.com"));
        assert!(html.contains(r#"<span class="avatar-fallback">A</span>"#));
        assert!(html.contains("No users yet."));
        assert!(html.contains(r#"<a class="nav-item active" href="/">Dashboard</a>"#));
    }

    #[test]
    fn shell_uses_avatar_image_when_present() {
        let templates = Templates::new().expect("templates");
        let mut record = session_record();
        record.user.image = Some("https://cdn.example.com/ada.png".to_string());
        let context = shell_context(&record, "/uploads", "File Uploads");

        let html = templates.render_to_string("shell/uploads.html", &context).expect("renders");
        assert!(html.contains(r#"<img class="avatar""#));
        assert!(html.contains("cdn.example.com"));
        assert!(!html.contains("avatar-fallback"));
        assert!(html.contains(r#"<a class="nav-item active" href="/uploads">File Uploads</a>"#));
    }

    #[test]
    fn user_input_is_escaped() {
        let templates = Templates::new().expect("templates");
        let mut context = Context::new();
        context.insert("email", "<script>@example.com");

        let html = templates.render_to_string("auth/verify_email.html", &context).expect("renders");
        assert!(!html.contains("<script>@"));
        assert!(html.contains("&lt;script&gt;@example.com"));
    }
}
