//! Boundary to the external authentication service.
//!
//! The service owns sessions: it issues them, hashes passwords, runs the
//! OAuth handshake and sends email. This crate only reads sessions and
//! forwards user actions to it.

pub mod client;
pub mod cookie;
pub mod error;
pub mod proxy;

use async_trait::async_trait;
use axum::http::{HeaderMap, HeaderValue};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use client::HttpAuthService;
pub use cookie::has_session_cookie;
pub use error::AuthError;
pub use proxy::AuthProxy;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub image: Option<String>,
}

impl SessionUser {
    /// First character of the display name, used when there is no avatar
    pub fn initial(&self) -> String {
        self.name.chars().next().map(String::from).unwrap_or_default()
    }

    pub fn first_name(&self) -> &str {
        self.name.split(' ').next().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub id: String,
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
}

/// A session resolved by the auth service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session: SessionInfo,
    pub user: SessionUser,
}

impl SessionRecord {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.session.expires_at <= now
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

/// Result of a call that may hand new cookies to the browser
#[derive(Debug, Clone)]
pub struct AuthExchange<T> {
    pub data: T,
    pub cookies: Vec<HeaderValue>,
}

impl<T> AuthExchange<T> {
    pub fn new(data: T) -> Self {
        Self { data, cookies: Vec::new() }
    }

    pub fn with_cookies(data: T, cookies: Vec<HeaderValue>) -> Self {
        Self { data, cookies }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EmailSignIn {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmailSignUp {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[async_trait]
pub trait AuthService: Send + Sync {
    /// Authoritative session lookup for the cookies in `headers`.
    /// `Ok(None)` means the service answered and there is no session.
    async fn get_session(&self, headers: &HeaderMap) -> Result<Option<SessionRecord>, AuthError>;

    async fn sign_in_email(&self, credentials: &EmailSignIn) -> Result<AuthExchange<SessionUser>, AuthError>;

    async fn sign_up_email(&self, account: &EmailSignUp) -> Result<AuthExchange<SessionUser>, AuthError>;

    /// Returns the provider authorization URL the browser should visit
    async fn sign_in_social(&self, provider: &str, callback_url: &str) -> Result<String, AuthError>;

    async fn sign_out(&self, headers: &HeaderMap) -> Result<AuthExchange<()>, AuthError>;

    async fn request_password_reset(&self, email: &str, redirect_to: &str) -> Result<(), AuthError>;

    async fn reset_password(&self, new_password: &str, token: &str) -> Result<(), AuthError>;
}
