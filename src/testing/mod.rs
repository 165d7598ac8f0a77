use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::{header::COOKIE, HeaderMap, HeaderValue, StatusCode};
use chrono::{Duration, Utc};

use crate::app::AppState;
use crate::auth::{
    AuthError, AuthExchange, AuthService, EmailSignIn, EmailSignUp, SessionInfo, SessionRecord, SessionUser,
};
use crate::config::AppConfig;
use crate::database::{DatabaseError, User, UserDirectory};

pub const SESSION_COOKIE: &str = "better-auth.session_token=tok.sig";

pub fn session_record() -> SessionRecord {
    SessionRecord {
        session: SessionInfo {
            id: "sess_1".to_string(),
            user_id: "user_1".to_string(),
            expires_at: Utc::now() + Duration::days(1),
        },
        user: SessionUser {
            id: "user_1".to_string(),
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            email_verified: true,
            image: None,
        },
    }
}

pub fn session_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(COOKIE, HeaderValue::from_static(SESSION_COOKIE));
    headers
}

/// In-memory auth service that records every remote call it receives
pub struct StubAuthService {
    session: Result<Option<SessionRecord>, StatusCode>,
    rejection: Option<(StatusCode, Option<String>)>,
    lookups: AtomicUsize,
    calls: Mutex<Vec<String>>,
}

impl StubAuthService {
    fn build(session: Result<Option<SessionRecord>, StatusCode>) -> Self {
        Self {
            session,
            rejection: None,
            lookups: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_session(record: SessionRecord) -> Self {
        Self::build(Ok(Some(record)))
    }

    pub fn anonymous() -> Self {
        Self::build(Ok(None))
    }

    /// Session lookups fail with `status`
    pub fn failing(status: StatusCode) -> Self {
        Self::build(Err(status))
    }

    /// Form operations fail with a structured remote error
    pub fn rejecting(mut self, status: StatusCode, message: Option<&str>) -> Self {
        self.rejection = Some((status, message.map(str::to_string)));
        self
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: &str) -> Result<(), AuthError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call.to_string());
        }
        match &self.rejection {
            Some((status, message)) => Err(AuthError::remote(*status, None, message.clone())),
            None => Ok(()),
        }
    }

    fn user(&self) -> SessionUser {
        session_record().user
    }
}

#[async_trait]
impl AuthService for StubAuthService {
    async fn get_session(&self, _headers: &HeaderMap) -> Result<Option<SessionRecord>, AuthError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        match &self.session {
            Ok(record) => Ok(record.clone()),
            Err(status) => Err(AuthError::remote(*status, None, Some("lookup failed".to_string()))),
        }
    }

    async fn sign_in_email(&self, credentials: &EmailSignIn) -> Result<AuthExchange<SessionUser>, AuthError> {
        self.record(&format!("sign_in_email:{}", credentials.email))?;
        let cookie = HeaderValue::from_static("better-auth.session_token=new.sig; Path=/; HttpOnly");
        Ok(AuthExchange::with_cookies(self.user(), vec![cookie]))
    }

    async fn sign_up_email(&self, account: &EmailSignUp) -> Result<AuthExchange<SessionUser>, AuthError> {
        self.record(&format!("sign_up_email:{}", account.email))?;
        Ok(AuthExchange::new(self.user()))
    }

    async fn sign_in_social(&self, provider: &str, _callback_url: &str) -> Result<String, AuthError> {
        self.record(&format!("sign_in_social:{provider}"))?;
        Ok(format!("https://accounts.example.com/{provider}/authorize"))
    }

    async fn sign_out(&self, _headers: &HeaderMap) -> Result<AuthExchange<()>, AuthError> {
        self.record("sign_out")?;
        let cookie = HeaderValue::from_static("better-auth.session_token=; Max-Age=0; Path=/");
        Ok(AuthExchange::with_cookies((), vec![cookie]))
    }

    async fn request_password_reset(&self, email: &str, redirect_to: &str) -> Result<(), AuthError> {
        self.record(&format!("request_password_reset:{email}:{redirect_to}"))
    }

    async fn reset_password(&self, _new_password: &str, token: &str) -> Result<(), AuthError> {
        self.record(&format!("reset_password:{token}"))
    }
}

/// Directory serving a fixed list of users
pub struct StaticDirectory(pub Vec<User>);

#[async_trait]
impl UserDirectory for StaticDirectory {
    async fn list_users(&self) -> Result<Vec<User>, DatabaseError> {
        Ok(self.0.clone())
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

pub fn test_state(auth: Arc<StubAuthService>) -> AppState {
    AppState::new(AppConfig::development(), auth, Arc::new(StaticDirectory(Vec::new())))
        .expect("templates load")
}
