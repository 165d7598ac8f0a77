#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::{
        header::{COOKIE, LOCATION, ORIGIN, SET_COOKIE},
        HeaderMap, StatusCode,
    },
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use gatehouse::{
    app::{self, AppState},
    auth::HttpAuthService,
    config::AppConfig,
    database::{DatabaseManager, PgUserDirectory},
};

pub const SESSION_COOKIE: &str = "better-auth.session_token=valid.sig";
/// Session the fake accepts but whose sign-out fails upstream
pub const FLAKY_SESSION_COOKIE: &str = "better-auth.session_token=valid-flaky.sig";
/// Well-formed cookie the fake does not know
pub const UNKNOWN_SESSION_COOKIE: &str = "better-auth.session_token=stale.sig";
/// Cookie that makes the fake's session lookup fail
pub const BROKEN_SESSION_COOKIE: &str = "better-auth.session_token=broken.sig";

pub const GOOD_PASSWORD: &str = "correct-horse";
pub const GOOD_RESET_TOKEN: &str = "good-token";
pub const TAKEN_EMAIL: &str = "taken@example.com";

/// Request seen by the fake auth service
#[derive(Debug, Clone)]
pub struct Call {
    pub method: String,
    pub path: String,
    pub origin: Option<String>,
    pub body: Value,
}

#[derive(Clone, Default)]
struct Recorder(Arc<Mutex<Vec<Call>>>);

impl Recorder {
    fn push(&self, method: &str, path: &str, headers: &HeaderMap, body: Value) {
        let origin = headers.get(ORIGIN).and_then(|v| v.to_str().ok()).map(str::to_string);
        self.0.lock().expect("recorder lock").push(Call {
            method: method.to_string(),
            path: path.to_string(),
            origin,
            body,
        });
    }
}

/// In-process stand-in for the external auth service
pub struct FakeAuth {
    pub base_url: String,
    recorder: Recorder,
}

impl FakeAuth {
    pub fn calls(&self) -> Vec<Call> {
        self.recorder.0.lock().expect("recorder lock").clone()
    }

    pub fn calls_to(&self, path: &str) -> Vec<Call> {
        self.calls().into_iter().filter(|c| c.path == path).collect()
    }
}

pub struct TestApp {
    pub base_url: String,
    pub auth: FakeAuth,
    pub client: reqwest::Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get(&self, path: &str, cookie: Option<&str>) -> Result<reqwest::Response> {
        let mut request = self.client.get(self.url(path));
        if let Some(cookie) = cookie {
            request = request.header(COOKIE, cookie);
        }
        Ok(request.send().await?)
    }

    pub async fn post_form(
        &self,
        path: &str,
        form: &[(&str, &str)],
        cookie: Option<&str>,
    ) -> Result<reqwest::Response> {
        let body = form
            .iter()
            .fold(url::form_urlencoded::Serializer::new(String::new()), |mut s, (k, v)| {
                s.append_pair(k, v);
                s
            })
            .finish();
        let mut request = self
            .client
            .post(self.url(path))
            .header("content-type", "application/x-www-form-urlencoded")
            .body(body);
        if let Some(cookie) = cookie {
            request = request.header(COOKIE, cookie);
        }
        Ok(request.send().await?)
    }
}

/// Client that hands redirects back to the test
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("client")
}

async fn serve(router: Router) -> Result<String> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .with_context(|| format!("failed to bind port {port}"))?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Ok(format!("http://127.0.0.1:{port}"))
}

pub async fn spawn_fake_auth() -> Result<FakeAuth> {
    let recorder = Recorder::default();
    let router = Router::new()
        .route("/api/auth/get-session", get(get_session))
        .route("/api/auth/sign-in/email", post(sign_in_email))
        .route("/api/auth/sign-up/email", post(sign_up_email))
        .route("/api/auth/sign-in/social", post(sign_in_social))
        .route("/api/auth/sign-out", post(sign_out))
        .route("/api/auth/request-password-reset", post(request_password_reset))
        .route("/api/auth/reset-password", post(reset_password))
        .route("/api/auth/callback/google", get(oauth_callback))
        .with_state(recorder.clone());

    let base_url = serve(router).await?;
    Ok(FakeAuth { base_url, recorder })
}

pub fn app_config(auth_url: &str) -> AppConfig {
    let mut config = AppConfig::development();
    config.auth.service_url = auth_url.to_string();
    config.auth.request_timeout_secs = 5;
    config.database.url = None;
    config
}

/// The app wired to a fresh fake auth service, without a database
pub async fn spawn_app() -> Result<TestApp> {
    let auth = spawn_fake_auth().await?;
    let config = app_config(&auth.base_url);
    let base_url = spawn_with_config(config).await?;
    Ok(TestApp {
        base_url,
        auth,
        client: client(),
    })
}

pub async fn spawn_with_config(mut config: AppConfig) -> Result<String> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    config.server.port = port;
    config.server.base_url = format!("http://127.0.0.1:{port}");

    let service = HttpAuthService::from_config(&config)?;
    let users = PgUserDirectory::new(DatabaseManager::disabled());
    let state = AppState::new(config, Arc::new(service), Arc::new(users))?;

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .with_context(|| format!("failed to bind port {port}"))?;
    let router = app::router(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Ok(format!("http://127.0.0.1:{port}"))
}

// --- fake auth service endpoints ---

fn user_json(email: &str) -> Value {
    json!({
        "id": "user_1",
        "name": "Ada Lovelace",
        "email": email,
        "emailVerified": true,
        "image": null,
        "createdAt": "2024-01-01T00:00:00.000Z",
        "updatedAt": "2024-01-01T00:00:00.000Z"
    })
}

fn error(status: StatusCode, code: &str, message: &str) -> Response {
    (status, Json(json!({ "code": code, "message": message }))).into_response()
}

fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == "better-auth.session_token")
        .map(|(_, value)| value.to_string())
}

async fn get_session(State(recorder): State<Recorder>, headers: HeaderMap) -> Response {
    recorder.push("GET", "/api/auth/get-session", &headers, Value::Null);
    match session_token(&headers).as_deref() {
        Some(token) if token.starts_with("valid") => Json(json!({
            "session": {
                "id": "sess_1",
                "token": token,
                "userId": "user_1",
                "expiresAt": "2099-01-01T00:00:00.000Z",
                "createdAt": "2024-01-01T00:00:00.000Z"
            },
            "user": user_json("ada@example.com")
        }))
        .into_response(),
        Some(token) if token.starts_with("broken") => {
            error(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", "database offline")
        }
        _ => Json(Value::Null).into_response(),
    }
}

async fn sign_in_email(State(recorder): State<Recorder>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    recorder.push("POST", "/api/auth/sign-in/email", &headers, body.clone());
    if body["password"] != GOOD_PASSWORD {
        return error(StatusCode::UNAUTHORIZED, "INVALID_EMAIL_OR_PASSWORD", "Invalid email or password");
    }
    let email = body["email"].as_str().unwrap_or_default();
    (
        [(SET_COOKIE, "better-auth.session_token=valid.sig; Path=/; HttpOnly; SameSite=Lax")],
        Json(json!({ "redirect": false, "token": "valid", "user": user_json(email) })),
    )
        .into_response()
}

async fn sign_up_email(State(recorder): State<Recorder>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    recorder.push("POST", "/api/auth/sign-up/email", &headers, body.clone());
    let email = body["email"].as_str().unwrap_or_default();
    if email == TAKEN_EMAIL {
        return error(StatusCode::UNPROCESSABLE_ENTITY, "USER_ALREADY_EXISTS", "User already exists");
    }
    Json(json!({ "token": null, "user": user_json(email) })).into_response()
}

async fn sign_in_social(State(recorder): State<Recorder>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    recorder.push("POST", "/api/auth/sign-in/social", &headers, body);
    Json(json!({
        "url": "https://accounts.google.com/o/oauth2/v2/auth?client_id=test",
        "redirect": true
    }))
    .into_response()
}

async fn sign_out(State(recorder): State<Recorder>, headers: HeaderMap) -> Response {
    recorder.push("POST", "/api/auth/sign-out", &headers, Value::Null);
    if session_token(&headers).is_some_and(|t| t.contains("flaky")) {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", "session store offline");
    }
    (
        [(SET_COOKIE, "better-auth.session_token=; Max-Age=0; Path=/")],
        Json(json!({ "success": true })),
    )
        .into_response()
}

async fn request_password_reset(
    State(recorder): State<Recorder>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    recorder.push("POST", "/api/auth/request-password-reset", &headers, body);
    Json(json!({ "status": true })).into_response()
}

async fn reset_password(State(recorder): State<Recorder>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    recorder.push("POST", "/api/auth/reset-password", &headers, body.clone());
    if body["token"] != GOOD_RESET_TOKEN {
        return error(StatusCode::BAD_REQUEST, "INVALID_TOKEN", "Invalid token");
    }
    Json(json!({ "status": true })).into_response()
}

#[derive(Debug, Deserialize)]
struct CallbackQuery {
    code: Option<String>,
}

async fn oauth_callback(
    State(recorder): State<Recorder>,
    headers: HeaderMap,
    Query(query): Query<CallbackQuery>,
) -> Response {
    recorder.push("GET", "/api/auth/callback/google", &headers, json!({ "code": query.code }));
    (
        StatusCode::FOUND,
        [
            (LOCATION, "http://localhost:3000/"),
            (SET_COOKIE, "better-auth.session_token=valid.sig; Path=/; HttpOnly"),
        ],
    )
        .into_response()
}
