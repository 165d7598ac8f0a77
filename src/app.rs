use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{any, get, post},
    Router,
};
use thiserror::Error;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::{AuthError, AuthProxy, AuthService};
use crate::config::{AppConfig, SecurityConfig};
use crate::database::UserDirectory;
use crate::handlers::{api, protected, public};
use crate::middleware::session_guard;
use crate::route::{FORGOT_PASSWORD_PATH, RESET_PASSWORD_PATH, SIGN_IN_PATH, SIGN_UP_PATH, VERIFY_EMAIL_PATH};
use crate::web::{self, TemplateError, Templates};

#[derive(Debug, Error)]
pub enum StateError {
    #[error(transparent)]
    Templates(#[from] TemplateError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub auth: Arc<dyn AuthService>,
    pub users: Arc<dyn UserDirectory>,
    pub proxy: AuthProxy,
    pub templates: Templates,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        auth: Arc<dyn AuthService>,
        users: Arc<dyn UserDirectory>,
    ) -> Result<Self, StateError> {
        let proxy = AuthProxy::from_config(&config)?;
        let templates = Templates::new()?;
        Ok(Self {
            config: Arc::new(config),
            auth,
            users,
            proxy,
            templates,
        })
    }
}

pub fn router(state: AppState) -> Router {
    let cors = state.config.security.enable_cors.then(|| cors_layer(&state.config.security));

    let router = Router::new()
        // Public pages
        .merge(public_routes())
        // JSON API and the auth service proxy
        .merge(api_routes())
        // Shell pages, confirmed by the guard
        .merge(protected_routes())
        // Unknown paths stay behind the guard
        .fallback(protected::not_found)
        .layer(middleware::from_fn_with_state(state.clone(), session_guard))
        .layer(TraceLayer::new_for_http());

    let router = match cors {
        Some(cors) => router.layer(cors),
        None => router,
    };

    router.with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route(SIGN_IN_PATH, get(public::signin_get).post(public::signin_post))
        .route("/signin/social", post(public::signin_social))
        .route(SIGN_UP_PATH, get(public::signup_get).post(public::signup_post))
        .route(
            FORGOT_PASSWORD_PATH,
            get(public::forgot_password_get).post(public::forgot_password_post),
        )
        .route(
            RESET_PASSWORD_PATH,
            get(public::reset_password_get).post(public::reset_password_post),
        )
        .route(VERIFY_EMAIL_PATH, get(public::verify_email_get))
        .route("/static/app.css", get(web::stylesheet))
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(api::health))
        .route("/api/session", get(api::session))
        .route("/api/auth/*rest", any(api::auth_proxy))
}

fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(protected::dashboard))
        .route("/uploads", get(protected::uploads))
        .route("/signout", post(protected::signout))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if security.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}
