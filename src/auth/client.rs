use std::time::Duration;

use async_trait::async_trait;
use axum::http::{
    header::{COOKIE, ORIGIN, SET_COOKIE},
    HeaderMap, HeaderValue, StatusCode,
};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::json;
use url::Url;

use super::{AuthError, AuthExchange, AuthService, EmailSignIn, EmailSignUp, SessionRecord, SessionUser};
use crate::config::AppConfig;

/// Path under the auth service origin where its HTTP API is mounted
pub const AUTH_API_PREFIX: &str = "/api/auth";

/// [`AuthService`] backed by the auth service's HTTP API
#[derive(Debug, Clone)]
pub struct HttpAuthService {
    client: reqwest::Client,
    api_base: Url,
    origin: HeaderValue,
    callback_url: String,
}

#[derive(Debug, Default, Deserialize)]
struct RemoteErrorBody {
    code: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserBody {
    user: SessionUser,
}

#[derive(Debug, Deserialize)]
struct SocialBody {
    url: Option<String>,
}

impl HttpAuthService {
    pub fn from_config(config: &AppConfig) -> Result<Self, AuthError> {
        Self::new(
            &config.auth.service_url,
            &config.server.base_url,
            Duration::from_secs(config.auth.request_timeout_secs),
        )
    }

    pub fn new(service_url: &str, base_url: &str, timeout: Duration) -> Result<Self, AuthError> {
        let api_base = api_base(service_url)?;
        let origin = HeaderValue::from_str(base_url.trim_end_matches('/'))
            .map_err(|_| AuthError::Config(format!("invalid base url '{base_url}'")))?;

        // Redirects are handed back to the browser, never followed here
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            api_base,
            origin,
            callback_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Absolute URL of an auth service endpoint, e.g. `get-session`
    pub fn endpoint(&self, path: &str) -> Result<Url, AuthError> {
        self.api_base
            .join(path.trim_start_matches('/'))
            .map_err(|e| AuthError::Config(format!("invalid auth endpoint '{path}': {e}")))
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
        forwarded: Option<&HeaderMap>,
    ) -> Result<(T, Vec<HeaderValue>), AuthError> {
        let mut request = self
            .client
            .post(self.endpoint(path)?)
            .header(ORIGIN, self.origin.clone())
            .json(&body);
        if let Some(headers) = forwarded {
            for cookie in headers.get_all(COOKIE) {
                request = request.header(COOKIE, cookie.clone());
            }
        }

        let response = request.send().await?;
        read_body(response).await
    }
}

fn api_base(service_url: &str) -> Result<Url, AuthError> {
    let raw = format!("{}{}/", service_url.trim_end_matches('/'), AUTH_API_PREFIX);
    Url::parse(&raw).map_err(|e| AuthError::Config(format!("invalid auth service url '{service_url}': {e}")))
}

async fn read_body<T: DeserializeOwned>(response: reqwest::Response) -> Result<(T, Vec<HeaderValue>), AuthError> {
    let status = response.status();
    let cookies: Vec<HeaderValue> = response.headers().get_all(SET_COOKIE).iter().cloned().collect();
    let bytes = response.bytes().await?;

    if !status.is_success() {
        return Err(remote_error(status, &bytes));
    }

    let data = serde_json::from_slice(&bytes).map_err(|e| AuthError::Decode(e.to_string()))?;
    Ok((data, cookies))
}

fn remote_error(status: StatusCode, body: &[u8]) -> AuthError {
    let body: RemoteErrorBody = serde_json::from_slice(body).unwrap_or_default();
    AuthError::remote(status, body.code, body.message)
}

#[async_trait]
impl AuthService for HttpAuthService {
    async fn get_session(&self, headers: &HeaderMap) -> Result<Option<SessionRecord>, AuthError> {
        let mut request = self.client.get(self.endpoint("get-session")?);
        for cookie in headers.get_all(COOKIE) {
            request = request.header(COOKIE, cookie.clone());
        }

        let response = request.send().await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            return Ok(None);
        }

        let (record, _) = read_body::<Option<SessionRecord>>(response).await?;
        Ok(record)
    }

    async fn sign_in_email(&self, credentials: &EmailSignIn) -> Result<AuthExchange<SessionUser>, AuthError> {
        let body = json!({
            "email": credentials.email,
            "password": credentials.password,
            "callbackURL": self.callback_url,
            "rememberMe": true,
        });
        let (data, cookies) = self.post_json::<UserBody>("sign-in/email", body, None).await?;
        Ok(AuthExchange::with_cookies(data.user, cookies))
    }

    async fn sign_up_email(&self, account: &EmailSignUp) -> Result<AuthExchange<SessionUser>, AuthError> {
        let body = json!({
            "name": account.name,
            "email": account.email,
            "password": account.password,
            "callbackURL": self.callback_url,
        });
        let (data, cookies) = self.post_json::<UserBody>("sign-up/email", body, None).await?;
        Ok(AuthExchange::with_cookies(data.user, cookies))
    }

    async fn sign_in_social(&self, provider: &str, callback_url: &str) -> Result<String, AuthError> {
        let body = json!({ "provider": provider, "callbackURL": callback_url });
        let (data, _) = self.post_json::<SocialBody>("sign-in/social", body, None).await?;
        data.url
            .filter(|url| !url.is_empty())
            .ok_or_else(|| AuthError::Decode("social sign-in response has no url".to_string()))
    }

    async fn sign_out(&self, headers: &HeaderMap) -> Result<AuthExchange<()>, AuthError> {
        let (_, cookies) = self
            .post_json::<serde_json::Value>("sign-out", json!({}), Some(headers))
            .await?;
        Ok(AuthExchange::with_cookies((), cookies))
    }

    async fn request_password_reset(&self, email: &str, redirect_to: &str) -> Result<(), AuthError> {
        let body = json!({ "email": email, "redirectTo": redirect_to });
        self.post_json::<serde_json::Value>("request-password-reset", body, None)
            .await
            .map(|_| ())
    }

    async fn reset_password(&self, new_password: &str, token: &str) -> Result<(), AuthError> {
        let body = json!({ "newPassword": new_password, "token": token });
        self.post_json::<serde_json::Value>("reset-password", body, None)
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> HttpAuthService {
        HttpAuthService::new("http://auth.local:4000/", "http://app.local/", Duration::from_secs(1))
            .expect("valid service")
    }

    #[test]
    fn endpoints_live_under_api_prefix() {
        let svc = service();
        assert_eq!(
            svc.endpoint("get-session").expect("url").as_str(),
            "http://auth.local:4000/api/auth/get-session"
        );
        assert_eq!(
            svc.endpoint("/sign-in/email").expect("url").as_str(),
            "http://auth.local:4000/api/auth/sign-in/email"
        );
    }

    #[test]
    fn callback_and_origin_drop_trailing_slash() {
        let svc = service();
        assert_eq!(svc.callback_url, "http://app.local");
        assert_eq!(svc.origin, "http://app.local");
    }

    #[test]
    fn rejects_unparseable_service_url() {
        let err = HttpAuthService::new("not a url", "http://app.local", Duration::from_secs(1))
            .expect_err("should fail");
        assert!(matches!(err, AuthError::Config(_)));
    }

    #[test]
    fn remote_error_body_is_optional() {
        let err = remote_error(StatusCode::BAD_REQUEST, b"<html>");
        assert!(matches!(err, AuthError::Remote { code: None, message: None, .. }));

        let err = remote_error(StatusCode::BAD_REQUEST, br#"{"code":"INVALID_TOKEN","message":"invalid token"}"#);
        assert_eq!(err.code(), Some("INVALID_TOKEN"));
        assert_eq!(err.user_message(), Some("invalid token"));
    }
}
