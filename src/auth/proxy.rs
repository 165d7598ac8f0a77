use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    http::{header, request::Parts, HeaderMap, HeaderName, Response},
};
use url::Url;

use super::client::AUTH_API_PREFIX;
use super::AuthError;
use crate::config::AppConfig;

/// Headers that describe a single connection and are never forwarded
const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Largest request body accepted for forwarding
pub const MAX_PROXY_BODY: usize = 1024 * 1024;

/// Forwards browser-facing auth service endpoints (OAuth callbacks,
/// verification links) so they are reachable on this origin.
#[derive(Debug, Clone)]
pub struct AuthProxy {
    client: reqwest::Client,
    origin: Url,
}

impl AuthProxy {
    pub fn from_config(config: &AppConfig) -> Result<Self, AuthError> {
        Self::new(
            &config.auth.service_url,
            Duration::from_secs(config.auth.request_timeout_secs),
        )
    }

    pub fn new(service_url: &str, timeout: Duration) -> Result<Self, AuthError> {
        let origin = Url::parse(service_url)
            .map_err(|e| AuthError::Config(format!("invalid auth service url '{service_url}': {e}")))?;

        // The browser has to see the service's redirects itself
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self { client, origin })
    }

    /// Service URL for the same path and query. The resolved path must stay
    /// under the auth API prefix once dot segments are applied.
    pub fn target(&self, path_and_query: &str) -> Result<Url, AuthError> {
        let url = self
            .origin
            .join(path_and_query)
            .map_err(|_| AuthError::InvalidPath(path_and_query.to_string()))?;

        let inside = url
            .path()
            .strip_prefix(AUTH_API_PREFIX)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'));
        if !inside {
            return Err(AuthError::InvalidPath(path_and_query.to_string()));
        }
        Ok(url)
    }

    pub async fn forward(&self, parts: Parts, body: Bytes) -> Result<Response<Body>, AuthError> {
        let path_and_query = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or_else(|| parts.uri.path());
        let target = self.target(path_and_query)?;
        tracing::debug!(method = %parts.method, target = %target, "proxying to auth service");

        let upstream = self
            .client
            .request(parts.method, target)
            .headers(forwardable(&parts.headers))
            .body(body)
            .send()
            .await?;

        let status = upstream.status();
        let headers = forwardable(upstream.headers());
        let bytes = upstream.bytes().await?;

        let mut response = Response::new(Body::from(bytes));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        Ok(response)
    }
}

fn is_forwardable(name: &HeaderName) -> bool {
    !HOP_BY_HOP.contains(&name.as_str()) && name != header::HOST && name != header::CONTENT_LENGTH
}

/// Copy of `headers` without hop-by-hop, host and length headers
fn forwardable(headers: &HeaderMap) -> HeaderMap {
    let mut out = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        if is_forwardable(name) {
            out.append(name.clone(), value.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn target_keeps_path_and_query() {
        let proxy = AuthProxy::new("http://auth.local:4000", Duration::from_secs(1)).expect("proxy");
        let url = proxy
            .target("/api/auth/callback/google?code=abc&state=xyz")
            .expect("target");
        assert_eq!(url.as_str(), "http://auth.local:4000/api/auth/callback/google?code=abc&state=xyz");
    }

    #[test]
    fn target_stays_under_auth_prefix() {
        let proxy = AuthProxy::new("http://auth.local:4000", Duration::from_secs(1)).expect("proxy");
        for path in [
            "/api/auth/%2e%2e/%2e%2e/internal/admin?x=1",
            "/api/auth/../../internal/admin",
            "/api/auth/%2E%2E/session",
            "/api/authx/session",
        ] {
            let err = proxy.target(path).expect_err(path);
            assert!(matches!(err, AuthError::InvalidPath(_)), "{path}");
            assert_eq!(err.response_status(), axum::http::StatusCode::BAD_REQUEST);
        }
        assert!(proxy.target("/api/auth/verify-email?token=t").is_ok());
    }

    #[test]
    fn strips_connection_headers_and_keeps_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("app.local"));
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from_static("12"));
        headers.append(header::SET_COOKIE, HeaderValue::from_static("a=1"));
        headers.append(header::SET_COOKIE, HeaderValue::from_static("b=2"));

        let out = forwardable(&headers);
        assert!(out.get(header::HOST).is_none());
        assert!(out.get(header::CONNECTION).is_none());
        assert!(out.get(header::CONTENT_LENGTH).is_none());
        assert_eq!(out.get_all(header::SET_COOKIE).iter().count(), 2);
    }
}
