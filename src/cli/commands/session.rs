use axum::http::{header::COOKIE, HeaderMap, HeaderValue};
use serde_json::json;
use thiserror::Error;

use crate::auth::{AuthError, AuthService, HttpAuthService, SessionRecord};
use crate::cli::{
    utils::{output_error, output_success},
    OutputFormat,
};
use crate::config;

pub async fn handle(cookie: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = config::config();
    let auth = HttpAuthService::from_config(config)?;
    let headers = cookie_headers(&config.auth.session_cookie, cookie)?;

    report(auth.get_session(&headers).await, output_format)
}

/// Print the lookup result; anything but a live session is an error
fn report(lookup: Result<Option<SessionRecord>, AuthError>, output_format: OutputFormat) -> anyhow::Result<()> {
    match lookup {
        Ok(Some(record)) if !record.is_expired() => {
            let message = format!("Session for {} <{}>", record.user.name, record.user.email);
            match output_format {
                OutputFormat::Json => output_success(&output_format, &message, Some(json!(record))),
                OutputFormat::Text => {
                    output_success(&output_format, &message, None)?;
                    println!("  user:    {}", record.user.id);
                    println!("  session: {}", record.session.id);
                    println!("  expires: {}", record.session.expires_at);
                    Ok(())
                }
            }
        }
        Ok(_) => {
            output_error(&output_format, "No active session for this cookie", Some("NO_SESSION"))?;
            Err(SessionCommandError::NoSession.into())
        }
        Err(err) => {
            output_error(&output_format, &format!("Session lookup failed: {err}"), Some("LOOKUP_FAILED"))?;
            Err(SessionCommandError::LookupFailed(err).into())
        }
    }
}

/// Non-zero exit reasons for `gatectl session`
#[derive(Debug, Error)]
pub enum SessionCommandError {
    #[error("no active session for this cookie")]
    NoSession,

    #[error("session lookup failed: {0}")]
    LookupFailed(#[from] AuthError),
}

/// Request headers carrying `value` under the configured cookie name
fn cookie_headers(cookie_name: &str, value: &str) -> anyhow::Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(COOKIE, HeaderValue::from_str(&format!("{cookie_name}={value}"))?);
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    use crate::auth::has_session_cookie;
    use crate::testing::session_record;

    #[test]
    fn cookie_header_uses_configured_name() {
        let headers = cookie_headers("better-auth.session_token", "tok.sig").expect("headers");
        assert!(has_session_cookie(&headers, "better-auth.session_token"));
    }

    #[test]
    fn missing_or_failed_session_is_an_error() {
        let err = report(Ok(None), OutputFormat::Json).expect_err("no session");
        assert!(matches!(err.downcast_ref::<SessionCommandError>(), Some(SessionCommandError::NoSession)));

        let lookup = Err(AuthError::remote(StatusCode::INTERNAL_SERVER_ERROR, None, None));
        let err = report(lookup, OutputFormat::Text).expect_err("lookup failed");
        assert!(matches!(err.downcast_ref::<SessionCommandError>(), Some(SessionCommandError::LookupFailed(_))));
    }

    #[test]
    fn live_session_succeeds() {
        assert!(report(Ok(Some(session_record())), OutputFormat::Json).is_ok());
    }

    #[test]
    fn rejects_values_that_cannot_be_headers() {
        assert!(cookie_headers("better-auth.session_token", "bad\nvalue").is_err());
    }
}
