//! Edge request guard: the per-request session check that runs before any
//! page handler.
//!
//! Strategy: an authoritative lookup against the auth service, skipped when
//! the request carries no well-formed session cookie at all. A missing
//! cookie can never resolve to a session, so short-circuiting it only saves
//! the round-trip; a present cookie is never trusted on its own.

use axum::http::HeaderMap;
use chrono::Utc;

use crate::auth::{has_session_cookie, AuthError, AuthService, SessionRecord};
use crate::route::{classify, RouteClass};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    NoCookie,
    NoSession,
    LookupFailed,
}

impl DenyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyReason::NoCookie => "no_cookie",
            DenyReason::NoSession => "no_session",
            DenyReason::LookupFailed => "lookup_failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GuardDecision {
    /// Public route, no session work done
    Pass,
    /// Protected route with a confirmed session
    Allow(Box<SessionRecord>),
    Deny(DenyReason),
}

impl GuardDecision {
    pub fn is_denied(&self) -> bool {
        matches!(self, GuardDecision::Deny(_))
    }
}

/// Outcome of the authoritative lookup
#[derive(Debug)]
pub enum SessionLookup {
    Found(SessionRecord),
    Missing,
    Failed(AuthError),
}

impl From<Result<Option<SessionRecord>, AuthError>> for SessionLookup {
    fn from(result: Result<Option<SessionRecord>, AuthError>) -> Self {
        match result {
            Ok(Some(record)) => SessionLookup::Found(record),
            Ok(None) => SessionLookup::Missing,
            Err(err) => SessionLookup::Failed(err),
        }
    }
}

/// Pure decision for a protected route once the lookup has completed.
/// Any failure resolves to `Deny`.
pub fn decide_protected(lookup: SessionLookup) -> GuardDecision {
    match lookup {
        SessionLookup::Found(record) if !record.is_expired_at(Utc::now()) => GuardDecision::Allow(Box::new(record)),
        SessionLookup::Found(record) => {
            tracing::debug!(user_id = %record.user.id, "session expired, treating as absent");
            GuardDecision::Deny(DenyReason::NoSession)
        }
        SessionLookup::Missing => GuardDecision::Deny(DenyReason::NoSession),
        SessionLookup::Failed(err) => {
            tracing::warn!(error = %err, "session lookup failed, denying request");
            GuardDecision::Deny(DenyReason::LookupFailed)
        }
    }
}

/// Evaluate the guard for one request
pub async fn evaluate(
    auth: &dyn AuthService,
    session_cookie: &str,
    path: &str,
    headers: &HeaderMap,
) -> GuardDecision {
    if classify(path) == RouteClass::Public {
        return GuardDecision::Pass;
    }

    if !has_session_cookie(headers, session_cookie) {
        return GuardDecision::Deny(DenyReason::NoCookie);
    }

    decide_protected(auth.get_session(headers).await.into())
}
