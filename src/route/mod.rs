//! Route classification for the edge guard.
//!
//! Every path is either [`RouteClass::Public`] or [`RouteClass::Protected`].
//! The predicate is independent of the router so it can be checked on its
//! own and reused by the CLI.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

pub const SIGN_IN_PATH: &str = "/signin";
pub const SIGN_UP_PATH: &str = "/signup";
pub const FORGOT_PASSWORD_PATH: &str = "/forgot-password";
pub const RESET_PASSWORD_PATH: &str = "/reset-password";
pub const VERIFY_EMAIL_PATH: &str = "/verify-email";

/// Auth pages reachable without a session
pub const PUBLIC_PAGES: [&str; 5] = [
    SIGN_IN_PATH,
    SIGN_UP_PATH,
    FORGOT_PASSWORD_PATH,
    RESET_PASSWORD_PATH,
    VERIFY_EMAIL_PATH,
];

/// API and asset namespaces that bypass the guard
pub const PUBLIC_NAMESPACES: [&str; 3] = ["/api", "/static", "/assets"];

pub const FAVICON_PATH: &str = "/favicon.ico";

static IMAGE_ASSET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.(?:svg|png|jpg|jpeg|gif|webp|ico)$").expect("valid image pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteClass {
    Public,
    Protected,
}

impl RouteClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteClass::Public => "public",
            RouteClass::Protected => "protected",
        }
    }
}

impl std::fmt::Display for RouteClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

pub fn classify(path: &str) -> RouteClass {
    if is_public_path(path) {
        RouteClass::Public
    } else {
        RouteClass::Protected
    }
}

pub fn is_public_path(path: &str) -> bool {
    // Ambiguous paths never skip the guard
    if !path.starts_with('/') || has_unsafe_segments(path) {
        return false;
    }

    if path == FAVICON_PATH {
        return true;
    }

    if PUBLIC_PAGES
        .iter()
        .chain(PUBLIC_NAMESPACES.iter())
        .any(|prefix| is_under(path, prefix))
    {
        return true;
    }

    IMAGE_ASSET.is_match(path)
}

/// `path` equals `prefix` or is nested below it
fn is_under(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Empty segments and dot segments, literal or percent-encoded
fn has_unsafe_segments(path: &str) -> bool {
    path.contains("//") || path.split('/').any(is_dot_segment)
}

fn is_dot_segment(segment: &str) -> bool {
    let decoded = segment.to_ascii_lowercase().replace("%2e", ".");
    decoded == "." || decoded == ".."
}
