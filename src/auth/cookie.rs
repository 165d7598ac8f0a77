use axum::http::HeaderMap;
use axum_extra::extract::cookie::{Cookie, CookieJar};

/// Prefix browsers require for cookies set with `Secure` on https origins
pub const SECURE_PREFIX: &str = "__Secure-";

/// Cheap, local check for a session cookie.
///
/// Only the shape is checked (`<token>.<signature>`, both parts present);
/// signature and expiry are left to the auth service.
pub fn has_session_cookie(headers: &HeaderMap, cookie_name: &str) -> bool {
    session_cookie(headers, cookie_name).is_some()
}

/// The raw value of the first well-formed session cookie, if any
pub fn session_cookie(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    let secure_name = format!("{SECURE_PREFIX}{cookie_name}");

    let found = [cookie_name, secure_name.as_str()]
        .into_iter()
        .filter_map(|name| jar.get(name).map(Cookie::value))
        .find(|value| is_well_formed(value))
        .map(str::to_string);
    found
}

fn is_well_formed(value: &str) -> bool {
    // Signed values are sometimes left percent-encoded by the issuer
    let value = value.replace("%2E", ".").replace("%2e", ".");
    match value.split_once('.') {
        Some((token, signature)) => !token.trim().is_empty() && !signature.trim().is_empty(),
        None => false,
    }
}

/// Expired cookies that make the browser drop both session cookie variants
pub fn removal_cookies(cookie_name: &str, secure: bool) -> CookieJar {
    let mut jar = CookieJar::new();
    let names = [cookie_name.to_string(), format!("{SECURE_PREFIX}{cookie_name}")];
    for name in names {
        let secure_variant = name.starts_with(SECURE_PREFIX);
        let mut cookie = Cookie::build((name, ""))
            .path("/")
            .http_only(true)
            .secure(secure || secure_variant)
            .build();
        cookie.make_removal();
        jar = jar.add(cookie);
    }
    jar
}
