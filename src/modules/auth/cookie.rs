//! Session cookie construction.

use std::time::Duration;

use axum_extra::extract::cookie::{Cookie, SameSite};
use time::OffsetDateTime;

/// A session cookie carrying `token`, living as long as the token does.
pub fn session_cookie(name: &str, token: &str, lifetime: Duration) -> Cookie<'static> {
    let max_age = time::Duration::try_from(lifetime).unwrap_or(time::Duration::ZERO);

    Cookie::build((name.to_owned(), token.to_owned()))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
        .max_age(max_age)
        .build()
}

/// Replaces the session cookie with an empty, already-expired one.
pub fn cleared_session_cookie(name: &str) -> Cookie<'static> {
    Cookie::build((name.to_owned(), String::new()))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
        .max_age(time::Duration::ZERO)
        .expires(OffsetDateTime::UNIX_EPOCH)
        .build()
}
