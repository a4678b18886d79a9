//! Session authentication.
//!
//! [`authenticate`] runs for every request whose path is not excluded in
//! [`AuthConfig`](classconnect_config::AuthConfig). It reads the session
//! token from the session cookie, or from an `Authorization: Bearer` header
//! when no cookie is present, verifies it, and stores the resulting
//! [`Identity`] in the request extensions. Handlers read it back through
//! the [`AuthUser`] extractor.
//!
//! Authentication says nothing about what the caller may do. Handlers that
//! need particular roles call [`AuthUser::authorize`].
//!
//! # Example
//!
//! ```ignore
//! use crate::middleware::auth::AuthUser;
//!
//! async fn grade_report(auth_user: AuthUser) -> Result<impl IntoResponse, AppError> {
//!     auth_user.authorize(&["admin", "teacher"])?;
//!     // ...
//! }
//! ```

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::{Next, from_fn_with_state},
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use classconnect_auth::{AuthError, Identity, authorize};
use classconnect_core::AppError;

use super::chain::Middleware;
use crate::metrics::track_auth_failure;
use crate::router::route_label;
use crate::state::AppState;

/// Reads the session token from the named cookie, then from the bearer header.
pub fn session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let from_cookie = CookieJar::from_headers(headers)
        .get(cookie_name)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty());

    from_cookie.or_else(|| {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
    })
}

pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if state.auth_config.is_excluded(req.uri().path()) {
        return Ok(next.run(req).await);
    }

    let Some(token) = session_token(req.headers(), &state.auth_config.cookie_name) else {
        track_auth_failure("missing_token");
        return Err(AuthError::MissingToken.into());
    };

    let claims = state.tokens.verify(&token).map_err(|err| {
        let reason = match err {
            AuthError::TokenExpired => "expired_token",
            _ => "invalid_token",
        };
        tracing::debug!(path = route_label(req.uri().path()), reason, "Session token rejected");
        track_auth_failure(reason);
        err
    })?;

    req.extensions_mut().insert(Identity::from(claims));
    Ok(next.run(req).await)
}

pub fn authentication(state: &AppState) -> Middleware {
    Middleware::from_layer(
        "authenticate",
        from_fn_with_state(state.clone(), authenticate),
    )
}

/// The identity established by [`authenticate`].
#[derive(Debug, Clone)]
pub struct AuthUser(pub Identity);

impl AuthUser {
    pub fn subject_id(&self) -> &str {
        &self.0.subject_id
    }

    pub fn username(&self) -> &str {
        &self.0.username
    }

    pub fn role(&self) -> &str {
        &self.0.role
    }

    /// Fails with `403` unless the caller's role is one of `allowed`.
    pub fn authorize(&self, allowed: &[&str]) -> Result<(), AppError> {
        authorize(&self.0.role, allowed).map_err(|err| {
            tracing::info!(
                username = %self.0.username,
                role = %self.0.role,
                "Access denied"
            );
            AppError::from(err)
        })
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| AuthError::MissingToken.into())
    }
}
