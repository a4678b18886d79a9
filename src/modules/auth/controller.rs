use axum::Json;
use axum::extract::{Path, State};
use axum_extra::extract::cookie::CookieJar;
use tracing::instrument;

use classconnect_auth::Identity;
use classconnect_core::AppError;

use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::cookie::{cleared_session_cookie, session_cookie};
use super::model::{
    ForgotPasswordRequest, LoginRequest, MessageResponse, ResetPasswordRequest, TokenResponse,
    UpdatePasswordRequest,
};
use super::service::AuthService;

const FORGOT_PASSWORD_MESSAGE: &str =
    "If an account exists with that email, a password reset link has been sent.";

fn with_session(
    state: &AppState,
    jar: CookieJar,
    token: String,
) -> (CookieJar, Json<TokenResponse>) {
    let cookie = session_cookie(
        &state.auth_config.cookie_name,
        &token,
        state.tokens.expiry(),
    );
    (jar.add(cookie), Json(TokenResponse { token }))
}

/// Login and receive a session cookie
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<(CookieJar, Json<TokenResponse>), AppError> {
    let token = AuthService::login(&state, dto).await?;
    Ok(with_session(&state, jar, token))
}

#[instrument(skip_all)]
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<MessageResponse>) {
    (
        jar.add(cleared_session_cookie(&state.auth_config.cookie_name)),
        Json(MessageResponse::new("Logged out successfully")),
    )
}

/// Change the caller's password and rotate the session
#[instrument(skip_all, fields(username = %auth_user.username()))]
pub async fn change_password(
    State(state): State<AppState>,
    auth_user: AuthUser,
    jar: CookieJar,
    ValidatedJson(dto): ValidatedJson<UpdatePasswordRequest>,
) -> Result<(CookieJar, Json<TokenResponse>), AppError> {
    let token = AuthService::change_password(&state, &auth_user.0, dto).await?;
    Ok(with_session(&state, jar, token))
}

/// Request a password reset link
#[instrument(skip_all)]
pub async fn forgot_password(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    AuthService::forgot_password(&state, dto).await?;
    Ok(Json(MessageResponse::new(FORGOT_PASSWORD_MESSAGE)))
}

/// Reset a password with a reset token and start a session
#[instrument(skip_all)]
pub async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    jar: CookieJar,
    ValidatedJson(dto): ValidatedJson<ResetPasswordRequest>,
) -> Result<(CookieJar, Json<TokenResponse>), AppError> {
    let session = AuthService::reset_password(&state, &token, dto).await?;
    Ok(with_session(&state, jar, session))
}

/// The identity carried by the caller's session
pub async fn me(auth_user: AuthUser) -> Json<Identity> {
    Json(auth_user.0)
}
