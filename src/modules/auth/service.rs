use chrono::Utc;
use tracing::instrument;

use classconnect_auth::store::bounded;
use classconnect_auth::{Account, AuthError, Identity};
use classconnect_core::AppError;

use crate::metrics::{track_login, track_password_reset, track_session_token_issued};
use crate::state::AppState;

use super::model::{
    ForgotPasswordRequest, LoginRequest, ResetPasswordRequest, UpdatePasswordRequest,
};

pub struct AuthService;

impl AuthService {
    /// Checks a username and password and returns a session token.
    ///
    /// Unknown usernames and wrong passwords fail identically. The inactive
    /// flag is only consulted once the password has verified.
    #[instrument(skip_all, fields(username = %dto.username))]
    pub async fn login(state: &AppState, dto: LoginRequest) -> Result<String, AppError> {
        let account = bounded(
            state.auth_config.store_timeout,
            state.store.find_by_username(&dto.username),
        )
        .await?;

        let Some(account) = account else {
            // Same Argon2 cost as a wrong password, so timing does not reveal the account.
            let _ = state
                .hasher
                .spawn_verify(&dto.password, state.hasher.decoy_record())
                .await;
            tracing::info!("Login for unknown username");
            track_login(false);
            return Err(AuthError::InvalidCredentials.into());
        };

        if state
            .hasher
            .spawn_verify(&dto.password, &account.password_hash)
            .await
            .is_err()
        {
            tracing::info!(account_id = %account.id, "Login with wrong password");
            track_login(false);
            return Err(AuthError::InvalidCredentials.into());
        }

        if account.inactive {
            tracing::info!(account_id = %account.id, "Login to inactive account");
            track_login(false);
            return Err(AuthError::AccountInactive.into());
        }

        if state.hasher.needs_rehash(&account.password_hash) {
            tracing::info!(
                account_id = %account.id,
                "Stored password record uses outdated parameters"
            );
        }

        track_login(true);
        issue_session(state, &account, "login")
    }

    #[instrument(skip_all, fields(account_id = %identity.subject_id))]
    pub async fn change_password(
        state: &AppState,
        identity: &Identity,
        dto: UpdatePasswordRequest,
    ) -> Result<String, AppError> {
        let account = bounded(
            state.auth_config.store_timeout,
            state.store.find_by_id(&identity.subject_id),
        )
        .await?
        .ok_or_else(|| AppError::not_found("Account not found"))?;

        state
            .hasher
            .spawn_verify(&dto.current_password, &account.password_hash)
            .await
            .map_err(|_| AppError::unauthorized("Invalid password"))?;

        let password_hash = state.hasher.spawn_hash(&dto.new_password).await?;
        bounded(
            state.auth_config.store_timeout,
            state
                .store
                .update_password(&account.id, &password_hash, Utc::now()),
        )
        .await?;

        tracing::info!("Password changed");
        issue_session(state, &account, "password_change")
    }

    /// Starts a password reset. Succeeds whether or not the email is known.
    #[instrument(skip_all)]
    pub async fn forgot_password(
        state: &AppState,
        dto: ForgotPasswordRequest,
    ) -> Result<(), AppError> {
        let email = dto.email.trim();
        let account = bounded(
            state.auth_config.store_timeout,
            state.store.find_by_email(email),
        )
        .await?;

        let Some(account) = account.filter(|a| !a.inactive) else {
            tracing::info!("Password reset requested for unknown or inactive account");
            return Ok(());
        };

        let token = state.reset_tokens.issue_reset_token(&account.id).await?;
        track_password_reset("issued");

        if let Err(e) = state
            .reset_links
            .send_reset_link(&account.email, &token, state.reset_tokens.validity())
            .await
        {
            tracing::error!(account_id = %account.id, error = %e, "Failed to deliver reset link");
        }

        Ok(())
    }

    #[instrument(skip_all)]
    pub async fn reset_password(
        state: &AppState,
        token: &str,
        dto: ResetPasswordRequest,
    ) -> Result<String, AppError> {
        if dto.new_password != dto.confirm_password {
            return Err(AppError::bad_request("Passwords do not match"));
        }

        let session = state
            .reset_tokens
            .consume_reset_token(token, &dto.new_password)
            .await
            .inspect_err(|e| {
                if matches!(e, AuthError::ResetTokenExpired) {
                    track_password_reset("expired");
                }
            })?;

        track_password_reset("completed");
        track_session_token_issued("password_reset");
        Ok(session)
    }
}

fn issue_session(
    state: &AppState,
    account: &Account,
    reason: &'static str,
) -> Result<String, AppError> {
    let token = state
        .tokens
        .sign(&account.id, &account.username, &account.role)?;
    track_session_token_issued(reason);
    Ok(token)
}
