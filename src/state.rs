use std::sync::Arc;

use classconnect_auth::{
    Account, AuthError, CredentialHasher, CredentialStore, InMemoryCredentialStore,
    ResetTokenManager, TokenService,
};
use classconnect_config::{
    AuthConfig, CorsConfig, HasherConfig, JwtConfig, RateLimitConfig, ResetTokenConfig,
};

use crate::middleware::rate_limit::RateLimiter;
use crate::modules::auth::sender::{LogResetLinkSender, ResetLinkSender};

/// Every configuration structure the gateway reads at startup.
#[derive(Clone, Debug, Default)]
pub struct AppConfig {
    pub jwt: JwtConfig,
    pub reset: ResetTokenConfig,
    pub rate_limit: RateLimitConfig,
    pub cors: CorsConfig,
    pub auth: AuthConfig,
    pub hasher: HasherConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            jwt: JwtConfig::from_env(),
            reset: ResetTokenConfig::from_env(),
            rate_limit: RateLimitConfig::from_env(),
            cors: CorsConfig::from_env(),
            auth: AuthConfig::from_env(),
            hasher: HasherConfig::from_env(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CredentialStore>,
    pub tokens: TokenService,
    pub hasher: CredentialHasher,
    pub reset_tokens: ResetTokenManager,
    pub reset_links: Arc<dyn ResetLinkSender>,
    pub rate_limiter: Arc<RateLimiter>,
    pub auth_config: AuthConfig,
    pub cors_config: CorsConfig,
}

impl AppState {
    pub fn new(
        config: &AppConfig,
        store: Arc<dyn CredentialStore>,
        reset_links: Arc<dyn ResetLinkSender>,
    ) -> Result<Self, AuthError> {
        let tokens = TokenService::new(&config.jwt);
        let hasher = CredentialHasher::new(&config.hasher)?;
        let reset_tokens = ResetTokenManager::new(
            store.clone(),
            hasher.clone(),
            tokens.clone(),
            &config.reset,
            config.auth.store_timeout,
        );

        Ok(Self {
            store,
            tokens,
            hasher,
            reset_tokens,
            reset_links,
            rate_limiter: Arc::new(RateLimiter::new(&config.rate_limit)),
            auth_config: config.auth.clone(),
            cors_config: config.cors.clone(),
        })
    }
}

/// Builds the state for the binary: configuration from the environment and
/// an in-memory store, seeded with one account when `SEED_ADMIN_USERNAME`
/// and `SEED_ADMIN_PASSWORD` are set.
pub async fn init_app_state() -> Result<AppState, AuthError> {
    let config = AppConfig::from_env();
    let store = Arc::new(InMemoryCredentialStore::new());
    let state = AppState::new(&config, store.clone(), Arc::new(LogResetLinkSender))?;

    if let (Ok(username), Ok(password)) = (
        std::env::var("SEED_ADMIN_USERNAME"),
        std::env::var("SEED_ADMIN_PASSWORD"),
    ) {
        let email = std::env::var("SEED_ADMIN_EMAIL")
            .unwrap_or_else(|_| format!("{username}@classconnect.local"));
        let role = std::env::var("SEED_ADMIN_ROLE").unwrap_or_else(|_| "admin".to_string());

        store
            .create_account(Account {
                id: uuid::Uuid::new_v4().to_string(),
                username: username.clone(),
                email,
                role,
                password_hash: state.hasher.spawn_hash(&password).await?,
                inactive: false,
                password_changed_at: None,
            })
            .await;
        tracing::info!(username = %username, "Seeded account");
    }

    Ok(state)
}
