//! # ClassConnect Auth
//!
//! Credential and session primitives that every protected request depends on.
//!
//! - [`claims`]: Session claims and the request-scoped [`Identity`]
//! - [`jwt`]: [`TokenService`] for signing and verifying session tokens
//! - [`password`]: [`CredentialHasher`], Argon2id password records
//! - [`reset`]: [`ResetTokenManager`], one-time password reset tokens
//! - [`authorize`]: explicit role checks for handlers
//! - [`store`]: the [`CredentialStore`] collaborator and an in-memory implementation
//! - [`error`]: [`AuthError`] and its mapping onto HTTP statuses
//!
//! # Example
//!
//! ```ignore
//! use classconnect_auth::{TokenService, authorize};
//! use classconnect_config::JwtConfig;
//!
//! let tokens = TokenService::new(&JwtConfig::from_env());
//! let token = tokens.sign("42", "alice", "admin")?;
//! let claims = tokens.verify(&token)?;
//! authorize(&claims.role, &["admin", "manager"])?;
//! ```

pub mod authorize;
pub mod claims;
pub mod error;
pub mod jwt;
pub mod password;
pub mod reset;
pub mod store;

pub use authorize::authorize;
pub use claims::{Claims, Identity};
pub use error::AuthError;
pub use jwt::TokenService;
pub use password::CredentialHasher;
pub use reset::ResetTokenManager;
pub use store::{Account, CredentialStore, InMemoryCredentialStore, ResetTicket, StoreError};
