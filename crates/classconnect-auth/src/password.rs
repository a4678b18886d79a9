//! Argon2id password records.
//!
//! New records are PHC strings (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`):
//! salt and derived hash travel together, base64-encoded, in a single column.
//! Records written by the previous service, `base64(salt).base64(hash)` with
//! fixed parameters, are still accepted by [`CredentialHasher::verify`].
//!
//! Verification never says why it failed. A wrong password and a corrupt
//! record produce the same [`AuthError::VerificationFailed`].
//!
//! Argon2 is deliberately slow. From async code, use [`CredentialHasher::spawn_hash`]
//! and [`CredentialHasher::spawn_verify`], which run on the blocking pool.

use std::sync::Arc;

use argon2::password_hash::{Output, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use base64::{Engine, engine::general_purpose::STANDARD};
use rand::RngCore;
use rand::rngs::OsRng;

use classconnect_config::HasherConfig;

use crate::error::AuthError;

/// Salt length in bytes for new records.
pub const SALT_LEN: usize = 16;

// Parameters of `salt.hash` records: 64 MiB, one pass, four lanes.
const LEGACY_MEMORY_KIB: u32 = 64 * 1024;
const LEGACY_ITERATIONS: u32 = 1;
const LEGACY_PARALLELISM: u32 = 4;

/// Derives and verifies salted Argon2id password hashes.
#[derive(Clone)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
    // Record of a random password nobody knows, checked when no account matches.
    decoy: Arc<str>,
}

impl std::fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialHasher")
            .field("params", self.argon2.params())
            .finish()
    }
}

impl CredentialHasher {
    /// Builds a hasher with the configured cost parameters.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Hashing`] when the parameters are out of Argon2's range.
    pub fn new(config: &HasherConfig) -> Result<Self, AuthError> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            Some(config.output_len),
        )
        .map_err(|e| AuthError::Hashing(format!("invalid Argon2 parameters: {e}")))?;

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let mut secret = [0u8; 32];
        OsRng.fill_bytes(&mut secret);
        let decoy = derive(&argon2, &hex::encode(secret))?;

        Ok(Self {
            argon2,
            decoy: decoy.into(),
        })
    }

    /// Hashes a plaintext password with a fresh random salt.
    pub fn hash(&self, plaintext: &str) -> Result<String, AuthError> {
        derive(&self.argon2, plaintext)
    }

    /// [`hash`](Self::hash) on the blocking thread pool.
    pub async fn spawn_hash(&self, plaintext: &str) -> Result<String, AuthError> {
        let hasher = self.clone();
        let plaintext = plaintext.to_owned();
        tokio::task::spawn_blocking(move || hasher.hash(&plaintext))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))?
    }

    /// [`verify`](Self::verify) on the blocking thread pool.
    pub async fn spawn_verify(&self, plaintext: &str, encoded: &str) -> Result<(), AuthError> {
        let hasher = self.clone();
        let plaintext = plaintext.to_owned();
        let encoded = encoded.to_owned();
        tokio::task::spawn_blocking(move || hasher.verify(&plaintext, &encoded))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))?
    }

    /// A record with the current parameters that no password matches.
    ///
    /// Checking a password against it costs exactly as much as checking a
    /// real record, so callers can spend the same time whether or not an
    /// account exists.
    pub fn decoy_record(&self) -> &str {
        &self.decoy
    }

    /// Checks a plaintext password against a stored record.
    ///
    /// Comparison is constant-time. Any mismatch, and any record that cannot
    /// be parsed, yields [`AuthError::VerificationFailed`].
    pub fn verify(&self, plaintext: &str, encoded: &str) -> Result<(), AuthError> {
        let matched = if encoded.starts_with('$') {
            self.verify_phc(plaintext, encoded)
        } else {
            verify_legacy(plaintext, encoded)
        };

        if matched {
            Ok(())
        } else {
            Err(AuthError::VerificationFailed)
        }
    }

    /// Whether a stored record should be rewritten with the current format and parameters.
    pub fn needs_rehash(&self, encoded: &str) -> bool {
        match PasswordHash::new(encoded) {
            Ok(hash) => match Params::try_from(&hash) {
                Ok(stored) => {
                    let current = self.argon2.params();
                    stored.m_cost() != current.m_cost()
                        || stored.t_cost() != current.t_cost()
                        || stored.p_cost() != current.p_cost()
                }
                Err(_) => true,
            },
            Err(_) => true,
        }
    }

    fn verify_phc(&self, plaintext: &str, encoded: &str) -> bool {
        match PasswordHash::new(encoded) {
            Ok(hash) => self
                .argon2
                .verify_password(plaintext.as_bytes(), &hash)
                .is_ok(),
            Err(_) => false,
        }
    }
}

fn derive(argon2: &Argon2<'_>, plaintext: &str) -> Result<String, AuthError> {
    let mut salt_bytes = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt_bytes);

    let salt =
        SaltString::encode_b64(&salt_bytes).map_err(|e| AuthError::Hashing(e.to_string()))?;

    argon2
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

fn verify_legacy(plaintext: &str, encoded: &str) -> bool {
    let Some((salt_b64, hash_b64)) = encoded.split_once('.') else {
        return false;
    };
    let (Ok(salt), Ok(expected)) = (STANDARD.decode(salt_b64), STANDARD.decode(hash_b64)) else {
        return false;
    };

    let Ok(params) = Params::new(
        LEGACY_MEMORY_KIB,
        LEGACY_ITERATIONS,
        LEGACY_PARALLELISM,
        Some(expected.len()),
    ) else {
        return false;
    };

    let mut derived = vec![0u8; expected.len()];
    if Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password_into(plaintext.as_bytes(), &salt, &mut derived)
        .is_err()
    {
        return false;
    }

    // `Output` equality is constant-time.
    match (Output::new(&derived), Output::new(&expected)) {
        (Ok(derived), Ok(expected)) => derived == expected,
        _ => false,
    }
}
