//! Argon2 password hashing

use std::sync::Arc;

use argon2::password_hash::SaltString;
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher as _, PasswordVerifier, Version};
use rand_core::OsRng;
use tracing::warn;

use crate::config::app_config::PasswordConfig;
use crate::shared::error::{AppError, AppResult};

/// Hashes and verifies client passwords as PHC strings
pub struct PasswordHasher {
    params: Params,
    /// Hash of a throwaway password, verified against when the account does
    /// not exist so both failure paths cost the same
    dummy_hash: String,
}

impl PasswordHasher {
    pub fn new(config: &PasswordConfig) -> AppResult<Self> {
        let params = Params::new(config.memory_cost_kib, config.iterations, config.parallelism, None)
            .map_err(|e| AppError::Config(format!("Invalid Argon2 parameters: {}", e)))?;

        let mut hasher = Self {
            params,
            dummy_hash: String::new(),
        };
        hasher.dummy_hash = hasher.hash_password("not-a-real-password")?;
        Ok(hasher)
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a password with a fresh random salt
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }

    /// Verify a password against a stored PHC string.
    ///
    /// A malformed stored hash counts as a mismatch.
    pub fn verify_password(&self, password: &str, hash: &str) -> bool {
        match PasswordHash::new(hash) {
            Ok(parsed) => self.argon2().verify_password(password.as_bytes(), &parsed).is_ok(),
            Err(e) => {
                warn!(error = %e, "Stored password hash could not be parsed");
                false
            }
        }
    }

    /// Spend the same work as a real verification and report a mismatch
    pub fn verify_dummy(&self, password: &str) -> bool {
        let _ = self.verify_password(password, &self.dummy_hash);
        false
    }

    /// `hash_password` on the blocking pool
    pub async fn hash_blocking(self: Arc<Self>, password: String) -> AppResult<String> {
        tokio::task::spawn_blocking(move || self.hash_password(&password))
            .await
            .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))?
    }

    /// Verify on the blocking pool. Without a stored hash the dummy hash
    /// is verified instead and the result is always a mismatch.
    pub async fn verify_blocking(self: Arc<Self>, password: String, hash: Option<String>) -> AppResult<bool> {
        tokio::task::spawn_blocking(move || match hash {
            Some(hash) => self.verify_password(&password, &hash),
            None => self.verify_dummy(&password),
        })
        .await
        .map_err(|e| AppError::Internal(format!("Password verification task failed: {}", e)))
    }
}
