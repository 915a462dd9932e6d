//! Salted one-way hashing of account secrets with Argon2id

use anyhow::Result;
use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::{self, SaltString},
};
use std::sync::Arc;
use uuid::Uuid;

/// Argon2 cost parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashConfig {
    /// Memory cost in KiB
    pub memory_cost: u32,
    /// Number of passes
    pub iterations: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            memory_cost: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

impl HashConfig {
    /// Create a new HashConfig from environment variables
    ///
    /// # Environment Variables
    /// - `HASH_MEMORY_COST`: Memory cost in KiB (default: 19456)
    /// - `HASH_ITERATIONS`: Number of passes (default: 2)
    /// - `HASH_PARALLELISM`: Degree of parallelism (default: 1)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let read = |key: &str, default: u32| {
            std::env::var(key)
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default)
        };

        Self {
            memory_cost: read("HASH_MEMORY_COST", defaults.memory_cost),
            iterations: read("HASH_ITERATIONS", defaults.iterations),
            parallelism: read("HASH_PARALLELISM", defaults.parallelism),
        }
    }
}

/// Hashes and verifies secrets
#[derive(Clone)]
pub struct SecretHasher {
    argon2: Argon2<'static>,
    /// Hash of a random secret, verified against when an account is unknown
    dummy_hash: Arc<str>,
}

impl SecretHasher {
    /// Build a hasher from cost parameters
    pub fn new(config: &HashConfig) -> Result<Self> {
        let params = Params::new(
            config.memory_cost,
            config.iterations,
            config.parallelism,
            None,
        )
        .map_err(|e| anyhow::anyhow!("Invalid hash parameters: {}", e))?;

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let dummy_hash = hash_with(&argon2, &Uuid::new_v4().to_string())?;

        Ok(Self {
            argon2,
            dummy_hash: dummy_hash.into(),
        })
    }

    /// Hash a secret with a fresh random salt, returning a PHC string
    pub fn hash(&self, secret: &str) -> Result<String> {
        hash_with(&self.argon2, secret)
    }

    /// Check a secret against a stored PHC string
    ///
    /// The salt and cost parameters come from the stored hash, so accounts
    /// created under older parameters keep verifying.
    pub fn verify(&self, secret: &str, secret_hash: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(secret_hash)
            .map_err(|e| anyhow::anyhow!("Failed to parse secret hash: {}", e))?;

        match self.argon2.verify_password(secret.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(anyhow::anyhow!("Failed to verify secret: {}", e)),
        }
    }

    /// Spend the same work as a real verification, always failing
    pub fn verify_dummy(&self, secret: &str) {
        let _ = self.verify(secret, &self.dummy_hash);
    }
}

fn hash_with(argon2: &Argon2<'_>, secret: &str) -> Result<String> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let secret_hash = argon2
        .hash_password(secret.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash secret: {}", e))?
        .to_string();

    Ok(secret_hash)
}
