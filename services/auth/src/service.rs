//! Credential authenticator: registration, login and token verification

use std::sync::Arc;
use tracing::{error, info, warn};

use crate::{
    error::{AuthError, AuthResult},
    jwt::JwtService,
    models::NewAccount,
    password::SecretHasher,
    rate_limiter::LoginThrottle,
    repositories::{AccountStore, StoreError},
    validation::{SecretPolicy, normalize_identifier, validate_identifier},
};

/// A session token handed out on successful login
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    /// Lifetime in seconds
    pub expires_in: u64,
}

/// Validates credentials against stored accounts and issues session tokens
#[derive(Clone)]
pub struct Authenticator {
    store: Arc<dyn AccountStore>,
    hasher: SecretHasher,
    jwt_service: JwtService,
    throttle: LoginThrottle,
    policy: SecretPolicy,
}

impl Authenticator {
    pub fn new(
        store: Arc<dyn AccountStore>,
        hasher: SecretHasher,
        jwt_service: JwtService,
        throttle: LoginThrottle,
        policy: SecretPolicy,
    ) -> Self {
        Self {
            store,
            hasher,
            jwt_service,
            throttle,
            policy,
        }
    }

    /// Create an account, returning its normalized identifier
    pub async fn register(&self, identifier: &str, secret: &str) -> AuthResult<String> {
        let identifier = normalize_identifier(identifier);
        validate_identifier(&identifier).map_err(AuthError::Validation)?;
        self.policy.validate(secret).map_err(AuthError::Validation)?;

        info!("Registration attempt for: {}", identifier);

        let hasher = self.hasher.clone();
        let secret = secret.to_string();
        let secret_hash = tokio::task::spawn_blocking(move || hasher.hash(&secret))
            .await
            .map_err(|e| {
                error!("Hashing task failed: {}", e);
                AuthError::Internal
            })?
            .map_err(|e| {
                error!("Failed to hash secret: {}", e);
                AuthError::Internal
            })?;

        let account = self
            .store
            .insert(NewAccount {
                identifier,
                secret_hash,
            })
            .await
            .map_err(|e| match e {
                StoreError::Duplicate(identifier) => {
                    info!("Registration rejected, account exists: {}", identifier);
                    AuthError::DuplicateAccount
                }
                StoreError::Backend(e) => {
                    error!("Failed to store account: {}", e);
                    AuthError::Internal
                }
            })?;

        info!("Registered account: {}", account.identifier);
        Ok(account.identifier)
    }

    /// Check credentials and issue a session token
    ///
    /// Unknown identifiers and wrong secrets fail identically with
    /// [`AuthError::InvalidCredentials`]. Each attempt is counted by the
    /// throttle before the secret is checked.
    pub async fn authenticate(&self, identifier: &str, secret: &str) -> AuthResult<IssuedToken> {
        let identifier = normalize_identifier(identifier);
        if identifier.is_empty() {
            return Err(AuthError::Validation("Identifier is required".to_string()));
        }
        if secret.is_empty() {
            return Err(AuthError::Validation("Secret is required".to_string()));
        }

        info!("Login attempt for: {}", identifier);

        if !self.throttle.try_acquire(&identifier).await {
            warn!("Login throttled for: {}", identifier);
            return Err(AuthError::TooManyAttempts);
        }

        let account = self.store.get(&identifier).await.map_err(|e| {
            error!("Failed to look up account: {}", e);
            AuthError::Internal
        })?;

        let hasher = self.hasher.clone();
        let secret = secret.to_string();
        let stored_hash = account.as_ref().map(|a| a.secret_hash.clone());
        let verified = tokio::task::spawn_blocking(move || match stored_hash {
            Some(stored_hash) => hasher.verify(&secret, &stored_hash),
            None => {
                hasher.verify_dummy(&secret);
                Ok(false)
            }
        })
        .await
        .map_err(|e| {
            error!("Verification task failed: {}", e);
            AuthError::Internal
        })?
        .map_err(|e| {
            error!("Failed to verify secret: {}", e);
            AuthError::Internal
        })?;

        let account = match account {
            Some(account) if verified => account,
            _ => {
                warn!("Login failed for: {}", identifier);
                return Err(AuthError::InvalidCredentials);
            }
        };

        self.throttle.reset(&identifier).await;

        let token = self.jwt_service.issue(&account.identifier).map_err(|e| {
            error!("Failed to sign token: {}", e);
            AuthError::Internal
        })?;

        info!("Login succeeded for: {}", account.identifier);
        Ok(IssuedToken {
            token,
            expires_in: self.jwt_service.token_expiry(),
        })
    }

    /// Verify a session token, returning the account identifier it names
    pub fn verify_token(&self, token: &str) -> AuthResult<String> {
        self.jwt_service.verify(token).map(|claims| claims.sub)
    }

    /// The token service used for issuance
    pub fn jwt_service(&self) -> &JwtService {
        &self.jwt_service
    }
}
