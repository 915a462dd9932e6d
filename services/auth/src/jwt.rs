//! JWT service for session token issuance and verification
//!
//! Session tokens are stateless: a token is valid when its signature verifies
//! against the configured key and its expiry has not passed. Tokens are signed
//! with HS256 when a shared secret is configured, or RS256 with a PEM key pair.

use anyhow::Result;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;
use uuid::Uuid;

use crate::error::AuthError;

/// Minimum length of an HS256 shared secret, in bytes
pub const MIN_SECRET_LENGTH: usize = 32;

/// Default token lifetime: 24 hours
pub const DEFAULT_TOKEN_EXPIRY: u64 = 86_400;

/// Key material used to sign and verify tokens
#[derive(Clone)]
pub enum SigningKey {
    /// HS256 shared secret
    Secret(String),
    /// RS256 key pair in PEM format
    Rsa {
        private_key: String,
        public_key: String,
    },
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SigningKey::Secret(_) => f.write_str("Secret(<redacted>)"),
            SigningKey::Rsa { .. } => f.write_str("Rsa(<redacted>)"),
        }
    }
}

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Signing key material
    pub signing_key: SigningKey,
    /// Token expiration time in seconds (default: 24 hours)
    pub token_expiry: u64,
    /// Optional `iss` claim, stamped on issue and required on verify
    pub issuer: Option<String>,
}

impl JwtConfig {
    /// Create a config signing with a shared secret
    pub fn with_secret(secret: impl Into<String>, token_expiry: u64) -> Self {
        Self {
            signing_key: SigningKey::Secret(secret.into()),
            token_expiry,
            issuer: None,
        }
    }

    /// Create a new JwtConfig from environment variables
    ///
    /// # Environment Variables
    /// - `JWT_SECRET`: Shared secret for HS256 signing (takes precedence)
    /// - `JWT_PRIVATE_KEY`: Private key for RS256 signing (PEM format) or path to key file
    /// - `JWT_PUBLIC_KEY`: Public key for RS256 verification (PEM format) or path to key file
    /// - `JWT_TOKEN_EXPIRY`: Token expiry in seconds (default: 86400)
    /// - `JWT_ISSUER`: Issuer claim (optional)
    pub fn from_env() -> Result<Self> {
        let signing_key = match std::env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => SigningKey::Secret(secret),
            _ => {
                let private_key = std::env::var("JWT_PRIVATE_KEY").map_err(|_| {
                    anyhow::anyhow!("Neither JWT_SECRET nor JWT_PRIVATE_KEY environment variable set")
                })?;
                let public_key = std::env::var("JWT_PUBLIC_KEY")
                    .map_err(|_| anyhow::anyhow!("JWT_PUBLIC_KEY environment variable not set"))?;

                SigningKey::Rsa {
                    private_key: load_pem(&private_key, "private")?,
                    public_key: load_pem(&public_key, "public")?,
                }
            }
        };

        let token_expiry = std::env::var("JWT_TOKEN_EXPIRY")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|expiry: &u64| *expiry > 0)
            .unwrap_or(DEFAULT_TOKEN_EXPIRY);

        let issuer = std::env::var("JWT_ISSUER").ok().filter(|s| !s.is_empty());

        Ok(JwtConfig {
            signing_key,
            token_expiry,
            issuer,
        })
    }
}

/// Read a PEM value that is either inline or a path (tried from CWD, then crate root)
fn load_pem(value: &str, kind: &str) -> Result<String> {
    if value.starts_with("-----BEGIN") {
        return Ok(value.to_string());
    }

    let contents = std::fs::read_to_string(value)
        .or_else(|_| {
            let mut path = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
            path.push(value);
            std::fs::read_to_string(path)
        })
        .map_err(|e| anyhow::anyhow!("Failed to read {} key file: {}", kind, e))?;

    Ok(contents.trim().to_string())
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Account identifier
    pub sub: String,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
    /// Unique token id
    pub jti: Uuid,
    /// Issuer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

/// JWT service
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    validation: Validation,
    config: JwtConfig,
}

impl JwtService {
    /// Initialize a new JWT service
    pub fn new(config: JwtConfig) -> Result<Self> {
        let (algorithm, encoding_key, decoding_key) = match &config.signing_key {
            SigningKey::Secret(secret) => {
                if secret.len() < MIN_SECRET_LENGTH {
                    anyhow::bail!(
                        "JWT secret must be at least {} bytes long",
                        MIN_SECRET_LENGTH
                    );
                }
                (
                    Algorithm::HS256,
                    EncodingKey::from_secret(secret.as_bytes()),
                    DecodingKey::from_secret(secret.as_bytes()),
                )
            }
            SigningKey::Rsa {
                private_key,
                public_key,
            } => (
                Algorithm::RS256,
                EncodingKey::from_rsa_pem(private_key.as_bytes())?,
                DecodingKey::from_rsa_pem(public_key.as_bytes())?,
            ),
        };

        // Expiry is checked against an explicit clock in `verify_at`
        let mut validation = Validation::new(algorithm);
        validation.validate_exp = false;
        validation.leeway = 0;
        match &config.issuer {
            Some(issuer) => {
                validation.set_required_spec_claims(&["exp", "sub", "iss"]);
                validation.set_issuer(&[issuer]);
            }
            None => validation.set_required_spec_claims(&["exp", "sub"]),
        }

        Ok(JwtService {
            encoding_key,
            decoding_key,
            algorithm,
            validation,
            config,
        })
    }

    /// Issue a token for an account, valid from now
    pub fn issue(&self, identifier: &str) -> Result<String> {
        self.issue_at(identifier, unix_now()?)
    }

    /// Issue a token for an account as if the current time were `now`
    pub fn issue_at(&self, identifier: &str, now: u64) -> Result<String> {
        let claims = Claims {
            sub: identifier.to_string(),
            iat: now,
            exp: now.saturating_add(self.config.token_expiry),
            jti: Uuid::new_v4(),
            iss: self.config.issuer.clone(),
        };

        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Verify a token against the current time
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let now = unix_now().map_err(|e| {
            tracing::error!("{}", e);
            AuthError::Internal
        })?;
        self.verify_at(token, now)
    }

    /// Verify a token's signature, then its expiry against `now`
    ///
    /// A token is valid while `now < exp`.
    pub fn verify_at(&self, token: &str, now: u64) -> Result<Claims, AuthError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                debug!("Token rejected: {}", e);
                match e.kind() {
                    ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                    _ => AuthError::TokenInvalid,
                }
            })?;

        let claims = token_data.claims;
        if now >= claims.exp {
            return Err(AuthError::TokenExpired);
        }

        Ok(claims)
    }

    /// Get the token expiry time in seconds
    pub fn token_expiry(&self) -> u64 {
        self.config.token_expiry
    }
}

/// Seconds since the Unix epoch
pub fn unix_now() -> Result<u64> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| anyhow::anyhow!("Failed to get current time: {}", e))?
        .as_secs();
    Ok(now)
}
