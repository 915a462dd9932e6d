//! Service configuration assembled from the environment

use anyhow::Result;
use common::database::DatabaseConfig;
use std::net::SocketAddr;

use crate::{
    jwt::JwtConfig, password::HashConfig, rate_limiter::RateLimiterConfig,
    validation::SecretPolicy,
};

/// Default listen address
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// Everything the service needs to start
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub jwt: JwtConfig,
    pub hash: HashConfig,
    pub secret_policy: SecretPolicy,
    pub rate_limiter: RateLimiterConfig,
    /// `None` selects the in-memory account store
    pub database: Option<DatabaseConfig>,
}

impl AppConfig {
    /// Create a new AppConfig from environment variables
    ///
    /// # Environment Variables
    /// - `AUTH_BIND_ADDR`: Listen address (default: 0.0.0.0:3000)
    ///
    /// See [`JwtConfig::from_env`], [`HashConfig::from_env`],
    /// [`SecretPolicy::from_env`], [`RateLimiterConfig::from_env`] and
    /// [`DatabaseConfig::from_env`] for the rest.
    pub fn from_env() -> Result<Self> {
        let bind_addr = std::env::var("AUTH_BIND_ADDR")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid AUTH_BIND_ADDR: {}", e))?;

        let database = if DatabaseConfig::is_configured() {
            Some(DatabaseConfig::from_env()?)
        } else {
            None
        };

        Ok(Self {
            bind_addr,
            jwt: JwtConfig::from_env()?,
            hash: HashConfig::from_env(),
            secret_policy: SecretPolicy::from_env(),
            rate_limiter: RateLimiterConfig::from_env(),
            database,
        })
    }
}
