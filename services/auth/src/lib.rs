//! Credential authenticator service
//!
//! Registers accounts with Argon2id-hashed secrets, authenticates them, and
//! issues stateless signed session tokens checked by a bearer middleware.

pub mod config;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod rate_limiter;
pub mod repositories;
pub mod routes;
pub mod service;
pub mod validation;

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use crate::{
    config::AppConfig,
    jwt::JwtService,
    password::SecretHasher,
    rate_limiter::LoginThrottle,
    repositories::{AccountStore, InMemoryAccountStore, PgAccountStore},
    service::Authenticator,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub authenticator: Authenticator,
}

impl AppState {
    /// Wire the authenticator over an explicit store
    pub fn new(config: &AppConfig, store: Arc<dyn AccountStore>) -> Result<Self> {
        let hasher = SecretHasher::new(&config.hash)?;
        let jwt_service = JwtService::new(config.jwt.clone())?;
        let throttle = LoginThrottle::new(config.rate_limiter.clone());

        let authenticator = Authenticator::new(
            store,
            hasher,
            jwt_service,
            throttle,
            config.secret_policy.clone(),
        );

        Ok(Self { authenticator })
    }

    /// Wire the authenticator over the configured store
    ///
    /// Connects to PostgreSQL and applies the schema when a database is
    /// configured, otherwise keeps accounts in memory.
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        let store: Arc<dyn AccountStore> = match &config.database {
            Some(db_config) => {
                let pool = common::database::init_pool(db_config).await?;

                if !common::database::health_check(&pool).await? {
                    anyhow::bail!("Failed to connect to database");
                }
                info!("Database connection successful");

                let store = PgAccountStore::new(pool);
                store.migrate().await?;
                Arc::new(store)
            }
            None => {
                info!("DATABASE_URL not set, keeping accounts in memory");
                Arc::new(InMemoryAccountStore::new())
            }
        };

        Self::new(config, store)
    }
}
