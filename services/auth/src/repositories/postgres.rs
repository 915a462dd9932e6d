//! PostgreSQL account store

use async_trait::async_trait;
use common::{
    database::apply_schema,
    error::{DatabaseError, DatabaseResult},
};
use sqlx::PgPool;
use tracing::info;

use super::{AccountStore, StoreError};
use crate::models::{Account, NewAccount};

/// Schema for the accounts table; the unique identifier backs duplicate detection
pub const SCHEMA: &[&str] = &[r#"
    CREATE TABLE IF NOT EXISTS accounts (
        id UUID PRIMARY KEY,
        identifier TEXT NOT NULL UNIQUE,
        secret_hash TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#];

/// Account repository over a PostgreSQL pool
#[derive(Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    /// Create a new account repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the accounts table if it does not exist
    pub async fn migrate(&self) -> DatabaseResult<()> {
        apply_schema(&self.pool, SCHEMA).await
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn get(&self, identifier: &str) -> Result<Option<Account>, StoreError> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, identifier, secret_hash, created_at
            FROM accounts
            WHERE identifier = $1
            "#,
        )
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        Ok(account)
    }

    async fn insert(&self, new_account: NewAccount) -> Result<Account, StoreError> {
        let account = new_account.into_account();

        // No row back means the identifier constraint rejected the insert
        let inserted = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (id, identifier, secret_hash, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (identifier) DO NOTHING
            RETURNING id, identifier, secret_hash, created_at
            "#,
        )
        .bind(account.id)
        .bind(&account.identifier)
        .bind(&account.secret_hash)
        .bind(account.created_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        match inserted {
            Some(account) => {
                info!("Created account: {}", account.identifier);
                Ok(account)
            }
            None => Err(StoreError::Duplicate(account.identifier)),
        }
    }
}
