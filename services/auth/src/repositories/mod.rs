//! Account storage
//!
//! The authenticator only talks to [`AccountStore`]; the in-memory and
//! PostgreSQL implementations both guarantee an atomic insert-if-absent.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Account, NewAccount};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryAccountStore;
pub use postgres::PgAccountStore;

/// Errors returned by account stores
#[derive(Error, Debug)]
pub enum StoreError {
    /// An account with this identifier already exists
    #[error("Account already exists: {0}")]
    Duplicate(String),

    /// The backing store failed
    #[error("Account store error: {0}")]
    Backend(#[from] common::error::DatabaseError),
}

/// Persistence for accounts, keyed by normalized identifier
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Look up an account by identifier
    async fn get(&self, identifier: &str) -> Result<Option<Account>, StoreError>;

    /// Insert a new account, failing with [`StoreError::Duplicate`] if the
    /// identifier is taken
    async fn insert(&self, new_account: NewAccount) -> Result<Account, StoreError>;
}
