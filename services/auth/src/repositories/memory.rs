//! In-process account store

use async_trait::async_trait;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{AccountStore, StoreError};
use crate::models::{Account, NewAccount};

/// Account store backed by a `HashMap`
///
/// Cloning shares the underlying map.
#[derive(Clone, Default)]
pub struct InMemoryAccountStore {
    accounts: Arc<RwLock<HashMap<String, Account>>>,
}

impl InMemoryAccountStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored accounts
    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    /// Whether the store holds no accounts
    pub async fn is_empty(&self) -> bool {
        self.accounts.read().await.is_empty()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn get(&self, identifier: &str) -> Result<Option<Account>, StoreError> {
        Ok(self.accounts.read().await.get(identifier).cloned())
    }

    async fn insert(&self, new_account: NewAccount) -> Result<Account, StoreError> {
        let mut accounts = self.accounts.write().await;

        match accounts.entry(new_account.identifier.clone()) {
            Entry::Occupied(_) => Err(StoreError::Duplicate(new_account.identifier)),
            Entry::Vacant(slot) => Ok(slot.insert(new_account.into_account()).clone()),
        }
    }
}
