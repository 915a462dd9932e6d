//! Account model and related functionality

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

/// Account entity
///
/// `secret_hash` is a PHC-format Argon2 string. It is never serialized and
/// never printed by `Debug`.
#[derive(Clone, Serialize, FromRow)]
pub struct Account {
    pub id: Uuid,
    pub identifier: String,
    #[serde(skip_serializing)]
    pub secret_hash: String,
    pub created_at: DateTime<Utc>,
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("identifier", &self.identifier)
            .field("secret_hash", &"<redacted>")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// New account creation payload, with the secret already hashed
#[derive(Clone)]
pub struct NewAccount {
    pub identifier: String,
    pub secret_hash: String,
}

impl NewAccount {
    /// Materialize the account record with a fresh id and creation time
    pub fn into_account(self) -> Account {
        Account {
            id: Uuid::new_v4(),
            identifier: self.identifier,
            secret_hash: self.secret_hash,
            created_at: Utc::now(),
        }
    }
}

/// Identity attached to a request once its bearer token has been verified
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedAccount {
    pub identifier: String,
}
