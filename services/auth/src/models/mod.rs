//! Authentication service models

pub mod account;

// Re-export for convenience
pub use account::{Account, AuthenticatedAccount, NewAccount};
