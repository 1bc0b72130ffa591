//! Account Entity
//!
//! One identity: credentials, role and activation state.

use chrono::{DateTime, Utc};

use crate::domain::value_object::{
    account_id::AccountId, account_role::AccountRole, password::PasswordDigest,
    username::Username,
};

/// Account entity
#[derive(Debug, Clone)]
pub struct Account {
    /// Server-assigned identifier, never changes
    pub account_id: AccountId,
    /// Unique, case-sensitive
    pub username: Username,
    /// Never serialized outward
    pub password_hash: PasswordDigest,
    /// Assigned at creation, not mutated afterwards
    pub role: AccountRole,
    /// Gates login; starts false
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Candidate account supplied by the caller
///
/// Identifier, hash and activation state are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: Username,
    pub role: AccountRole,
}

impl Account {
    /// Build a fresh, inactive account with a new identifier
    pub fn create(candidate: NewAccount, password_hash: PasswordDigest) -> Self {
        Self {
            account_id: AccountId::new(),
            username: candidate.username,
            password_hash,
            role: candidate.role,
            is_active: false,
            created_at: Utc::now(),
        }
    }

    #[inline]
    pub fn can_login(&self) -> bool {
        self.is_active
    }

    pub fn activate(&mut self) {
        self.is_active = true;
    }
}
