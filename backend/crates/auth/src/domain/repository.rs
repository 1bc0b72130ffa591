//! Repository Traits
//!
//! Interfaces for data persistence. Implementations live in the
//! infrastructure layer.

use crate::domain::entity::{
    account::{Account, NewAccount},
    profile::{NewProfile, Profile},
};
use crate::domain::value_object::{
    account_id::AccountId, password::RawPassword, username::Username,
};
use crate::error::AuthResult;

/// Result of a successful registration write
#[derive(Debug, Clone)]
pub struct Registered {
    pub account: Account,
    pub profile: Profile,
}

/// Identity store
///
/// Uniqueness of username (accounts) and of email and owning account
/// (profiles) holds at all times, including under concurrent writers.
#[trait_variant::make(IdentityStore: Send)]
pub trait LocalIdentityStore {
    /// Hash the password, assign identifiers and persist account + profile
    /// as one unit. The account starts inactive.
    ///
    /// Fails with `DuplicateIdentity` if the username or email is taken,
    /// whether the pre-check or the storage constraint caught it.
    async fn create_account(
        &self,
        account: NewAccount,
        profile: NewProfile,
        password: RawPassword,
    ) -> AuthResult<Registered>;

    /// Lookup by username, any activation state
    async fn find_by_username(&self, username: &Username) -> AuthResult<Option<Account>>;

    /// Lookup by id, any activation state
    async fn find_by_id(&self, account_id: &AccountId) -> AuthResult<Option<Account>>;

    /// Lookup by id, activated accounts only
    async fn find_active_by_id(&self, account_id: &AccountId) -> AuthResult<Option<Account>>;

    /// All activated accounts
    async fn list_active(&self) -> AuthResult<Vec<Account>>;

    /// Accounts for a set of ids; duplicates collapse, unknown ids are omitted
    async fn find_by_ids(&self, account_ids: &[AccountId]) -> AuthResult<Vec<Account>>;

    /// Set the activation flag. `false` if no such account exists.
    async fn activate(&self, account_id: &AccountId) -> AuthResult<bool>;
}
