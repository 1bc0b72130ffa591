//! In-memory identity store
//!
//! Same contract as the PostgreSQL store. The uniqueness check and both
//! inserts happen under one write lock, which plays the role of the
//! transaction and the unique indexes at once.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::domain::entity::{
    account::{Account, NewAccount},
    profile::{NewProfile, Profile},
};
use crate::domain::repository::{IdentityStore, Registered};
use crate::domain::services::CredentialHasher;
use crate::domain::value_object::{
    account_id::AccountId, email::Email, password::RawPassword, username::Username,
};
use crate::error::{AuthError, AuthResult};

#[derive(Debug, Default)]
struct State {
    accounts: HashMap<AccountId, Account>,
    profiles: HashMap<AccountId, Profile>,
    /// Insertion order, for stable listings
    order: Vec<AccountId>,
    username_index: HashMap<Username, AccountId>,
    email_index: HashMap<Email, AccountId>,
}

#[derive(Debug, Clone)]
pub struct InMemoryIdentityStore {
    state: Arc<RwLock<State>>,
    hasher: CredentialHasher,
}

impl InMemoryIdentityStore {
    pub fn new(hasher: CredentialHasher) -> Self {
        Self {
            state: Arc::new(RwLock::new(State::default())),
            hasher,
        }
    }

    /// Profile of an account, if any
    pub async fn profile_of(&self, account_id: &AccountId) -> Option<Profile> {
        self.state.read().await.profiles.get(account_id).cloned()
    }

    /// Number of stored accounts, any state
    pub async fn account_count(&self) -> usize {
        self.state.read().await.accounts.len()
    }
}

impl IdentityStore for InMemoryIdentityStore {
    async fn create_account(
        &self,
        account: NewAccount,
        profile: NewProfile,
        password: RawPassword,
    ) -> AuthResult<Registered> {
        // Hash before taking the lock
        let password_hash = self.hasher.hash(password).await?;

        let mut state = self.state.write().await;
        if state.username_index.contains_key(&account.username)
            || state.email_index.contains_key(&profile.email)
        {
            return Err(AuthError::DuplicateIdentity);
        }

        let account = Account::create(account, password_hash);
        let profile = Profile::create(profile, account.account_id);
        let account_id = account.account_id;

        state
            .username_index
            .insert(account.username.clone(), account_id);
        state.email_index.insert(profile.email.clone(), account_id);
        state.order.push(account_id);
        state.accounts.insert(account_id, account.clone());
        state.profiles.insert(account_id, profile.clone());

        Ok(Registered { account, profile })
    }

    async fn find_by_username(&self, username: &Username) -> AuthResult<Option<Account>> {
        let state = self.state.read().await;
        Ok(state
            .username_index
            .get(username)
            .and_then(|id| state.accounts.get(id))
            .cloned())
    }

    async fn find_by_id(&self, account_id: &AccountId) -> AuthResult<Option<Account>> {
        Ok(self.state.read().await.accounts.get(account_id).cloned())
    }

    async fn find_active_by_id(&self, account_id: &AccountId) -> AuthResult<Option<Account>> {
        Ok(self
            .state
            .read()
            .await
            .accounts
            .get(account_id)
            .filter(|a| a.is_active)
            .cloned())
    }

    async fn list_active(&self) -> AuthResult<Vec<Account>> {
        let state = self.state.read().await;
        Ok(state
            .order
            .iter()
            .filter_map(|id| state.accounts.get(id))
            .filter(|a| a.is_active)
            .cloned()
            .collect())
    }

    async fn find_by_ids(&self, account_ids: &[AccountId]) -> AuthResult<Vec<Account>> {
        let wanted: HashSet<&AccountId> = account_ids.iter().collect();
        let state = self.state.read().await;
        Ok(state
            .order
            .iter()
            .filter(|id| wanted.contains(id))
            .filter_map(|id| state.accounts.get(id))
            .cloned()
            .collect())
    }

    async fn activate(&self, account_id: &AccountId) -> AuthResult<bool> {
        let mut state = self.state.write().await;
        match state.accounts.get_mut(account_id) {
            Some(account) => {
                account.activate();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
