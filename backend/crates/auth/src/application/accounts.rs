//! Account Query Use Case
//!
//! Read-only lookups for other services: listing, single lookup and
//! id-set lookup.

use std::sync::Arc;

use kernel::error::app_error::AppError;

use crate::application::config::AuthConfig;
use crate::application::deadline::within;
use crate::domain::entity::account::Account;
use crate::domain::repository::IdentityStore;
use crate::domain::value_object::account_id::AccountId;
use crate::error::{AuthError, AuthResult};

/// Separator of the id-set path segment
pub const ID_SET_SEPARATOR: char = ',';

/// Parse a caller-supplied account id
pub fn parse_account_id(input: &str) -> AuthResult<AccountId> {
    AccountId::parse_str(input).map_err(|e| {
        AuthError::InvalidInput(AppError::bad_request(format!(
            "Invalid account id: {}",
            e.input()
        )))
    })
}

/// Parse a comma-separated id set; empty segments are ignored
pub fn parse_account_ids(input: &str) -> AuthResult<Vec<AccountId>> {
    let ids = input
        .split(ID_SET_SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(parse_account_id)
        .collect::<AuthResult<Vec<_>>>()?;

    if ids.is_empty() {
        return Err(AuthError::InvalidInput(AppError::bad_request(
            "At least one account id is required",
        )));
    }
    Ok(ids)
}

pub struct AccountQueryUseCase<R>
where
    R: IdentityStore,
{
    store: Arc<R>,
    config: Arc<AuthConfig>,
}

impl<R> AccountQueryUseCase<R>
where
    R: IdentityStore,
{
    pub fn new(store: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self { store, config }
    }

    /// All activated accounts
    pub async fn list_active(&self) -> AuthResult<Vec<Account>> {
        within(
            self.config.store_timeout,
            "list active accounts",
            self.store.list_active(),
        )
        .await
    }

    /// One activated account; inactive or unknown is `NotFound`
    pub async fn get(&self, id: &str) -> AuthResult<Account> {
        let account_id = parse_account_id(id)?;
        within(
            self.config.store_timeout,
            "find active account",
            self.store.find_active_by_id(&account_id),
        )
        .await?
        .ok_or(AuthError::NotFound)
    }

    /// Accounts for a comma-separated id set; unknown ids are omitted
    pub async fn get_many(&self, ids: &str) -> AuthResult<Vec<Account>> {
        let account_ids = parse_account_ids(ids)?;
        within(
            self.config.store_timeout,
            "find accounts by ids",
            self.store.find_by_ids(&account_ids),
        )
        .await
    }
}
