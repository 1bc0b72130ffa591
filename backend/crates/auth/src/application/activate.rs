//! Activate Account Use Case
//!
//! Consumes a verification token and flips the activation flag. Activating
//! an already active account succeeds.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::deadline::within;
use crate::domain::repository::IdentityStore;
use crate::domain::token::TokenRejection;
use crate::domain::value_object::account_id::AccountId;
use crate::error::{AuthError, AuthResult};
use crate::infra::jwt::JwtTokenService;

pub struct ActivateAccountUseCase<R>
where
    R: IdentityStore,
{
    store: Arc<R>,
    tokens: Arc<JwtTokenService>,
    config: Arc<AuthConfig>,
}

impl<R> ActivateAccountUseCase<R>
where
    R: IdentityStore,
{
    pub fn new(store: Arc<R>, tokens: Arc<JwtTokenService>, config: Arc<AuthConfig>) -> Self {
        Self {
            store,
            tokens,
            config,
        }
    }

    /// `user_id`, when given, must name the token's subject
    pub async fn execute(&self, token: &str, user_id: Option<&str>) -> AuthResult<AccountId> {
        let claims = self.tokens.validate_verification(token)?;

        if let Some(user_id) = user_id {
            let claimed = super::accounts::parse_account_id(user_id)?;
            if claimed != claims.sub {
                return Err(AuthError::TokenInvalid(TokenRejection::SubjectMismatch));
            }
        }

        let found = within(
            self.config.store_timeout,
            "activate account",
            self.store.activate(&claims.sub),
        )
        .await?;
        if !found {
            return Err(AuthError::NotFound);
        }

        tracing::info!(account_id = %claims.sub, "Account activated");
        Ok(claims.sub)
    }
}
