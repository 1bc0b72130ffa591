//! Login Use Case
//!
//! Verifies credentials, gates on activation and issues a session token.
//! Reads only; nothing stored changes on login.

use std::sync::Arc;

use chrono::Utc;

use crate::application::config::AuthConfig;
use crate::application::deadline::within;
use crate::domain::repository::IdentityStore;
use crate::domain::services::CredentialHasher;
use crate::domain::token::{SessionClaims, TokenClaims};
use crate::domain::value_object::{
    account_id::AccountId, password::RawPassword, username::Username,
};
use crate::error::{AuthError, AuthResult};
use crate::infra::jwt::JwtTokenService;

pub struct LoginInput {
    pub username: String,
    pub password: String,
}

pub struct LoginOutput {
    pub account_id: AccountId,
    pub session_token: String,
}

pub struct LoginUseCase<R>
where
    R: IdentityStore,
{
    store: Arc<R>,
    tokens: Arc<JwtTokenService>,
    hasher: CredentialHasher,
    config: Arc<AuthConfig>,
}

impl<R> LoginUseCase<R>
where
    R: IdentityStore,
{
    pub fn new(
        store: Arc<R>,
        tokens: Arc<JwtTokenService>,
        hasher: CredentialHasher,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            store,
            tokens,
            hasher,
            config,
        }
    }

    pub async fn execute(&self, input: LoginInput) -> AuthResult<LoginOutput> {
        // A name that could never have registered is just an unknown user
        let username =
            Username::new(&input.username).map_err(|_| AuthError::CredentialsInvalid)?;

        let Some(account) = within(
            self.config.store_timeout,
            "find account by username",
            self.store.find_by_username(&username),
        )
        .await?
        else {
            // Same hashing cost as a wrong password
            self.hasher
                .verify_absent(RawPassword::presented(input.password))
                .await?;
            return Err(AuthError::CredentialsInvalid);
        };

        if !account.can_login() {
            return Err(AuthError::AccountNotActive);
        }

        let matches = self
            .hasher
            .verify(
                RawPassword::presented(input.password),
                account.password_hash.clone(),
            )
            .await?;
        if !matches {
            return Err(AuthError::CredentialsInvalid);
        }

        let claims = SessionClaims::new(
            account.account_id,
            account.username.clone(),
            account.role,
            Utc::now(),
            self.config.session_ttl,
        );
        let session_token = self.tokens.issue(&TokenClaims::Session(claims))?;

        tracing::info!(account_id = %account.account_id, "Account signed in");

        Ok(LoginOutput {
            account_id: account.account_id,
            session_token,
        })
    }
}
