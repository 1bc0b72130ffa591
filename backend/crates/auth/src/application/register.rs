//! Register Use Case
//!
//! Creates an inactive account with its profile and issues the verification
//! token that activates it.

use std::sync::Arc;

use chrono::Utc;

use crate::application::config::AuthConfig;
use crate::application::deadline::within;
use crate::domain::entity::{account::NewAccount, profile::NewProfile};
use crate::domain::repository::IdentityStore;
use crate::domain::token::{TokenClaims, VerificationClaims};
use crate::domain::value_object::{
    account_id::AccountId, account_role::AccountRole, email::Email, password::RawPassword,
    profile_field, username::Username,
};
use crate::error::AuthResult;
use crate::infra::jwt::JwtTokenService;

/// Register input
pub struct RegisterInput {
    pub username: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: String,
    pub profile_image: Option<String>,
    /// "Author" or "Tourist", any case
    pub role: String,
}

/// Register output
///
/// The token is for out-of-band delivery only, never for the HTTP response.
pub struct RegisterOutput {
    pub account_id: AccountId,
    pub email: Email,
    pub verification_token: String,
}

pub struct RegisterUseCase<R>
where
    R: IdentityStore,
{
    store: Arc<R>,
    tokens: Arc<JwtTokenService>,
    config: Arc<AuthConfig>,
}

impl<R> RegisterUseCase<R>
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

    pub async fn execute(&self, input: RegisterInput) -> AuthResult<RegisterOutput> {
        // Role first: an unknown role never reaches storage
        let role = AccountRole::parse_registrable(&input.role)?;

        let username = Username::new(&input.username)?;
        let email = Email::new(&input.email)?;
        let password = RawPassword::new(input.password)?;

        let profile = NewProfile {
            first_name: profile_field::person_name("First name", input.first_name)?,
            last_name: profile_field::person_name("Last name", input.last_name)?,
            email,
            profile_image: profile_field::image_ref(input.profile_image)?,
        };
        let account = NewAccount { username, role };

        // The store hashes inside create_account, so allow for both
        let limit = self.config.store_timeout + self.config.hash_timeout;
        let registered = within(
            limit,
            "create account",
            self.store.create_account(account, profile, password),
        )
        .await?;

        let account = registered.account;
        let claims = VerificationClaims::new(
            account.account_id,
            Utc::now(),
            self.config.verification_ttl,
        );
        let verification_token = self.tokens.issue(&TokenClaims::Verification(claims))?;

        tracing::info!(
            account_id = %account.account_id,
            username = %account.username,
            role = %account.role,
            "Account registered"
        );

        Ok(RegisterOutput {
            account_id: account.account_id,
            email: registered.profile.email,
            verification_token,
        })
    }
}
