//! Validate Token Use Case
//!
//! Pure check of a session token. The signature is taken as proof of
//! continued validity: no store access, no activation re-check.

use std::sync::Arc;

use crate::domain::value_object::{
    account_id::AccountId, account_role::AccountRole, username::Username,
};
use crate::error::AuthResult;
use crate::infra::jwt::JwtTokenService;

/// Identity asserted by a valid session token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedAccount {
    pub account_id: AccountId,
    pub username: Username,
    pub role: AccountRole,
}

pub struct ValidateTokenUseCase {
    tokens: Arc<JwtTokenService>,
}

impl ValidateTokenUseCase {
    pub fn new(tokens: Arc<JwtTokenService>) -> Self {
        Self { tokens }
    }

    pub fn execute(&self, token: &str) -> AuthResult<AuthenticatedAccount> {
        let claims = self.tokens.validate_session(token)?;
        Ok(AuthenticatedAccount {
            account_id: claims.sub,
            username: claims.username,
            role: claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::Utc;

    use super::*;
    use crate::domain::token::{SessionClaims, TokenClaims, TokenRejection, VerificationClaims};
    use crate::error::AuthError;

    #[test]
    fn test_session_token_yields_identity() {
        let tokens = Arc::new(JwtTokenService::new(b"secret"));
        let id = AccountId::new();
        let token = tokens
            .issue(&TokenClaims::Session(SessionClaims::new(
                id,
                Username::new("alice").unwrap(),
                AccountRole::Tourist,
                Utc::now(),
                Duration::from_secs(60),
            )))
            .unwrap();

        let who = ValidateTokenUseCase::new(tokens).execute(&token).unwrap();
        assert_eq!(who.account_id, id);
        assert_eq!(who.username.as_str(), "alice");
        assert_eq!(who.role, AccountRole::Tourist);
    }

    #[test]
    fn test_verification_token_is_not_a_session() {
        let tokens = Arc::new(JwtTokenService::new(b"secret"));
        let token = tokens
            .issue(&TokenClaims::Verification(VerificationClaims::new(
                AccountId::new(),
                Utc::now(),
                Duration::from_secs(60),
            )))
            .unwrap();

        let err = ValidateTokenUseCase::new(tokens).execute(&token).unwrap_err();
        assert!(matches!(
            err,
            AuthError::TokenInvalid(TokenRejection::MalformedClaims)
        ));
    }
}
