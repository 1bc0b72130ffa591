//! Token Claims
//!
//! Two fixed claim shapes share one signing mechanism. Tokens are stateless:
//! nothing here is stored and there is no revocation handle.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::value_object::{
    account_id::AccountId, account_role::AccountRole, username::Username,
};

/// Why a token was refused
///
/// All variants surface to callers as one "unauthorized" class; the
/// distinction is kept for logs and error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenRejection {
    #[error("token has expired")]
    Expired,

    #[error("signature does not verify")]
    BadSignature,

    #[error("unexpected signing algorithm")]
    UnexpectedAlgorithm,

    /// Required claims absent or of the wrong shape
    #[error("malformed claims")]
    MalformedClaims,

    /// Not a decodable token at all
    #[error("malformed token")]
    Malformed,

    #[error("token subject does not match")]
    SubjectMismatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenPurpose {
    #[serde(rename = "verify_email")]
    VerifyEmail,
}

/// Claims of the single-purpose email verification token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationClaims {
    pub sub: AccountId,
    #[serde(rename = "action")]
    pub purpose: TokenPurpose,
    pub iat: i64,
    pub exp: i64,
}

impl VerificationClaims {
    pub fn new(sub: AccountId, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        let (iat, exp) = window(issued_at, ttl);
        Self {
            sub,
            purpose: TokenPurpose::VerifyEmail,
            iat,
            exp,
        }
    }
}

/// Claims of the session (bearer) token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: AccountId,
    pub username: Username,
    pub role: AccountRole,
    pub iat: i64,
    pub exp: i64,
}

impl SessionClaims {
    pub fn new(
        sub: AccountId,
        username: Username,
        role: AccountRole,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        let (iat, exp) = window(issued_at, ttl);
        Self {
            sub,
            username,
            role,
            iat,
            exp,
        }
    }
}

/// Either claim shape
///
/// Untagged: a payload with `username` and `role` is a session, one with
/// `action` is a verification. Session is tried first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TokenClaims {
    Session(SessionClaims),
    Verification(VerificationClaims),
}

/// Claim sets that carry an expiry
///
/// `exp` is the first second at which the token is refused.
pub trait Expiring {
    fn expires_at(&self) -> i64;
}

impl Expiring for SessionClaims {
    fn expires_at(&self) -> i64 {
        self.exp
    }
}

impl Expiring for VerificationClaims {
    fn expires_at(&self) -> i64 {
        self.exp
    }
}

impl Expiring for TokenClaims {
    fn expires_at(&self) -> i64 {
        match self {
            TokenClaims::Session(c) => c.exp,
            TokenClaims::Verification(c) => c.exp,
        }
    }
}

impl From<SessionClaims> for TokenClaims {
    fn from(claims: SessionClaims) -> Self {
        TokenClaims::Session(claims)
    }
}

impl From<VerificationClaims> for TokenClaims {
    fn from(claims: VerificationClaims) -> Self {
        TokenClaims::Verification(claims)
    }
}

/// (iat, exp) in Unix seconds
///
/// `exp` is `issued_at + ttl` rounded up, so a token is never refused before
/// its real expiry.
fn window(issued_at: DateTime<Utc>, ttl: Duration) -> (i64, i64) {
    let iat = issued_at.timestamp();
    let nanos = u64::from(issued_at.timestamp_subsec_nanos()) + u64::from(ttl.subsec_nanos());
    let secs = ttl.as_secs().saturating_add(nanos.div_ceil(1_000_000_000));
    (iat, iat.saturating_add(i64::try_from(secs).unwrap_or(i64::MAX)))
}
