//! API DTOs (Data Transfer Objects)

use serde::{Deserialize, Serialize};

use crate::application::AuthenticatedAccount;
use crate::domain::entity::account::Account;

// ============================================================================
// Register
// ============================================================================

/// Register request
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    #[serde(default, alias = "firstName")]
    pub first_name: Option<String>,
    #[serde(default, alias = "lastName")]
    pub last_name: Option<String>,
    pub email: String,
    #[serde(default, alias = "profileImage")]
    pub profile_image: Option<String>,
    pub role: String,
}

/// Plain acknowledgement
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ============================================================================
// Login
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub id: String,
    #[serde(rename = "accessToken")]
    pub access_token: String,
}

// ============================================================================
// Validate / Verify
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ValidateTokenResponse {
    #[serde(rename = "userID")]
    pub user_id: String,
    pub username: String,
    pub role: String,
}

impl From<AuthenticatedAccount> for ValidateTokenResponse {
    fn from(who: AuthenticatedAccount) -> Self {
        Self {
            user_id: who.account_id.to_string(),
            username: who.username.into_inner(),
            role: who.role.code().to_string(),
        }
    }
}

/// GET /api/auth/verify query
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyQuery {
    pub token: String,
    pub user_id: Option<String>,
}

// ============================================================================
// Accounts
// ============================================================================

/// Outward view of an account (no hash, no activation flag)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountResponse {
    pub id: String,
    pub username: String,
    pub role: String,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.account_id.to_string(),
            username: account.username.into_inner(),
            role: account.role.code().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagedResult<T> {
    pub results: Vec<T>,
    #[serde(rename = "totalCount")]
    pub total_count: usize,
}

impl<T> PagedResult<T> {
    pub fn new(results: Vec<T>) -> Self {
        let total_count = results.len();
        Self {
            results,
            total_count,
        }
    }
}
