//! Profile Entity
//!
//! Person data tied one-to-one to an account. Created together with its
//! account and never touched again by this crate.

use chrono::{DateTime, Utc};

use crate::domain::value_object::{
    account_id::{AccountId, ProfileId},
    email::Email,
};

#[derive(Debug, Clone)]
pub struct Profile {
    pub profile_id: ProfileId,
    /// Owning account (unique)
    pub account_id: AccountId,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Unique across all profiles
    pub email: Email,
    pub profile_image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Candidate profile supplied by the caller
#[derive(Debug, Clone)]
pub struct NewProfile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Email,
    pub profile_image: Option<String>,
}

impl Profile {
    /// Attach a candidate profile to its (new) owning account
    pub fn create(candidate: NewProfile, account_id: AccountId) -> Self {
        Self {
            profile_id: ProfileId::new(),
            account_id,
            first_name: candidate.first_name,
            last_name: candidate.last_name,
            email: candidate.email,
            profile_image: candidate.profile_image,
            created_at: Utc::now(),
        }
    }
}
