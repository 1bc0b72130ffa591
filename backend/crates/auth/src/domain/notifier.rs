//! Verification Notifier
//!
//! Outbound collaborator that delivers the activation message. Delivery is
//! best-effort: failures are logged by the caller and never escalate.

use thiserror::Error;

use crate::domain::value_object::{account_id::AccountId, email::Email};

/// What to deliver
#[derive(Clone)]
pub struct VerificationMessage {
    pub address: Email,
    pub account_id: AccountId,
    pub token: String,
}

impl std::fmt::Debug for VerificationMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationMessage")
            .field("address", &self.address)
            .field("account_id", &self.account_id)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("relay rejected the message with status {0}")]
    Rejected(u16),
}

#[trait_variant::make(VerificationNotifier: Send)]
pub trait LocalVerificationNotifier {
    async fn deliver_verification(&self, message: &VerificationMessage)
    -> Result<(), NotifyError>;
}
