//! Notification Dispatcher
//!
//! Hands verification messages to a background worker so registration never
//! waits on mail delivery. Each delivery runs in its own task under its own
//! deadline; outcomes are logged and otherwise dropped. Nothing here is tied
//! to the lifetime of the request that queued the message.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::domain::notifier::{VerificationMessage, VerificationNotifier};

#[derive(Debug, Clone)]
pub struct NotificationDispatcher {
    sender: mpsc::Sender<VerificationMessage>,
}

impl NotificationDispatcher {
    /// Start the worker. It stops once every dispatcher clone is dropped.
    pub fn spawn<N>(notifier: Arc<N>, timeout: Duration, capacity: usize) -> (Self, JoinHandle<()>)
    where
        N: VerificationNotifier + Sync + 'static,
    {
        let (sender, mut receiver) = mpsc::channel::<VerificationMessage>(capacity.max(1));

        let worker = tokio::spawn(async move {
            while let Some(message) = receiver.recv().await {
                let notifier = Arc::clone(&notifier);
                tokio::spawn(async move {
                    deliver(notifier.as_ref(), &message, timeout).await;
                });
            }
            tracing::debug!("Notification worker stopped");
        });

        (Self { sender }, worker)
    }

    /// Queue a message without waiting. `false` if it was dropped.
    pub fn dispatch(&self, message: VerificationMessage) -> bool {
        match self.sender.try_send(message) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(message)) => {
                tracing::warn!(
                    account_id = %message.account_id,
                    "Notification queue full; activation email dropped"
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(message)) => {
                tracing::error!(
                    account_id = %message.account_id,
                    "Notification worker gone; activation email dropped"
                );
                false
            }
        }
    }
}

async fn deliver<N>(notifier: &N, message: &VerificationMessage, timeout: Duration)
where
    N: VerificationNotifier,
{
    match tokio::time::timeout(timeout, notifier.deliver_verification(message)).await {
        Ok(Ok(())) => {
            tracing::info!(account_id = %message.account_id, "Activation email delivered");
        }
        Ok(Err(e)) => {
            tracing::warn!(
                account_id = %message.account_id,
                error = %e,
                "Activation email delivery failed"
            );
        }
        Err(_) => {
            tracing::warn!(
                account_id = %message.account_id,
                timeout_ms = timeout.as_millis() as u64,
                "Activation email delivery timed out"
            );
        }
    }
}
