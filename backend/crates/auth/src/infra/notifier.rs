//! Verification notifiers
//!
//! `LogNotifier` for development, `HttpRelayNotifier` for a JSON mail relay.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;

use crate::domain::notifier::{NotifyError, VerificationMessage, VerificationNotifier};

pub const ACTIVATION_SUBJECT: &str = "ACTIVATE ACCOUNT";

/// Human-readable activation message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationEmail {
    pub subject: &'static str,
    pub text: String,
    pub html: String,
}

/// `<base>?user_id=<id>&token=<token>`
pub fn activation_link(activation_url: &str, message: &VerificationMessage) -> String {
    format!(
        "{}?user_id={}&token={}",
        activation_url, message.account_id, message.token
    )
}

pub fn render_activation(activation_url: &str, message: &VerificationMessage) -> ActivationEmail {
    let link = activation_link(activation_url, message);
    ActivationEmail {
        subject: ACTIVATION_SUBJECT,
        text: format!("Please activate your account by clicking the link: {}", link),
        html: format!(
            "<p>Please activate your account by clicking the link: <a href=\"{}\">Activate</a></p>",
            link
        ),
    }
}

/// Logs deliveries instead of sending them
#[derive(Debug, Clone)]
pub struct LogNotifier {
    activation_url: String,
}

impl LogNotifier {
    pub fn new(activation_url: impl Into<String>) -> Self {
        Self {
            activation_url: activation_url.into(),
        }
    }
}

impl VerificationNotifier for LogNotifier {
    async fn deliver_verification(&self, message: &VerificationMessage) -> Result<(), NotifyError> {
        // The link carries a live token; only debug builds print it
        if cfg!(debug_assertions) {
            tracing::info!(
                account_id = %message.account_id,
                address = %message.address,
                link = %activation_link(&self.activation_url, message),
                "Activation email (not sent)"
            );
        } else {
            tracing::info!(
                account_id = %message.account_id,
                address = %message.address,
                "Activation email (not sent)"
            );
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct MailEnvelope<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
    html: &'a str,
}

/// POSTs a JSON envelope to a mail relay
#[derive(Debug, Clone)]
pub struct HttpRelayNotifier {
    client: Client,
    relay_url: String,
    from: String,
    activation_url: String,
}

impl HttpRelayNotifier {
    pub fn new(
        relay_url: impl Into<String>,
        from: impl Into<String>,
        activation_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            relay_url: relay_url.into(),
            from: from.into(),
            activation_url: activation_url.into(),
        })
    }
}

impl VerificationNotifier for HttpRelayNotifier {
    async fn deliver_verification(&self, message: &VerificationMessage) -> Result<(), NotifyError> {
        let email = render_activation(&self.activation_url, message);
        let envelope = MailEnvelope {
            from: &self.from,
            to: message.address.as_str(),
            subject: email.subject,
            text: &email.text,
            html: &email.html,
        };

        let response = self
            .client
            .post(&self.relay_url)
            .json(&envelope)
            .send()
            .await
            .map_err(|e| {
                let reason = if e.is_timeout() {
                    "request timed out".to_string()
                } else if e.is_connect() {
                    "connection failed".to_string()
                } else {
                    e.to_string()
                };
                NotifyError::Transport(reason)
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Rejected(status.as_u16()));
        }

        tracing::debug!(account_id = %message.account_id, "Activation email handed to relay");
        Ok(())
    }
}
