//! Application Configuration
//!
//! Configuration for the identity application layer. Built once at startup
//! and shared read-only through `Arc`.

use std::fmt;
use std::time::Duration;

/// Default activation link target
pub const DEFAULT_ACTIVATION_URL: &str = "http://localhost:8080/api/auth/verify";

/// Identity application configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC signing secret for tokens (HS256)
    pub jwt_secret: Vec<u8>,
    /// Verification token lifetime (1 hour)
    pub verification_ttl: Duration,
    /// Session token lifetime (24 hours)
    pub session_ttl: Duration,
    /// Deadline for each identity store call
    pub store_timeout: Duration,
    /// Deadline for each hash/verify call
    pub hash_timeout: Duration,
    /// Deadline for each notification delivery
    pub notify_timeout: Duration,
    /// Pending notification jobs before new ones are dropped
    pub notify_queue_capacity: usize,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
    /// Base URL of the activation endpoint, used in the emailed link
    pub activation_url: String,
    /// Require a session token on the account lookup routes
    pub protect_account_routes: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: Vec::new(),
            verification_ttl: Duration::from_secs(3600),    // 1 hour
            session_ttl: Duration::from_secs(24 * 3600),    // 24 hours
            store_timeout: Duration::from_secs(5),
            hash_timeout: Duration::from_secs(5),
            notify_timeout: Duration::from_secs(10),
            notify_queue_capacity: 256,
            password_pepper: None,
            activation_url: DEFAULT_ACTIVATION_URL.to_string(),
            protect_account_routes: false,
        }
    }
}

impl AuthConfig {
    /// Create config with a given signing secret
    pub fn with_secret(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            jwt_secret: secret.into(),
            ..Default::default()
        }
    }

    /// Create config with a random signing secret (tokens die with the process)
    pub fn with_random_secret() -> Self {
        use rand::RngCore;
        let mut secret = vec![0u8; 32];
        rand::rng().fill_bytes(&mut secret);
        Self::with_secret(secret)
    }

    /// Create config for development
    pub fn development() -> Self {
        Self::with_random_secret()
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("verification_ttl", &self.verification_ttl)
            .field("session_ttl", &self.session_ttl)
            .field("store_timeout", &self.store_timeout)
            .field("hash_timeout", &self.hash_timeout)
            .field("notify_timeout", &self.notify_timeout)
            .field("notify_queue_capacity", &self.notify_queue_capacity)
            .field(
                "password_pepper",
                &self.password_pepper.as_ref().map(|_| "[REDACTED]"),
            )
            .field("activation_url", &self.activation_url)
            .field("protect_account_routes", &self.protect_account_routes)
            .finish()
    }
}
