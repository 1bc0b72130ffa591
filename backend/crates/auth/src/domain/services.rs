//! Domain Services

use std::sync::Arc;
use std::time::Duration;

use platform::blocking::run_blocking;
use tokio::sync::OnceCell;

use crate::domain::value_object::password::{PasswordDigest, RawPassword};
use crate::error::AuthResult;

/// Hashed once per hasher and verified against when no account matches
const DECOY_PASSWORD: &str = "decoy-credential-never-assigned";

/// Credential hasher
///
/// Argon2id on the blocking pool, bounded by a deadline. A mismatch is
/// `Ok(false)`, never an error.
#[derive(Clone)]
pub struct CredentialHasher {
    pepper: Option<Arc<[u8]>>,
    limit: Duration,
    decoy: Arc<OnceCell<PasswordDigest>>,
}

impl CredentialHasher {
    pub fn new(pepper: Option<&[u8]>, limit: Duration) -> Self {
        Self {
            pepper: pepper.map(Arc::from),
            limit,
            decoy: Arc::new(OnceCell::new()),
        }
    }

    pub async fn hash(&self, password: RawPassword) -> AuthResult<PasswordDigest> {
        let pepper = self.pepper.clone();
        let digest = run_blocking(self.limit, move || {
            PasswordDigest::from_raw(&password, pepper.as_deref())
        })
        .await??;
        Ok(digest)
    }

    pub async fn verify(&self, password: RawPassword, digest: PasswordDigest) -> AuthResult<bool> {
        let pepper = self.pepper.clone();
        let matches = run_blocking(self.limit, move || {
            digest.verify(&password, pepper.as_deref())
        })
        .await?;
        Ok(matches)
    }

    /// Runs one verification against a digest no account owns, so a
    /// missing account costs the same Argon2 work as a wrong password.
    pub async fn verify_absent(&self, password: RawPassword) -> AuthResult<()> {
        let decoy = self
            .decoy
            .get_or_try_init(|| self.hash(RawPassword::presented(DECOY_PASSWORD.to_string())))
            .await?
            .clone();
        self.verify(password, decoy).await?;
        Ok(())
    }
}

impl std::fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialHasher")
            .field("pepper", &self.pepper.as_ref().map(|_| "[REDACTED]"))
            .field("limit", &self.limit)
            .finish()
    }
}
