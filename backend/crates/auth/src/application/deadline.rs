//! Deadlines for store calls

use std::future::Future;
use std::time::Duration;

use crate::error::{AuthError, AuthResult};

/// Await `fut`, failing with `Timeout(operation)` after `limit`
pub async fn within<T, F>(limit: Duration, operation: &'static str, fut: F) -> AuthResult<T>
where
    F: Future<Output = AuthResult<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(operation, limit_ms = limit.as_millis() as u64, "Deadline exceeded");
            Err(AuthError::Timeout(operation))
        }
    }
}
