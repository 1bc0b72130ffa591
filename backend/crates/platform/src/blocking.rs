//! Bounded blocking execution
//!
//! Runs CPU-heavy work (password hashing) on tokio's blocking pool and gives
//! up waiting after a deadline. The closure itself cannot be interrupted; on
//! timeout it finishes in the background and its result is discarded.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BlockingError {
    #[error("blocking task exceeded {0:?}")]
    TimedOut(Duration),

    #[error("blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Run `f` on the blocking pool, waiting at most `limit`
pub async fn run_blocking<F, T>(limit: Duration, f: F) -> Result<T, BlockingError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let handle = tokio::task::spawn_blocking(f);
    match tokio::time::timeout(limit, handle).await {
        Ok(joined) => Ok(joined?),
        Err(_) => Err(BlockingError::TimedOut(limit)),
    }
}
