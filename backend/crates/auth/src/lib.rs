//! Identity Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, store and notifier traits
//! - `application/` - Use cases, configuration, background dispatch
//! - `infra/` - PostgreSQL and in-memory stores, JWT, mail notifiers
//! - `presentation/` - HTTP handlers, DTOs, router, middleware
//!
//! ## Features
//! - Registration of an account together with its profile
//! - Email verification through a signed, single-purpose token
//! - Login issuing a signed session token (HS256)
//! - Stateless token validation and account lookup
//!
//! ## Security Model
//! - Passwords hashed with Argon2id off the async runtime
//! - Unknown user and wrong password are indistinguishable to callers
//! - Tokens pinned to HS256 with mandatory `exp` and `sub`

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::AuthConfig;
pub use application::notification::NotificationDispatcher;
pub use error::{AuthError, AuthResult};
pub use infra::memory::InMemoryIdentityStore;
pub use infra::notifier::{HttpRelayNotifier, LogNotifier};
pub use infra::postgres::PgIdentityStore;
pub use presentation::handlers::AuthAppState;
pub use presentation::router::identity_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

#[cfg(test)]
mod tests;
