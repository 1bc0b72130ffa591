//! Infrastructure Layer
//!
//! Storage, token signing, and outbound notification.

pub mod jwt;
pub mod memory;
pub mod notifier;
pub mod postgres;

pub use jwt::JwtTokenService;
pub use memory::InMemoryIdentityStore;
pub use notifier::{HttpRelayNotifier, LogNotifier};
pub use postgres::PgIdentityStore;
