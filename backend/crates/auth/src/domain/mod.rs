//! Domain Layer
//!
//! Entities, value objects, token claims, and the traits the outer layers
//! implement.

pub mod entity;
pub mod notifier;
pub mod repository;
pub mod services;
pub mod token;
pub mod value_object;

// Re-exports
pub use entity::{account::Account, profile::Profile};
pub use notifier::VerificationNotifier;
pub use repository::IdentityStore;
