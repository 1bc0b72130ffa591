//! Shared Kernel - vocabulary used by every identity crate
//!
//! - Unified error type ([`error::app_error::AppError`]) and its HTTP mapping
//! - Typed UUID identifiers ([`id::Id`])
//!
//! Only things with the same meaning everywhere belong here.

pub mod error {
    pub mod app_error;
    #[cfg(feature = "axum")]
    pub mod conversions;
    pub mod kind;
}
pub mod id;
