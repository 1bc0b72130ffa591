//! Platform Crate - Technical Infrastructure
//!
//! Domain-free building blocks:
//! - Password hashing (Argon2id, zeroized clear text)
//! - Bounded execution of blocking work on the tokio blocking pool

pub mod blocking;
pub mod password;
