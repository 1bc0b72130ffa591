//! Value Object Module

pub mod account_id;
pub mod account_role;
pub mod email;
pub mod password;
pub mod profile_field;
pub mod username;
