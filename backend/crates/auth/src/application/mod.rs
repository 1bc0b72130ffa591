//! Application Layer
//!
//! Use cases and application services.

pub mod accounts;
pub mod activate;
pub mod config;
pub mod deadline;
pub mod login;
pub mod notification;
pub mod register;
pub mod validate_token;

// Re-exports
pub use accounts::AccountQueryUseCase;
pub use activate::ActivateAccountUseCase;
pub use config::AuthConfig;
pub use login::{LoginInput, LoginOutput, LoginUseCase};
pub use notification::NotificationDispatcher;
pub use register::{RegisterInput, RegisterOutput, RegisterUseCase};
pub use validate_token::{AuthenticatedAccount, ValidateTokenUseCase};
