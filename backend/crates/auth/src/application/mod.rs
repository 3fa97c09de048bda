//! Application Layer
//!
//! Use cases, token codec, and application configuration.

pub mod activate;
pub mod change_role;
pub mod config;
pub mod login;
pub mod logout;
pub mod me;
pub mod refresh;
pub mod register;
pub mod token;
pub mod update_profile;

use crate::domain::entity::user::User;

/// Result of every token-issuing protocol (registration, login, refresh)
#[derive(Debug)]
pub struct IssuedSession {
    /// Short-lived access token (response body)
    pub access_token: String,
    /// Long-lived refresh token (HTTP-only cookie)
    pub refresh_token: String,
    /// The authenticated user
    pub user: User,
}

// Re-exports
pub use activate::ActivateUseCase;
pub use change_role::ChangeRoleUseCase;
pub use config::AuthConfig;
pub use login::{LoginInput, LoginUseCase};
pub use logout::LogoutUseCase;
pub use me::MeUseCase;
pub use refresh::RefreshUseCase;
pub use register::{RegisterInput, RegisterUseCase};
pub use token::{AccessClaims, RefreshClaims, TokenCodec, TokenError};
pub use update_profile::{UpdateProfileInput, UpdateProfileUseCase};
