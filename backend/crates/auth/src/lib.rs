//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Business logic, entities, repository traits
//! - `application/` - Use cases, token codec, config
//! - `infra/` - Database implementations
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Features
//! - Registration with email + password, account activation handshake
//! - Access/refresh token pairs (HS256, distinct secrets)
//! - Refresh token rotation with a single live session per user
//! - Server-side revocation on logout
//! - Role-based access (User, Researcher, Admin)
//!
//! ## Security Model
//! - Passwords hashed with Argon2id (NIST SP 800-63B compliant)
//! - A refresh token is accepted only while it byte-equals the stored
//!   session record; every use rotates it
//! - Refresh tokens travel in an HTTP-only cookie, access tokens in the
//!   response body
//! - Store outages surface as 503, never as an authentication failure

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::AuthConfig;
pub use application::token::TokenCodec;
pub use error::{AuthError, AuthResult};
pub use infra::memory::MemoryAuthRepository;
pub use infra::notifier::LogActivationNotifier;
pub use infra::postgres::PgAuthRepository;
pub use presentation::router::{auth_router, auth_router_generic};

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

pub mod handlers {
    pub use crate::presentation::handlers::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}

#[cfg(test)]
mod tests;
