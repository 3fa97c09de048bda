//! Repository Traits
//!
//! Interfaces for data persistence and outbound notification.
//! Implementations are in the infrastructure layer; the use cases receive
//! them as injected dependencies, never as ambient globals.

use crate::domain::entity::user::User;
use crate::domain::value_object::{
    activation_ticket::ActivationTicket, email::Email, user_id::UserId,
};
use crate::error::AuthResult;

/// Credential store: owns the user records
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Create a new user
    async fn create(&self, user: &User) -> AuthResult<()>;

    /// Find user by ID
    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>>;

    /// Find user by email
    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>>;

    /// Check if an email is already registered
    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool>;

    /// Update user
    async fn update(&self, user: &User) -> AuthResult<()>;
}

/// Session store: the authoritative record of the one live refresh token
/// per user
///
/// `put` and `remove` on the same key are linearizable; `replace` is an
/// atomic compare-and-swap on the stored token value.
#[trait_variant::make(SessionRepository: Send)]
pub trait LocalSessionRepository {
    /// Record a refresh token, overwriting any prior record for this user
    ///
    /// Side effect: a previously issued refresh token for this user stops
    /// being accepted even while cryptographically valid.
    async fn put(&self, user_id: &UserId, token: &str) -> AuthResult<()>;

    /// Get the current refresh token record, if any
    async fn get(&self, user_id: &UserId) -> AuthResult<Option<String>>;

    /// Swap the record from `current` to `fresh` in one atomic step
    ///
    /// Returns `false` when the stored record is not byte-equal to
    /// `current` (already rotated, logged out, or never present).
    /// Exactly one of two concurrent rotations can succeed.
    async fn replace(&self, user_id: &UserId, current: &str, fresh: &str) -> AuthResult<bool>;

    /// Remove the record; idempotent (absent record is not an error)
    async fn remove(&self, user_id: &UserId) -> AuthResult<()>;
}

/// Activation registry: pending one-time activation tickets
#[trait_variant::make(ActivationRepository: Send)]
pub trait LocalActivationRepository {
    /// Generate and store a ticket for an unactivated user
    async fn create(&self, user_id: &UserId) -> AuthResult<ActivationTicket>;

    /// Consume a ticket atomically
    ///
    /// Returns the associated user on first use, `None` when the ticket
    /// was never issued or is already consumed. At most one of several
    /// concurrent calls with the same ticket observes `Some`.
    async fn consume(&self, ticket: &ActivationTicket) -> AuthResult<Option<UserId>>;
}

/// Outbound port for activation link delivery
///
/// Real delivery lives outside this core. Failure is reported to the
/// caller but must never roll back the registration that triggered it.
#[trait_variant::make(ActivationNotifier: Send)]
pub trait LocalActivationNotifier {
    /// Dispatch the activation URL to the given address
    async fn send_activation(&self, email: &Email, activation_url: &str) -> AuthResult<()>;
}
