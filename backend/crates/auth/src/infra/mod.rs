//! Infrastructure Layer
//!
//! Database implementations and external service integrations.

pub mod memory;
pub mod notifier;
pub mod postgres;

pub use memory::MemoryAuthRepository;
pub use notifier::LogActivationNotifier;
pub use postgres::PgAuthRepository;
