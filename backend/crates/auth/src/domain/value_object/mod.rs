//! Value Objects

pub mod activation_ticket;
pub mod email;
pub mod user_id;
pub mod user_role;
pub mod username;

pub use activation_ticket::ActivationTicket;
pub use email::Email;
pub use user_id::UserId;
pub use user_role::UserRole;
pub use username::Username;
