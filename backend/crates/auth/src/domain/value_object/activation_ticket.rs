//! Activation Ticket Value Object

use std::fmt;
use uuid::Uuid;

/// One-time proof that an emailed activation link was followed
///
/// Generated at registration, consumed exactly once. The value is an
/// unguessable UUIDv4 (122 bits of randomness).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActivationTicket(String);

impl ActivationTicket {
    /// Generate a fresh ticket
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wrap a raw ticket string (e.g., from a URL path segment)
    ///
    /// No validation: an unknown ticket is rejected by the registry on
    /// consume, which is the only check that matters.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Get the ticket as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ActivationTicket {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ActivationTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tickets_are_unique() {
        let a = ActivationTicket::new();
        let b = ActivationTicket::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_from_raw_roundtrip() {
        let ticket = ActivationTicket::new();
        let wrapped = ActivationTicket::from_raw(ticket.as_str());
        assert_eq!(wrapped, ticket);
    }
}
