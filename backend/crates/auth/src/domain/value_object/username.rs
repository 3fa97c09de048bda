//! Username Value Object

use kernel::error::app_error::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Minimum username length in characters
const USERNAME_MIN_LENGTH: usize = 3;

/// Maximum username length in characters
const USERNAME_MAX_LENGTH: usize = 32;

/// Display name chosen at registration; not unique, not used for login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Username(String);

impl Username {
    /// Create a new username with validation
    pub fn new(username: impl Into<String>) -> AppResult<Self> {
        let username = username.into().trim().to_string();

        let char_count = username.chars().count();

        if char_count < USERNAME_MIN_LENGTH {
            return Err(AppError::bad_request(format!(
                "Username must be at least {} characters",
                USERNAME_MIN_LENGTH
            )));
        }

        if char_count > USERNAME_MAX_LENGTH {
            return Err(AppError::bad_request(format!(
                "Username must be at most {} characters",
                USERNAME_MAX_LENGTH
            )));
        }

        if username.chars().any(|c| c.is_control()) {
            return Err(AppError::bad_request(
                "Username contains invalid control characters",
            ));
        }

        Ok(Self(username))
    }

    /// Create from database value (assumed already validated)
    pub fn from_db(username: impl Into<String>) -> Self {
        Self(username.into())
    }

    /// Get the username as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Username {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
