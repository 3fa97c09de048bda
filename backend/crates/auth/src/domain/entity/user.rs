//! User Entity
//!
//! The identity record owned by the credential store: profile fields,
//! credential hash, role, and activation state. Responses never expose
//! the hash; see the redacted view in the presentation layer.

use chrono::{DateTime, Utc};
use platform::password::HashedPassword;

use crate::domain::value_object::{email::Email, user_id::UserId, user_role::UserRole, username::Username};

/// User entity
#[derive(Debug, Clone)]
pub struct User {
    /// Internal UUID identifier
    pub user_id: UserId,
    /// Display name (not unique)
    pub username: Username,
    /// Email address (unique, used for login)
    pub email: Email,
    /// Argon2id hash of the password (PHC string)
    pub password_hash: HashedPassword,
    /// Avatar image URL, if one was uploaded
    pub avatar_url: Option<String>,
    /// Role (User, Researcher, Admin)
    pub role: UserRole,
    /// Whether the activation link has been followed
    pub is_activated: bool,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with the default role, pending activation
    pub fn new(username: Username, email: Email, password_hash: HashedPassword) -> Self {
        let now = Utc::now();

        Self {
            user_id: UserId::new(),
            username,
            email,
            password_hash,
            avatar_url: None,
            role: UserRole::default(),
            is_activated: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Mark the account as activated
    pub fn activate(&mut self) {
        self.is_activated = true;
        self.touch();
    }

    /// Update user role
    pub fn set_role(&mut self, role: UserRole) {
        self.role = role;
        self.touch();
    }

    /// Update email
    ///
    /// A changed address has not been proven reachable, so activation
    /// state resets until the new link is followed.
    pub fn set_email(&mut self, email: Email) {
        self.email = email;
        self.is_activated = false;
        self.touch();
    }

    /// Update username
    pub fn set_username(&mut self, username: Username) {
        self.username = username;
        self.touch();
    }

    /// Update avatar URL
    pub fn set_avatar_url(&mut self, avatar_url: Option<String>) {
        self.avatar_url = avatar_url;
        self.touch();
    }

    /// Replace the password hash
    pub fn set_password_hash(&mut self, password_hash: HashedPassword) {
        self.password_hash = password_hash;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
