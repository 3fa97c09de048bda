//! API DTOs (Data Transfer Objects)

use serde::{Deserialize, Serialize};

use crate::domain::entity::user::User;

// ============================================================================
// Requests
// ============================================================================

/// Registration request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Login request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Profile update request; absent fields stay untouched
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub password: Option<String>,
}

/// Role change request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRoleRequest {
    /// Role code: "user", "researcher", or "admin"
    pub role: String,
}

// ============================================================================
// Responses
// ============================================================================

/// Redacted user projection; never carries the password hash
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: String,
    pub username: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub role: String,
    pub is_activated: bool,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.user_id.to_string(),
            username: user.username.as_str().to_string(),
            email: user.email.as_str().to_string(),
            avatar_url: user.avatar_url.clone(),
            role: user.role.code().to_string(),
            is_activated: user.is_activated,
        }
    }
}

/// Body of every token-issuing response
///
/// The refresh token travels in the HTTP-only cookie, never here.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub user: UserView,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::{email::Email, username::Username};
    use platform::password::ClearTextPassword;

    #[test]
    fn test_user_view_redacts_password_hash() {
        let password = ClearTextPassword::new("correct horse battery".to_string()).unwrap();
        let user = User::new(
            Username::new("alice").unwrap(),
            Email::new("alice@example.com").unwrap(),
            password.hash().unwrap(),
        );

        let view = UserView::from(&user);
        let json = serde_json::to_string(&view).unwrap();

        assert!(json.contains("\"isActivated\":false"));
        assert!(json.contains("\"role\":\"user\""));
        assert!(!json.contains("argon2"));
    }
}
