//! Profile Update Use Case
//!
//! Partial update of the caller's own record. An email change re-enters
//! the activation handshake; a password change re-hashes.

use std::sync::Arc;

use platform::password::ClearTextPassword;

use crate::application::config::AuthConfig;
use crate::domain::entity::user::User;
use crate::domain::repository::{ActivationNotifier, ActivationRepository, UserRepository};
use crate::domain::value_object::{email::Email, user_id::UserId, username::Username};
use crate::error::{AuthError, AuthResult};

/// Profile update input; absent fields stay untouched
#[derive(Default)]
pub struct UpdateProfileInput {
    pub username: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub password: Option<String>,
}

/// Profile update use case
pub struct UpdateProfileUseCase<U, A, N>
where
    U: UserRepository,
    A: ActivationRepository,
    N: ActivationNotifier,
{
    user_repo: Arc<U>,
    activation_repo: Arc<A>,
    notifier: Arc<N>,
    config: Arc<AuthConfig>,
}

impl<U, A, N> UpdateProfileUseCase<U, A, N>
where
    U: UserRepository,
    A: ActivationRepository,
    N: ActivationNotifier,
{
    pub fn new(
        user_repo: Arc<U>,
        activation_repo: Arc<A>,
        notifier: Arc<N>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            user_repo,
            activation_repo,
            notifier,
            config,
        }
    }

    pub async fn execute(
        &self,
        user_id: &UserId,
        input: UpdateProfileInput,
    ) -> AuthResult<User> {
        let Some(mut user) = self.user_repo.find_by_id(user_id).await? else {
            return Err(AuthError::Unauthenticated);
        };

        let mut email_changed = false;

        if let Some(email) = input.email {
            let email = Email::new(email)?;
            if email != user.email {
                if self.user_repo.exists_by_email(&email).await? {
                    return Err(AuthError::EmailTaken);
                }
                user.set_email(email);
                email_changed = true;
            }
        }

        if let Some(username) = input.username {
            user.set_username(Username::new(username)?);
        }

        if let Some(avatar_url) = input.avatar_url {
            user.set_avatar_url(Some(avatar_url));
        }

        if let Some(password) = input.password {
            let password = ClearTextPassword::new(password)
                .map_err(|e| AuthError::Validation(e.to_string()))?;
            let password_hash = password
                .hash()
                .map_err(|e| AuthError::Internal(e.to_string()))?;
            user.set_password_hash(password_hash);
        }

        self.user_repo.update(&user).await?;

        // The new address must be proven reachable before the account
        // counts as activated again
        if email_changed {
            let ticket = self.activation_repo.create(&user.user_id).await?;
            let activation_url = format!(
                "{}/{}",
                self.config.activation_base_url.trim_end_matches('/'),
                ticket.as_str()
            );
            if let Err(e) = self.notifier.send_activation(&user.email, &activation_url).await {
                tracing::warn!(
                    user_id = %user.user_id,
                    error = %e,
                    "Failed to dispatch activation link after email change"
                );
            }
        }

        tracing::info!(user_id = %user.user_id, "Profile updated");

        Ok(user)
    }
}
