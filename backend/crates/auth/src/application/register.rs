//! Registration Use Case
//!
//! Creates an account, issues the activation ticket, and opens the
//! first session.

use std::sync::Arc;

use platform::password::ClearTextPassword;

use crate::application::IssuedSession;
use crate::application::config::AuthConfig;
use crate::application::token::TokenCodec;
use crate::domain::entity::user::User;
use crate::domain::repository::{
    ActivationNotifier, ActivationRepository, SessionRepository, UserRepository,
};
use crate::domain::value_object::{email::Email, username::Username};
use crate::error::{AuthError, AuthResult};

/// Registration input
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Registration use case
pub struct RegisterUseCase<U, S, A, N>
where
    U: UserRepository,
    S: SessionRepository,
    A: ActivationRepository,
    N: ActivationNotifier,
{
    user_repo: Arc<U>,
    session_repo: Arc<S>,
    activation_repo: Arc<A>,
    notifier: Arc<N>,
    codec: Arc<TokenCodec>,
    config: Arc<AuthConfig>,
}

impl<U, S, A, N> RegisterUseCase<U, S, A, N>
where
    U: UserRepository,
    S: SessionRepository,
    A: ActivationRepository,
    N: ActivationNotifier,
{
    pub fn new(
        user_repo: Arc<U>,
        session_repo: Arc<S>,
        activation_repo: Arc<A>,
        notifier: Arc<N>,
        codec: Arc<TokenCodec>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            activation_repo,
            notifier,
            codec,
            config,
        }
    }

    pub async fn execute(&self, input: RegisterInput) -> AuthResult<IssuedSession> {
        let username = Username::new(input.username)?;
        let email = Email::new(input.email)?;

        if self.user_repo.exists_by_email(&email).await? {
            return Err(AuthError::EmailTaken);
        }

        let password = ClearTextPassword::new(input.password)
            .map_err(|e| AuthError::Validation(e.to_string()))?;
        let password_hash = password
            .hash()
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        let user = User::new(username, email, password_hash);
        self.user_repo.create(&user).await?;

        // Dispatch failure must not roll back the registration; the
        // link can be resent out-of-band
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
                "Failed to dispatch activation link"
            );
        }

        let access_token = self.codec.issue_access(&user)?;
        let refresh_token = self.codec.issue_refresh(&user.user_id)?;
        self.session_repo.put(&user.user_id, &refresh_token).await?;

        tracing::info!(user_id = %user.user_id, "User registered");

        Ok(IssuedSession {
            access_token,
            refresh_token,
            user,
        })
    }
}
