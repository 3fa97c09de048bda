//! Login Use Case
//!
//! Authenticates credentials and opens a fresh session, displacing any
//! previous one (single active session per user).

use std::sync::Arc;

use platform::password::ClearTextPassword;

use crate::application::IssuedSession;
use crate::application::token::TokenCodec;
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::domain::value_object::email::Email;
use crate::error::{AuthError, AuthResult};

/// Login input
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Login use case
pub struct LoginUseCase<U, S>
where
    U: UserRepository,
    S: SessionRepository,
{
    user_repo: Arc<U>,
    session_repo: Arc<S>,
    codec: Arc<TokenCodec>,
}

impl<U, S> LoginUseCase<U, S>
where
    U: UserRepository,
    S: SessionRepository,
{
    pub fn new(user_repo: Arc<U>, session_repo: Arc<S>, codec: Arc<TokenCodec>) -> Self {
        Self {
            user_repo,
            session_repo,
            codec,
        }
    }

    /// The response never distinguishes "unknown email" from "wrong
    /// password"; the distinction exists only in logs.
    pub async fn execute(&self, input: LoginInput) -> AuthResult<IssuedSession> {
        let email = match Email::new(input.email) {
            Ok(email) => email,
            Err(_) => {
                tracing::debug!("Login attempt with malformed email");
                return Err(AuthError::InvalidCredentials);
            }
        };

        let Some(user) = self.user_repo.find_by_email(&email).await? else {
            tracing::debug!(email = %email, "Login attempt for unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        let password = match ClearTextPassword::new(input.password) {
            Ok(password) => password,
            Err(_) => {
                // A password that fails policy can't match a stored hash
                tracing::debug!(user_id = %user.user_id, "Login attempt with out-of-policy password");
                return Err(AuthError::InvalidCredentials);
            }
        };

        if !user.password_hash.verify(&password) {
            tracing::debug!(user_id = %user.user_id, "Login attempt with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let access_token = self.codec.issue_access(&user)?;
        let refresh_token = self.codec.issue_refresh(&user.user_id)?;

        // Overwrites any prior record: the old refresh token dies here
        self.session_repo.put(&user.user_id, &refresh_token).await?;

        tracing::info!(user_id = %user.user_id, "User logged in");

        Ok(IssuedSession {
            access_token,
            refresh_token,
            user,
        })
    }
}
