//! Refresh Use Case
//!
//! Rotates the session: a presented refresh token is accepted at most
//! once, and a fresh pair replaces it in the same step. A leaked token's
//! blast radius is bounded to a single use.

use std::sync::Arc;

use crate::application::IssuedSession;
use crate::application::token::TokenCodec;
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::domain::value_object::user_id::UserId;
use crate::error::{AuthError, AuthResult};

/// Refresh use case
pub struct RefreshUseCase<U, S>
where
    U: UserRepository,
    S: SessionRepository,
{
    user_repo: Arc<U>,
    session_repo: Arc<S>,
    codec: Arc<TokenCodec>,
}

impl<U, S> RefreshUseCase<U, S>
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

    pub async fn execute(&self, presented: Option<&str>) -> AuthResult<IssuedSession> {
        let presented = presented.ok_or(AuthError::Unauthenticated)?;

        let claims = self.codec.verify_refresh(presented).map_err(|e| {
            tracing::debug!(error = %e, "Refresh token failed verification");
            AuthError::Unauthenticated
        })?;
        let user_id = UserId::from_uuid(claims.sub);

        let Some(user) = self.user_repo.find_by_id(&user_id).await? else {
            tracing::debug!(user_id = %user_id, "Refresh for a deleted user");
            return Err(AuthError::Unauthenticated);
        };

        let access_token = self.codec.issue_access(&user)?;
        let refresh_token = self.codec.issue_refresh(&user.user_id)?;

        // Accepts the presented token only while it is still the live
        // record; a concurrent rotation or a logout makes this fail.
        // Exactly one of two racing refreshes gets through.
        let rotated = self
            .session_repo
            .replace(&user_id, presented, &refresh_token)
            .await?;

        if !rotated {
            tracing::warn!(user_id = %user_id, "Refresh with a superseded or revoked token");
            return Err(AuthError::Unauthenticated);
        }

        tracing::debug!(user_id = %user_id, "Session rotated");

        Ok(IssuedSession {
            access_token,
            refresh_token,
            user,
        })
    }
}
