//! Logout Use Case
//!
//! Revokes server-side session state. Removal is what ends the session;
//! the cleared cookie is a courtesy. Idempotent: logging out twice, or
//! with an expired or unparseable token, still succeeds.

use std::sync::Arc;

use crate::application::token::TokenCodec;
use crate::domain::repository::SessionRepository;
use crate::domain::value_object::user_id::UserId;
use crate::error::AuthResult;

/// Logout use case
pub struct LogoutUseCase<S>
where
    S: SessionRepository,
{
    session_repo: Arc<S>,
    codec: Arc<TokenCodec>,
}

impl<S> LogoutUseCase<S>
where
    S: SessionRepository,
{
    pub fn new(session_repo: Arc<S>, codec: Arc<TokenCodec>) -> Self {
        Self {
            session_repo,
            codec,
        }
    }

    pub async fn execute(&self, presented: Option<&str>) -> AuthResult<()> {
        let Some(presented) = presented else {
            return Ok(());
        };

        // Even an expired token still names the identity whose record
        // must go, so a racing refresh cannot win after logout
        let Some(claims) = self.codec.peek_refresh(presented) else {
            tracing::debug!("Logout with an unparseable refresh token");
            return Ok(());
        };

        let user_id = UserId::from_uuid(claims.sub);
        self.session_repo.remove(&user_id).await?;

        tracing::info!(user_id = %user_id, "User logged out");

        Ok(())
    }
}
