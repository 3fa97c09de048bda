//! Activation Use Case
//!
//! Consumes a one-time activation ticket and flips the account's
//! activation flag. Ends in a redirect, not a session; no tokens are
//! issued here.

use std::sync::Arc;

use crate::domain::repository::{ActivationRepository, UserRepository};
use crate::domain::value_object::activation_ticket::ActivationTicket;
use crate::error::{AuthError, AuthResult};

/// Activation use case
pub struct ActivateUseCase<U, A>
where
    U: UserRepository,
    A: ActivationRepository,
{
    user_repo: Arc<U>,
    activation_repo: Arc<A>,
}

impl<U, A> ActivateUseCase<U, A>
where
    U: UserRepository,
    A: ActivationRepository,
{
    pub fn new(user_repo: Arc<U>, activation_repo: Arc<A>) -> Self {
        Self {
            user_repo,
            activation_repo,
        }
    }

    pub async fn execute(&self, raw_ticket: &str) -> AuthResult<()> {
        let ticket = ActivationTicket::from_raw(raw_ticket);

        let user_id = self
            .activation_repo
            .consume(&ticket)
            .await?
            .ok_or(AuthError::ActivationTicketUnknown)?;

        let Some(mut user) = self.user_repo.find_by_id(&user_id).await? else {
            tracing::warn!(user_id = %user_id, "Activation ticket named a missing user");
            return Err(AuthError::ActivationTicketUnknown);
        };

        user.activate();
        self.user_repo.update(&user).await?;

        tracing::info!(user_id = %user.user_id, "Account activated");

        Ok(())
    }
}
