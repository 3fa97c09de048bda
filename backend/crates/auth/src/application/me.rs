//! Current User Use Case
//!
//! Resolves the identity named by a verified access token.

use std::sync::Arc;

use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::user_id::UserId;
use crate::error::{AuthError, AuthResult};

/// Current user use case
pub struct MeUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
}

impl<U> MeUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>) -> Self {
        Self { user_repo }
    }

    /// A valid token for a since-deleted user reads as unauthenticated
    pub async fn execute(&self, user_id: &UserId) -> AuthResult<User> {
        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::Unauthenticated)
    }
}
