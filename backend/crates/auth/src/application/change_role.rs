//! Role Change Use Case
//!
//! Administrator-only role updates (e.g., approving a researcher
//! application).

use std::sync::Arc;

use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{user_id::UserId, user_role::UserRole};
use crate::error::{AuthError, AuthResult};

/// Role change use case
pub struct ChangeRoleUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
}

impl<U> ChangeRoleUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>) -> Self {
        Self { user_repo }
    }

    /// Fails with `Forbidden` for any non-admin actor, regardless of
    /// target or requested role.
    pub async fn execute(
        &self,
        actor_role: UserRole,
        target: &UserId,
        new_role: UserRole,
    ) -> AuthResult<User> {
        if !actor_role.is_admin() {
            return Err(AuthError::Forbidden);
        }

        let Some(mut user) = self.user_repo.find_by_id(target).await? else {
            return Err(AuthError::Validation("No such user".to_string()));
        };

        user.set_role(new_role);
        self.user_repo.update(&user).await?;

        tracing::info!(user_id = %user.user_id, role = %new_role, "User role changed");

        Ok(user)
    }
}
