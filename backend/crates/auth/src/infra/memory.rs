//! In-Memory Repository Implementation
//!
//! Backs the protocol tests and local development without Postgres.
//! All maps live behind one async mutex, which gives the same
//! per-identity linearizability the Postgres statements provide.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::entity::user::User;
use crate::domain::repository::{ActivationRepository, SessionRepository, UserRepository};
use crate::domain::value_object::{
    activation_ticket::ActivationTicket, email::Email, user_id::UserId,
};
use crate::error::{AuthError, AuthResult};

#[derive(Default)]
struct MemoryState {
    users: HashMap<Uuid, User>,
    sessions: HashMap<Uuid, String>,
    tickets: HashMap<String, Uuid>,
}

/// In-memory auth repository
#[derive(Clone, Default)]
pub struct MemoryAuthRepository {
    inner: Arc<Mutex<MemoryState>>,
}

impl MemoryAuthRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserRepository for MemoryAuthRepository {
    async fn create(&self, user: &User) -> AuthResult<()> {
        let mut state = self.inner.lock().await;

        // Mirror the unique constraint on users.email
        if state.users.values().any(|u| u.email == user.email) {
            return Err(AuthError::EmailTaken);
        }

        state.users.insert(*user.user_id.as_uuid(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        let state = self.inner.lock().await;
        Ok(state.users.get(user_id.as_uuid()).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        let state = self.inner.lock().await;
        Ok(state.users.values().find(|u| &u.email == email).cloned())
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        let state = self.inner.lock().await;
        Ok(state.users.values().any(|u| &u.email == email))
    }

    async fn update(&self, user: &User) -> AuthResult<()> {
        let mut state = self.inner.lock().await;
        state.users.insert(*user.user_id.as_uuid(), user.clone());
        Ok(())
    }
}

impl SessionRepository for MemoryAuthRepository {
    async fn put(&self, user_id: &UserId, token: &str) -> AuthResult<()> {
        let mut state = self.inner.lock().await;
        state.sessions.insert(*user_id.as_uuid(), token.to_string());
        Ok(())
    }

    async fn get(&self, user_id: &UserId) -> AuthResult<Option<String>> {
        let state = self.inner.lock().await;
        Ok(state.sessions.get(user_id.as_uuid()).cloned())
    }

    async fn replace(&self, user_id: &UserId, current: &str, fresh: &str) -> AuthResult<bool> {
        // Compare and swap under the same lock
        let mut state = self.inner.lock().await;
        match state.sessions.get_mut(user_id.as_uuid()) {
            Some(stored) if stored == current => {
                *stored = fresh.to_string();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn remove(&self, user_id: &UserId) -> AuthResult<()> {
        let mut state = self.inner.lock().await;
        state.sessions.remove(user_id.as_uuid());
        Ok(())
    }
}

impl ActivationRepository for MemoryAuthRepository {
    async fn create(&self, user_id: &UserId) -> AuthResult<ActivationTicket> {
        let ticket = ActivationTicket::new();
        let mut state = self.inner.lock().await;
        state
            .tickets
            .insert(ticket.as_str().to_string(), *user_id.as_uuid());
        Ok(ticket)
    }

    async fn consume(&self, ticket: &ActivationTicket) -> AuthResult<Option<UserId>> {
        let mut state = self.inner.lock().await;
        Ok(state.tickets.remove(ticket.as_str()).map(UserId::from_uuid))
    }
}
