//! PostgreSQL Repository Implementations
//!
//! Every store call runs under a bounded timeout; an elapsed timeout
//! surfaces as `StoreUnavailable`, never as an authentication failure.
//! Single-row statements give the per-identity linearizability the
//! session store requires.

use chrono::Utc;
use sqlx::PgPool;
use std::future::Future;
use std::time::Duration;
use uuid::Uuid;

use crate::domain::entity::user::User;
use crate::domain::repository::{
    ActivationRepository, SessionRepository, UserRepository,
};
use crate::domain::value_object::{
    activation_ticket::ActivationTicket, email::Email, user_id::UserId, user_role::UserRole,
    username::Username,
};
use crate::error::{AuthError, AuthResult};
use platform::password::HashedPassword;

/// PostgreSQL-backed auth repository
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
    timeout: Duration,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    /// Run a query under the configured timeout
    async fn bounded<T>(
        &self,
        fut: impl Future<Output = Result<T, sqlx::Error>>,
    ) -> AuthResult<T> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => Err(AuthError::from(err)),
            Err(_) => {
                tracing::warn!(timeout = ?self.timeout, "Store call timed out");
                Err(AuthError::StoreUnavailable)
            }
        }
    }

    /// Delete session rows whose record has outlived the refresh TTL
    ///
    /// Rows like these are already unusable (the token inside is
    /// expired); this is startup hygiene, not revocation.
    pub async fn cleanup_stale_sessions(&self, refresh_ttl: Duration) -> AuthResult<u64> {
        let ttl = chrono::Duration::from_std(refresh_ttl)
            .map_err(|e| AuthError::Internal(format!("Invalid refresh TTL: {e}")))?;
        let cutoff = Utc::now() - ttl;

        let deleted = self
            .bounded(
                sqlx::query("DELETE FROM refresh_sessions WHERE updated_at < $1")
                    .bind(cutoff)
                    .execute(&self.pool),
            )
            .await?
            .rows_affected();

        tracing::info!(sessions_deleted = deleted, "Cleaned up stale refresh sessions");

        Ok(deleted)
    }
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgAuthRepository {
    async fn create(&self, user: &User) -> AuthResult<()> {
        self.bounded(
            sqlx::query(
                r#"
                INSERT INTO users (
                    user_id,
                    username,
                    email,
                    password_hash,
                    avatar_url,
                    role,
                    is_activated,
                    created_at,
                    updated_at
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                "#,
            )
            .bind(user.user_id.as_uuid())
            .bind(user.username.as_str())
            .bind(user.email.as_str())
            .bind(user.password_hash.as_phc_string())
            .bind(&user.avatar_url)
            .bind(user.role.id())
            .bind(user.is_activated)
            .bind(user.created_at)
            .bind(user.updated_at)
            .execute(&self.pool),
        )
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        let row = self
            .bounded(
                sqlx::query_as::<_, UserRow>(
                    r#"
                    SELECT
                        user_id,
                        username,
                        email,
                        password_hash,
                        avatar_url,
                        role,
                        is_activated,
                        created_at,
                        updated_at
                    FROM users
                    WHERE user_id = $1
                    "#,
                )
                .bind(user_id.as_uuid())
                .fetch_optional(&self.pool),
            )
            .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        let row = self
            .bounded(
                sqlx::query_as::<_, UserRow>(
                    r#"
                    SELECT
                        user_id,
                        username,
                        email,
                        password_hash,
                        avatar_url,
                        role,
                        is_activated,
                        created_at,
                        updated_at
                    FROM users
                    WHERE email = $1
                    "#,
                )
                .bind(email.as_str())
                .fetch_optional(&self.pool),
            )
            .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        self.bounded(
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(email.as_str())
                .fetch_one(&self.pool),
        )
        .await
    }

    async fn update(&self, user: &User) -> AuthResult<()> {
        self.bounded(
            sqlx::query(
                r#"
                UPDATE users SET
                    username = $2,
                    email = $3,
                    password_hash = $4,
                    avatar_url = $5,
                    role = $6,
                    is_activated = $7,
                    updated_at = $8
                WHERE user_id = $1
                "#,
            )
            .bind(user.user_id.as_uuid())
            .bind(user.username.as_str())
            .bind(user.email.as_str())
            .bind(user.password_hash.as_phc_string())
            .bind(&user.avatar_url)
            .bind(user.role.id())
            .bind(user.is_activated)
            .bind(user.updated_at)
            .execute(&self.pool),
        )
        .await?;

        Ok(())
    }
}

// ============================================================================
// Session Repository Implementation
// ============================================================================

impl SessionRepository for PgAuthRepository {
    async fn put(&self, user_id: &UserId, token: &str) -> AuthResult<()> {
        let now = Utc::now();

        // Single-row upsert: overwrite is atomic per user
        self.bounded(
            sqlx::query(
                r#"
                INSERT INTO refresh_sessions (user_id, token, created_at, updated_at)
                VALUES ($1, $2, $3, $3)
                ON CONFLICT (user_id)
                DO UPDATE SET token = EXCLUDED.token, updated_at = EXCLUDED.updated_at
                "#,
            )
            .bind(user_id.as_uuid())
            .bind(token)
            .bind(now)
            .execute(&self.pool),
        )
        .await?;

        Ok(())
    }

    async fn get(&self, user_id: &UserId) -> AuthResult<Option<String>> {
        self.bounded(
            sqlx::query_scalar::<_, String>(
                "SELECT token FROM refresh_sessions WHERE user_id = $1",
            )
            .bind(user_id.as_uuid())
            .fetch_optional(&self.pool),
        )
        .await
    }

    async fn replace(&self, user_id: &UserId, current: &str, fresh: &str) -> AuthResult<bool> {
        // Compare-and-swap on the token value; the WHERE clause is the
        // comparison and the row lock makes it atomic
        let updated = self
            .bounded(
                sqlx::query(
                    r#"
                    UPDATE refresh_sessions
                    SET token = $3, updated_at = $4
                    WHERE user_id = $1 AND token = $2
                    "#,
                )
                .bind(user_id.as_uuid())
                .bind(current)
                .bind(fresh)
                .bind(Utc::now())
                .execute(&self.pool),
            )
            .await?
            .rows_affected();

        Ok(updated == 1)
    }

    async fn remove(&self, user_id: &UserId) -> AuthResult<()> {
        self.bounded(
            sqlx::query("DELETE FROM refresh_sessions WHERE user_id = $1")
                .bind(user_id.as_uuid())
                .execute(&self.pool),
        )
        .await?;

        Ok(())
    }
}

// ============================================================================
// Activation Repository Implementation
// ============================================================================

impl ActivationRepository for PgAuthRepository {
    async fn create(&self, user_id: &UserId) -> AuthResult<ActivationTicket> {
        let ticket = ActivationTicket::new();

        self.bounded(
            sqlx::query(
                r#"
                INSERT INTO activation_tickets (ticket, user_id, created_at)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(ticket.as_str())
            .bind(user_id.as_uuid())
            .bind(Utc::now())
            .execute(&self.pool),
        )
        .await?;

        Ok(ticket)
    }

    async fn consume(&self, ticket: &ActivationTicket) -> AuthResult<Option<UserId>> {
        // DELETE ... RETURNING: at most one caller gets the row back
        let user_id = self
            .bounded(
                sqlx::query_scalar::<_, Uuid>(
                    "DELETE FROM activation_tickets WHERE ticket = $1 RETURNING user_id",
                )
                .bind(ticket.as_str())
                .fetch_optional(&self.pool),
            )
            .await?;

        Ok(user_id.map(UserId::from_uuid))
    }
}

// ============================================================================
// Row Types for sqlx mapping
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: Uuid,
    username: String,
    email: String,
    password_hash: String,
    avatar_url: Option<String>,
    role: i16,
    is_activated: bool,
    created_at: chrono::DateTime<Utc>,
    updated_at: chrono::DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> AuthResult<User> {
        let role = UserRole::from_id(self.role)
            .ok_or_else(|| AuthError::Internal(format!("Invalid role id: {}", self.role)))?;

        let password_hash = HashedPassword::from_phc_string(self.password_hash)
            .map_err(|e| AuthError::Internal(format!("Invalid password hash: {e}")))?;

        Ok(User {
            user_id: UserId::from_uuid(self.user_id),
            username: Username::from_db(self.username),
            email: Email::from_db(self.email),
            password_hash,
            avatar_url: self.avatar_url,
            role,
            is_activated: self.is_activated,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
