//! Protocol tests for the auth crate
//!
//! The full registration / login / activation / refresh / logout
//! protocols, exercised against the in-memory repositories.

#[cfg(test)]
mod protocol_tests {
    use std::sync::Arc;

    use crate::application::config::AuthConfig;
    use crate::application::token::TokenCodec;
    use crate::application::{
        ActivateUseCase, ChangeRoleUseCase, IssuedSession, LoginInput, LoginUseCase,
        LogoutUseCase, MeUseCase, RefreshUseCase, RegisterInput, RegisterUseCase,
        UpdateProfileInput, UpdateProfileUseCase,
    };
    use crate::domain::repository::{ActivationRepository, SessionRepository, UserRepository};
    use crate::domain::value_object::{
        activation_ticket::ActivationTicket, user_id::UserId, user_role::UserRole,
    };
    use crate::error::{AuthError, AuthResult};
    use crate::infra::memory::MemoryAuthRepository;
    use crate::infra::notifier::LogActivationNotifier;

    const PASSWORD: &str = "correct horse battery";

    struct Harness {
        repo: Arc<MemoryAuthRepository>,
        notifier: Arc<LogActivationNotifier>,
        codec: Arc<TokenCodec>,
        config: Arc<AuthConfig>,
    }

    impl Harness {
        fn new() -> Self {
            let config = AuthConfig::with_random_secrets();
            let codec = Arc::new(TokenCodec::new(&config));
            Self {
                repo: Arc::new(MemoryAuthRepository::new()),
                notifier: Arc::new(LogActivationNotifier),
                codec,
                config: Arc::new(config),
            }
        }

        async fn register(&self, username: &str, email: &str) -> AuthResult<IssuedSession> {
            RegisterUseCase::new(
                self.repo.clone(),
                self.repo.clone(),
                self.repo.clone(),
                self.notifier.clone(),
                self.codec.clone(),
                self.config.clone(),
            )
            .execute(RegisterInput {
                username: username.to_string(),
                email: email.to_string(),
                password: PASSWORD.to_string(),
            })
            .await
        }

        async fn login(&self, email: &str, password: &str) -> AuthResult<IssuedSession> {
            LoginUseCase::new(self.repo.clone(), self.repo.clone(), self.codec.clone())
                .execute(LoginInput {
                    email: email.to_string(),
                    password: password.to_string(),
                })
                .await
        }

        async fn refresh(&self, token: Option<&str>) -> AuthResult<IssuedSession> {
            RefreshUseCase::new(self.repo.clone(), self.repo.clone(), self.codec.clone())
                .execute(token)
                .await
        }

        async fn logout(&self, token: Option<&str>) -> AuthResult<()> {
            LogoutUseCase::new(self.repo.clone(), self.codec.clone())
                .execute(token)
                .await
        }

        async fn activate(&self, ticket: &str) -> AuthResult<()> {
            ActivateUseCase::new(self.repo.clone(), self.repo.clone())
                .execute(ticket)
                .await
        }

        /// Mint a ticket the test can see; `create` needs the trait
        /// spelled out because the repo also implements the user-side
        /// `create`
        async fn mint_ticket(&self, user_id: &UserId) -> ActivationTicket {
            ActivationRepository::create(self.repo.as_ref(), user_id)
                .await
                .unwrap()
        }
    }

    // ========================================================================
    // Registration and login
    // ========================================================================

    #[tokio::test]
    async fn test_register_then_login_rotates_session() {
        let h = Harness::new();

        let registered = h.register("alice", "alice@example.com").await.unwrap();
        let logged_in = h.login("alice@example.com", PASSWORD).await.unwrap();

        // Single-session overwrite: login displaced the registration session
        assert_ne!(registered.refresh_token, logged_in.refresh_token);

        let err = h.refresh(Some(&registered.refresh_token)).await.unwrap_err();
        assert!(matches!(err, AuthError::Unauthenticated));

        assert!(h.refresh(Some(&logged_in.refresh_token)).await.is_ok());
    }

    #[tokio::test]
    async fn test_register_duplicate_email_fails() {
        let h = Harness::new();

        h.register("alice", "alice@example.com").await.unwrap();
        let err = h.register("alice2", "alice@example.com").await.unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken));
    }

    #[tokio::test]
    async fn test_registered_user_starts_unactivated_with_default_role() {
        let h = Harness::new();

        let session = h.register("alice", "alice@example.com").await.unwrap();
        assert!(!session.user.is_activated);
        assert_eq!(session.user.role, UserRole::User);
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let h = Harness::new();

        h.register("alice", "alice@example.com").await.unwrap();

        let wrong_password = h
            .login("alice@example.com", "not the password")
            .await
            .unwrap_err();
        let unknown_email = h.login("bob@example.com", PASSWORD).await.unwrap_err();

        assert!(matches!(wrong_password, AuthError::InvalidCredentials));
        assert!(matches!(unknown_email, AuthError::InvalidCredentials));
        // Same kind, same message: the caller learns nothing extra
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
        assert_eq!(wrong_password.kind(), unknown_email.kind());
    }

    // ========================================================================
    // Refresh rotation
    // ========================================================================

    #[tokio::test]
    async fn test_refresh_token_is_single_use() {
        let h = Harness::new();

        let r1 = h
            .register("alice", "alice@example.com")
            .await
            .unwrap()
            .refresh_token;

        let r2 = h.refresh(Some(&r1)).await.unwrap().refresh_token;
        assert_ne!(r1, r2);

        // R1 is superseded: a second use must fail
        let err = h.refresh(Some(&r1)).await.unwrap_err();
        assert!(matches!(err, AuthError::Unauthenticated));

        // R2 is the live record and works exactly once
        let r3 = h.refresh(Some(&r2)).await.unwrap().refresh_token;
        assert_ne!(r2, r3);
    }

    #[tokio::test]
    async fn test_refresh_without_token_fails() {
        let h = Harness::new();
        let err = h.refresh(None).await.unwrap_err();
        assert!(matches!(err, AuthError::Unauthenticated));
    }

    #[tokio::test]
    async fn test_refresh_with_garbage_token_fails() {
        let h = Harness::new();
        let err = h.refresh(Some("not.a.token")).await.unwrap_err();
        assert!(matches!(err, AuthError::Unauthenticated));
    }

    #[tokio::test]
    async fn test_refresh_with_foreign_signed_token_fails() {
        let h = Harness::new();
        h.register("alice", "alice@example.com").await.unwrap();

        // Same claims shape, different secret
        let foreign = Harness::new();
        let stranger = foreign.register("mallory", "mallory@example.com").await.unwrap();

        let err = h.refresh(Some(&stranger.refresh_token)).await.unwrap_err();
        assert!(matches!(err, AuthError::Unauthenticated));
    }

    #[tokio::test]
    async fn test_concurrent_refresh_exactly_one_wins() {
        let h = Harness::new();

        let r1 = h
            .register("alice", "alice@example.com")
            .await
            .unwrap()
            .refresh_token;

        let (a, b) = tokio::join!(h.refresh(Some(&r1)), h.refresh(Some(&r1)));

        let successes = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
        assert_eq!(successes, 1, "exactly one concurrent rotation may succeed");

        // The loser saw Unauthenticated, not a server error
        let loser = if a.is_ok() { b } else { a };
        assert!(matches!(loser.unwrap_err(), AuthError::Unauthenticated));
    }

    // ========================================================================
    // Logout
    // ========================================================================

    #[tokio::test]
    async fn test_logout_revokes_refresh_token() {
        let h = Harness::new();

        let session = h.register("alice", "alice@example.com").await.unwrap();
        let user_id = session.user.user_id;
        let r1 = session.refresh_token;

        // The store holds exactly the issued token
        assert_eq!(h.repo.get(&user_id).await.unwrap().as_deref(), Some(r1.as_str()));

        h.logout(Some(&r1)).await.unwrap();

        // Server-side revocation: the record is gone, not just the cookie
        assert_eq!(h.repo.get(&user_id).await.unwrap(), None);

        let err = h.refresh(Some(&r1)).await.unwrap_err();
        assert!(matches!(err, AuthError::Unauthenticated));
    }

    #[tokio::test]
    async fn test_logout_is_idempotent() {
        let h = Harness::new();

        let r1 = h
            .register("alice", "alice@example.com")
            .await
            .unwrap()
            .refresh_token;

        h.logout(Some(&r1)).await.unwrap();
        h.logout(Some(&r1)).await.unwrap();

        // Missing or unparseable tokens are no-op successes
        h.logout(None).await.unwrap();
        h.logout(Some("complete garbage")).await.unwrap();
    }

    // ========================================================================
    // Activation
    // ========================================================================

    #[tokio::test]
    async fn test_activation_ticket_is_single_use() {
        let h = Harness::new();

        let user = h.register("alice", "alice@example.com").await.unwrap().user;

        // Registration already issued one ticket through the notifier;
        // this one is visible to the test
        let ticket = h.mint_ticket(&user.user_id).await;

        h.activate(ticket.as_str()).await.unwrap();

        let activated = h.repo.find_by_id(&user.user_id).await.unwrap().unwrap();
        assert!(activated.is_activated);

        // Second consume of the same ticket must fail
        let err = h.activate(ticket.as_str()).await.unwrap_err();
        assert!(matches!(err, AuthError::ActivationTicketUnknown));
    }

    #[tokio::test]
    async fn test_activation_with_unknown_ticket_fails() {
        let h = Harness::new();
        let err = h.activate("never-issued").await.unwrap_err();
        assert!(matches!(err, AuthError::ActivationTicketUnknown));
    }

    // ========================================================================
    // Role change
    // ========================================================================

    #[tokio::test]
    async fn test_role_change_requires_admin() {
        let h = Harness::new();

        let target = h.register("alice", "alice@example.com").await.unwrap().user;
        let use_case = ChangeRoleUseCase::new(h.repo.clone());

        for actor in [UserRole::User, UserRole::Researcher] {
            let err = use_case
                .execute(actor, &target.user_id, UserRole::Researcher)
                .await
                .unwrap_err();
            assert!(matches!(err, AuthError::Forbidden));
        }

        let updated = use_case
            .execute(UserRole::Admin, &target.user_id, UserRole::Researcher)
            .await
            .unwrap();
        assert_eq!(updated.role, UserRole::Researcher);
    }

    // ========================================================================
    // Current user and profile
    // ========================================================================

    #[tokio::test]
    async fn test_me_resolves_registered_user() {
        let h = Harness::new();

        let user = h.register("alice", "alice@example.com").await.unwrap().user;

        let me = MeUseCase::new(h.repo.clone())
            .execute(&user.user_id)
            .await
            .unwrap();
        assert_eq!(me.email.as_str(), "alice@example.com");
    }

    #[tokio::test]
    async fn test_me_for_unknown_user_reads_as_unauthenticated() {
        let h = Harness::new();

        let err = MeUseCase::new(h.repo.clone())
            .execute(&UserId::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Unauthenticated));
    }

    #[tokio::test]
    async fn test_profile_email_change_resets_activation() {
        let h = Harness::new();

        let user = h.register("alice", "alice@example.com").await.unwrap().user;

        let ticket = h.mint_ticket(&user.user_id).await;
        h.activate(ticket.as_str()).await.unwrap();

        let use_case = UpdateProfileUseCase::new(
            h.repo.clone(),
            h.repo.clone(),
            h.notifier.clone(),
            h.config.clone(),
        );
        let updated = use_case
            .execute(
                &user.user_id,
                UpdateProfileInput {
                    email: Some("alice@other.example.com".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.email.as_str(), "alice@other.example.com");
        assert!(!updated.is_activated);
    }

    #[tokio::test]
    async fn test_profile_email_change_to_taken_address_fails() {
        let h = Harness::new();

        let alice = h.register("alice", "alice@example.com").await.unwrap().user;
        h.register("bob", "bob@example.com").await.unwrap();

        let use_case = UpdateProfileUseCase::new(
            h.repo.clone(),
            h.repo.clone(),
            h.notifier.clone(),
            h.config.clone(),
        );
        let err = use_case
            .execute(
                &alice.user_id,
                UpdateProfileInput {
                    email: Some("bob@example.com".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::EmailTaken));
    }

    #[tokio::test]
    async fn test_profile_password_change_takes_effect() {
        let h = Harness::new();

        let user = h.register("alice", "alice@example.com").await.unwrap().user;

        let use_case = UpdateProfileUseCase::new(
            h.repo.clone(),
            h.repo.clone(),
            h.notifier.clone(),
            h.config.clone(),
        );
        use_case
            .execute(
                &user.user_id,
                UpdateProfileInput {
                    password: Some("battery staple horse".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(h.login("alice@example.com", PASSWORD).await.is_err());
        assert!(
            h.login("alice@example.com", "battery staple horse")
                .await
                .is_ok()
        );
    }
}
