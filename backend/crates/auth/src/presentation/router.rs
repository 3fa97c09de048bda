//! Auth Router

use axum::{
    Router,
    extract::Request,
    middleware::{self, Next},
    routing::{get, patch, post},
};
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::token::TokenCodec;
use crate::domain::repository::{
    ActivationNotifier, ActivationRepository, SessionRepository, UserRepository,
};
use crate::infra::notifier::LogActivationNotifier;
use crate::infra::postgres::PgAuthRepository;
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::{
    AuthMiddlewareState, require_access_token, require_admin,
};

/// Create the Auth router with PostgreSQL repository
pub fn auth_router(repo: PgAuthRepository, config: AuthConfig) -> Router {
    auth_router_generic(repo, LogActivationNotifier, config)
}

/// Create a generic Auth router for any repository/notifier implementation
pub fn auth_router_generic<R, N>(repo: R, notifier: N, config: AuthConfig) -> Router
where
    R: UserRepository
        + SessionRepository
        + ActivationRepository
        + Clone
        + Send
        + Sync
        + 'static,
    N: ActivationNotifier + Clone + Send + Sync + 'static,
{
    let codec = Arc::new(TokenCodec::new(&config));

    let state = AuthAppState {
        repo: Arc::new(repo),
        notifier: Arc::new(notifier),
        codec: codec.clone(),
        config: Arc::new(config),
    };

    let mw_state = AuthMiddlewareState { codec };

    // Admin routes: access token check runs first, then the role check
    let admin_routes = Router::new()
        .route("/{user_id}/role", patch(handlers::change_role::<R, N>))
        .layer(middleware::from_fn(require_admin));

    let protected_routes = Router::new()
        .route(
            "/me",
            get(handlers::me::<R, N>).patch(handlers::update_profile::<R, N>),
        )
        .merge(admin_routes)
        .layer(middleware::from_fn(move |req: Request, next: Next| {
            let mw_state = mw_state.clone();
            async move { require_access_token(mw_state, req, next).await }
        }));

    Router::new()
        .route("/registration", post(handlers::registration::<R, N>))
        .route("/login", post(handlers::login::<R, N>))
        .route("/logout", post(handlers::logout::<R, N>))
        .route("/activate/{ticket}", get(handlers::activate::<R, N>))
        .route("/refresh", get(handlers::refresh::<R, N>))
        .merge(protected_routes)
        .with_state(state)
}
