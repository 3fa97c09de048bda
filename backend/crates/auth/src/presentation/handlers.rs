//! HTTP Handlers

use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Redirect};
use std::sync::Arc;

use platform::cookie::CookieConfig;

use crate::application::config::AuthConfig;
use crate::application::token::TokenCodec;
use crate::application::{
    ActivateUseCase, ChangeRoleUseCase, IssuedSession, LoginInput, LoginUseCase, LogoutUseCase,
    MeUseCase, RefreshUseCase, RegisterInput, RegisterUseCase, UpdateProfileInput,
    UpdateProfileUseCase,
};
use crate::domain::repository::{
    ActivationNotifier, ActivationRepository, SessionRepository, UserRepository,
};
use crate::domain::value_object::{user_id::UserId, user_role::UserRole};
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    AuthResponse, ChangeRoleRequest, LoginRequest, RegistrationRequest, UpdateProfileRequest,
    UserView,
};
use crate::presentation::middleware::CurrentUser;

/// Shared state for auth handlers
#[derive(Clone)]
pub struct AuthAppState<R, N>
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
    pub repo: Arc<R>,
    pub notifier: Arc<N>,
    pub codec: Arc<TokenCodec>,
    pub config: Arc<AuthConfig>,
}

// ============================================================================
// Registration
// ============================================================================

/// POST /api/users/registration
pub async fn registration<R, N>(
    State(state): State<AuthAppState<R, N>>,
    Json(req): Json<RegistrationRequest>,
) -> AuthResult<impl IntoResponse>
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
    let use_case = RegisterUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.repo.clone(),
        state.notifier.clone(),
        state.codec.clone(),
        state.config.clone(),
    );

    let input = RegisterInput {
        username: req.username,
        email: req.email,
        password: req.password,
    };

    let session = use_case.execute(input).await?;

    Ok(issued_session_response(&state.config, session))
}

// ============================================================================
// Login
// ============================================================================

/// POST /api/users/login
pub async fn login<R, N>(
    State(state): State<AuthAppState<R, N>>,
    Json(req): Json<LoginRequest>,
) -> AuthResult<impl IntoResponse>
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
    let use_case = LoginUseCase::new(state.repo.clone(), state.repo.clone(), state.codec.clone());

    let input = LoginInput {
        email: req.email,
        password: req.password,
    };

    let session = use_case.execute(input).await?;

    Ok(issued_session_response(&state.config, session))
}

// ============================================================================
// Logout
// ============================================================================

/// POST /api/users/logout
pub async fn logout<R, N>(
    State(state): State<AuthAppState<R, N>>,
    headers: HeaderMap,
) -> AuthResult<impl IntoResponse>
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
    let token = extract_refresh_cookie(&headers, &state.config);

    let use_case = LogoutUseCase::new(state.repo.clone(), state.codec.clone());
    use_case.execute(token.as_deref()).await?;

    let cookie = refresh_cookie_config(&state.config).build_delete_cookie();

    Ok((StatusCode::NO_CONTENT, [(header::SET_COOKIE, cookie)]))
}

// ============================================================================
// Activation
// ============================================================================

/// GET /api/users/activate/{ticket}
pub async fn activate<R, N>(
    State(state): State<AuthAppState<R, N>>,
    Path(ticket): Path<String>,
) -> AuthResult<impl IntoResponse>
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
    let use_case = ActivateUseCase::new(state.repo.clone(), state.repo.clone());
    use_case.execute(&ticket).await?;

    Ok(Redirect::to(&state.config.client_url))
}

// ============================================================================
// Refresh
// ============================================================================

/// GET /api/users/refresh
pub async fn refresh<R, N>(
    State(state): State<AuthAppState<R, N>>,
    headers: HeaderMap,
) -> AuthResult<impl IntoResponse>
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
    let token = extract_refresh_cookie(&headers, &state.config);

    let use_case = RefreshUseCase::new(state.repo.clone(), state.repo.clone(), state.codec.clone());
    let session = use_case.execute(token.as_deref()).await?;

    Ok(issued_session_response(&state.config, session))
}

// ============================================================================
// Current User
// ============================================================================

/// GET /api/users/me
pub async fn me<R, N>(
    State(state): State<AuthAppState<R, N>>,
    Extension(current): Extension<CurrentUser>,
) -> AuthResult<Json<UserView>>
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
    let use_case = MeUseCase::new(state.repo.clone());
    let user = use_case.execute(&current.user_id).await?;

    Ok(Json(UserView::from(&user)))
}

/// PATCH /api/users/me
pub async fn update_profile<R, N>(
    State(state): State<AuthAppState<R, N>>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<UpdateProfileRequest>,
) -> AuthResult<Json<UserView>>
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
    let use_case = UpdateProfileUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.notifier.clone(),
        state.config.clone(),
    );

    let input = UpdateProfileInput {
        username: req.username,
        email: req.email,
        avatar_url: req.avatar_url,
        password: req.password,
    };

    let user = use_case.execute(&current.user_id, input).await?;

    Ok(Json(UserView::from(&user)))
}

// ============================================================================
// Role Change (admin)
// ============================================================================

/// PATCH /api/users/{user_id}/role
pub async fn change_role<R, N>(
    State(state): State<AuthAppState<R, N>>,
    Extension(current): Extension<CurrentUser>,
    Path(user_id): Path<String>,
    Json(req): Json<ChangeRoleRequest>,
) -> AuthResult<Json<UserView>>
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
    let target: UserId = user_id
        .parse()
        .map_err(|_| AuthError::Validation("Invalid user id".to_string()))?;

    let new_role = UserRole::from_code(&req.role)
        .ok_or_else(|| AuthError::Validation(format!("Unknown role: {}", req.role)))?;

    let use_case = ChangeRoleUseCase::new(state.repo.clone());
    let user = use_case.execute(current.role, &target, new_role).await?;

    Ok(Json(UserView::from(&user)))
}

// ============================================================================
// Helper Functions
// ============================================================================

fn extract_refresh_cookie(headers: &HeaderMap, config: &AuthConfig) -> Option<String> {
    platform::cookie::extract_cookie(headers, &config.refresh_cookie_name)
}

fn refresh_cookie_config(config: &AuthConfig) -> CookieConfig {
    CookieConfig {
        name: config.refresh_cookie_name.clone(),
        secure: config.cookie_secure,
        http_only: true,
        same_site: config.cookie_same_site,
        path: "/".to_string(),
        max_age_secs: Some(config.refresh_token_ttl.as_secs() as i64),
    }
}

/// Access token and user view in the body, refresh token in the cookie
fn issued_session_response(config: &AuthConfig, session: IssuedSession) -> axum::response::Response {
    let cookie = refresh_cookie_config(config).build_set_cookie(&session.refresh_token);

    (
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse {
            access_token: session.access_token,
            user: UserView::from(&session.user),
        }),
    )
        .into_response()
}
