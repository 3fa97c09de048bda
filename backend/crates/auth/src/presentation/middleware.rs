//! Auth Middleware
//!
//! Middleware for requiring a verified access token (and optionally the
//! admin role) on protected routes.

use axum::body::Body;
use axum::http::{HeaderMap, Request, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use crate::application::token::TokenCodec;
use crate::domain::value_object::{user_id::UserId, user_role::UserRole};
use crate::error::AuthError;

/// Middleware state
#[derive(Clone)]
pub struct AuthMiddlewareState {
    pub codec: Arc<TokenCodec>,
}

/// Identity claims of the verified caller, stored in request extensions
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser {
    pub user_id: UserId,
    pub role: UserRole,
}

/// Middleware that requires a valid Bearer access token
pub async fn require_access_token(
    state: AuthMiddlewareState,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    let Some(token) = bearer_token(req.headers()) else {
        return Err(AuthError::Unauthenticated.into_response());
    };

    let claims = match state.codec.verify_access(&token) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!(error = %e, "Access token rejected");
            return Err(AuthError::Unauthenticated.into_response());
        }
    };

    // The role claim was signed by us, but stays a closed enum here
    let Some(role) = UserRole::from_code(&claims.role) else {
        return Err(AuthError::Unauthenticated.into_response());
    };

    req.extensions_mut().insert(CurrentUser {
        user_id: UserId::from_uuid(claims.sub),
        role,
    });

    Ok(next.run(req).await)
}

/// Middleware that requires the admin role
///
/// Must run after [`require_access_token`]; without a `CurrentUser`
/// extension the request reads as unauthenticated.
pub async fn require_admin(req: Request<Body>, next: Next) -> Result<Response, Response> {
    match req.extensions().get::<CurrentUser>() {
        Some(current) if current.role.is_admin() => Ok(next.run(req).await),
        Some(_) => Err(AuthError::Forbidden.into_response()),
        None => Err(AuthError::Unauthenticated.into_response()),
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();

    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc.def.ghi"),
        );
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi".to_string()));
    }

    #[test]
    fn test_bearer_token_missing_or_malformed() {
        let headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("abc.def"));
        assert_eq!(bearer_token(&headers), None);

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);
    }
}
