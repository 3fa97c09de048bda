//! Token Codec
//!
//! Stateless issuing and verification of signed, expiring tokens
//! (HS256 JWTs). Access and refresh tokens are signed with distinct
//! secrets, so a leaked access token cannot be replayed as a refresh
//! token. Verification is a pure function of secret + token + clock;
//! nothing here touches a store.

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    errors::ErrorKind as JwtErrorKind, get_current_timestamp,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::application::config::AuthConfig;
use crate::domain::entity::user::User;
use crate::domain::value_object::user_id::UserId;
use crate::error::{AuthError, AuthResult};

/// Tolerated clock skew between issuer and verifier, in seconds
const CLOCK_SKEW_LEEWAY_SECS: u64 = 5;

/// Token verification failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Structurally valid and correctly signed, but past its expiry
    #[error("token has expired")]
    Expired,

    /// Signature or structure check failed
    #[error("token is malformed")]
    Malformed,
}

/// Claims carried by an access token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// User ID
    pub sub: Uuid,
    /// Role code at issue time
    pub role: String,
    /// Issued at (Unix seconds)
    pub iat: u64,
    /// Expiry (Unix seconds)
    pub exp: u64,
}

/// Claims carried by a refresh token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshClaims {
    /// User ID
    pub sub: Uuid,
    /// Unique token ID; two issues in the same second must still be
    /// distinct byte strings for the rotation check to work
    pub jti: Uuid,
    /// Issued at (Unix seconds)
    pub iat: u64,
    /// Expiry (Unix seconds)
    pub exp: u64,
}

/// Stateless token codec
pub struct TokenCodec {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_ttl_secs: u64,
    refresh_ttl_secs: u64,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = CLOCK_SKEW_LEEWAY_SECS;

        Self {
            access_encoding: EncodingKey::from_secret(&config.access_token_secret),
            access_decoding: DecodingKey::from_secret(&config.access_token_secret),
            refresh_encoding: EncodingKey::from_secret(&config.refresh_token_secret),
            refresh_decoding: DecodingKey::from_secret(&config.refresh_token_secret),
            access_ttl_secs: config.access_token_ttl.as_secs(),
            refresh_ttl_secs: config.refresh_token_ttl.as_secs(),
            validation,
        }
    }

    /// Issue a short-lived access token for a user
    pub fn issue_access(&self, user: &User) -> AuthResult<String> {
        let now = get_current_timestamp();
        let claims = AccessClaims {
            sub: *user.user_id.as_uuid(),
            role: user.role.code().to_string(),
            iat: now,
            exp: now + self.access_ttl_secs,
        };

        encode(&Header::default(), &claims, &self.access_encoding)
            .map_err(|e| AuthError::Internal(format!("Access token signing failed: {e}")))
    }

    /// Issue a long-lived refresh token for a user
    pub fn issue_refresh(&self, user_id: &UserId) -> AuthResult<String> {
        let now = get_current_timestamp();
        let claims = RefreshClaims {
            sub: *user_id.as_uuid(),
            jti: Uuid::new_v4(),
            iat: now,
            exp: now + self.refresh_ttl_secs,
        };

        encode(&Header::default(), &claims, &self.refresh_encoding)
            .map_err(|e| AuthError::Internal(format!("Refresh token signing failed: {e}")))
    }

    /// Verify an access token
    pub fn verify_access(&self, token: &str) -> Result<AccessClaims, TokenError> {
        decode::<AccessClaims>(token, &self.access_decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(classify)
    }

    /// Verify a refresh token
    pub fn verify_refresh(&self, token: &str) -> Result<RefreshClaims, TokenError> {
        decode::<RefreshClaims>(token, &self.refresh_decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(classify)
    }

    /// Best-effort claim extraction for logout
    ///
    /// Ignores signature and expiry: an expired or stale refresh token
    /// still names the identity whose session record should be cleared.
    /// Returns `None` only when the token cannot even be parsed.
    pub fn peek_refresh(&self, token: &str) -> Option<RefreshClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        decode::<RefreshClaims>(token, &self.refresh_decoding, &validation)
            .map(|data| data.claims)
            .ok()
    }
}

/// The only distinction callers need is expired vs everything else
fn classify(err: jsonwebtoken::errors::Error) -> TokenError {
    match err.kind() {
        JwtErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Malformed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::{email::Email, username::Username};
    use platform::password::ClearTextPassword;

    fn codec() -> TokenCodec {
        TokenCodec::new(&AuthConfig::with_random_secrets())
    }

    fn sample_user() -> User {
        let password = ClearTextPassword::new("correct horse battery".to_string()).unwrap();
        User::new(
            Username::new("alice").unwrap(),
            Email::new("alice@example.com").unwrap(),
            password.hash().unwrap(),
        )
    }

    #[test]
    fn test_access_roundtrip() {
        let codec = codec();
        let user = sample_user();

        let token = codec.issue_access(&user).unwrap();
        let claims = codec.verify_access(&token).unwrap();

        assert_eq!(claims.sub, *user.user_id.as_uuid());
        assert_eq!(claims.role, "user");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_refresh_roundtrip() {
        let codec = codec();
        let user_id = UserId::new();

        let token = codec.issue_refresh(&user_id).unwrap();
        let claims = codec.verify_refresh(&token).unwrap();

        assert_eq!(claims.sub, *user_id.as_uuid());
    }

    #[test]
    fn test_back_to_back_refresh_tokens_differ() {
        let codec = codec();
        let user_id = UserId::new();

        // Same subject, same second; the jti keeps them distinct
        let a = codec.issue_refresh(&user_id).unwrap();
        let b = codec.issue_refresh(&user_id).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_access_token_is_not_a_refresh_token() {
        let codec = codec();
        let user = sample_user();

        let access = codec.issue_access(&user).unwrap();
        assert_eq!(codec.verify_refresh(&access), Err(TokenError::Malformed));

        let refresh = codec.issue_refresh(&user.user_id).unwrap();
        assert_eq!(codec.verify_access(&refresh), Err(TokenError::Malformed));
    }

    #[test]
    fn test_foreign_signature_rejected() {
        let a = codec();
        let b = codec();
        let user_id = UserId::new();

        let token = a.issue_refresh(&user_id).unwrap();
        assert_eq!(b.verify_refresh(&token), Err(TokenError::Malformed));
    }

    #[test]
    fn test_garbage_rejected() {
        let codec = codec();
        assert_eq!(codec.verify_access(""), Err(TokenError::Malformed));
        assert_eq!(
            codec.verify_access("not.a.token"),
            Err(TokenError::Malformed)
        );
    }

    #[test]
    fn test_expired_token_classified_as_expired() {
        let config = AuthConfig::with_random_secrets();
        let codec = TokenCodec::new(&config);

        // Hand-craft a refresh token whose expiry is safely past the leeway
        let now = get_current_timestamp();
        let claims = RefreshClaims {
            sub: Uuid::new_v4(),
            jti: Uuid::new_v4(),
            iat: now - 600,
            exp: now - 300,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(&config.refresh_token_secret),
        )
        .unwrap();

        assert_eq!(codec.verify_refresh(&token), Err(TokenError::Expired));
        // Logout can still read who the token belonged to
        let peeked = codec.peek_refresh(&token).unwrap();
        assert_eq!(peeked.sub, claims.sub);
    }

    #[test]
    fn test_peek_on_garbage_is_none() {
        let codec = codec();
        assert!(codec.peek_refresh("not a token at all").is_none());
    }
}
