//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::time::Duration;

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC secret for access tokens (32 bytes)
    ///
    /// Distinct from the refresh secret so a leaked access token can
    /// never be replayed as a refresh token.
    pub access_token_secret: [u8; 32],
    /// HMAC secret for refresh tokens (32 bytes)
    pub refresh_token_secret: [u8; 32],
    /// Access token TTL (30 minutes)
    pub access_token_ttl: Duration,
    /// Refresh token TTL (30 days)
    pub refresh_token_ttl: Duration,
    /// Name of the refresh token cookie
    pub refresh_cookie_name: String,
    /// Whether to require Secure cookie
    pub cookie_secure: bool,
    /// SameSite policy
    pub cookie_same_site: SameSite,
    /// Upper bound on any single credential/session store call
    pub store_timeout: Duration,
    /// Base URL for activation links; the ticket is appended as a path segment
    pub activation_base_url: String,
    /// Frontend URL to redirect to after activation
    pub client_url: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_token_secret: [0u8; 32],
            refresh_token_secret: [0u8; 32],
            access_token_ttl: Duration::from_secs(30 * 60),
            refresh_token_ttl: Duration::from_secs(30 * 24 * 3600),
            refresh_cookie_name: "refreshToken".to_string(),
            cookie_secure: true,
            cookie_same_site: SameSite::Lax,
            store_timeout: Duration::from_secs(5),
            activation_base_url: "http://localhost:5000/api/users/activate".to_string(),
            client_url: "http://localhost:3000".to_string(),
        }
    }
}

impl AuthConfig {
    /// Create config with random token secrets (for development)
    pub fn with_random_secrets() -> Self {
        use rand::RngCore;
        let mut access = [0u8; 32];
        let mut refresh = [0u8; 32];
        rand::rng().fill_bytes(&mut access);
        rand::rng().fill_bytes(&mut refresh);
        Self {
            access_token_secret: access,
            refresh_token_secret: refresh,
            ..Default::default()
        }
    }

    /// Create config for development (insecure cookie)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            ..Self::with_random_secrets()
        }
    }
}
