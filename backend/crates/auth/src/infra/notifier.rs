//! Activation Notifier Implementations

use crate::domain::repository::ActivationNotifier;
use crate::domain::value_object::email::Email;
use crate::error::AuthResult;

/// Notifier that logs the activation URL instead of sending mail
///
/// Real delivery is an external collaborator; this implementation keeps
/// the handshake testable and local development self-contained.
#[derive(Clone, Default)]
pub struct LogActivationNotifier;

impl ActivationNotifier for LogActivationNotifier {
    async fn send_activation(&self, email: &Email, activation_url: &str) -> AuthResult<()> {
        tracing::info!(
            email = %email,
            url = %activation_url,
            "Activation link issued"
        );
        Ok(())
    }
}
