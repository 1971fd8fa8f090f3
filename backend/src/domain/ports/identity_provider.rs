//! Driven port for the hosted passwordless auth provider.

use async_trait::async_trait;

use crate::domain::{OtpCode, OtpTarget, VerifiedIdentity};

use super::define_port_error;

define_port_error! {
    /// Errors raised by identity provider adapters.
    pub enum IdentityProviderError {
        /// The passcode was wrong or expired.
        InvalidToken { message: String } =>
            "one-time passcode rejected: {message}",
        /// The provider refused the request as invalid.
        Rejected { message: String } =>
            "auth request rejected: {message}",
        /// The provider is throttling requests.
        RateLimited { message: String } =>
            "auth provider rate limited: {message}",
        /// The provider did not answer in time.
        Timeout { message: String } =>
            "auth provider timed out: {message}",
        /// The provider could not be reached or failed internally.
        Unavailable { message: String } =>
            "auth provider unavailable: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Ask the provider to deliver a passcode to `target`.
    async fn request_otp(&self, target: &OtpTarget) -> Result<(), IdentityProviderError>;

    /// Exchange a passcode for the verified user identity.
    async fn verify_otp(
        &self,
        target: &OtpTarget,
        code: &OtpCode,
    ) -> Result<VerifiedIdentity, IdentityProviderError>;
}
