//! Driving port for passwordless sign-in.
//!
//! In hexagonal terms this is a *driving* port: inbound adapters call it to
//! exchange one-time passcodes for a session identity without importing the
//! hosted auth client.

use async_trait::async_trait;

use crate::domain::{Error, OtpCode, OtpTarget, SessionUser};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OtpLogin: Send + Sync {
    /// Send a passcode to the target.
    async fn request_otp(&self, target: OtpTarget) -> Result<(), Error>;

    /// Verify a passcode and return the identity to store in the session.
    async fn verify_otp(&self, target: OtpTarget, code: OtpCode) -> Result<SessionUser, Error>;
}
