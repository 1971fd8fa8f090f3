//! In-memory passwordless login for local development and tests.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{IdentityProvider, IdentityProviderError};
use crate::domain::{OtpCode, OtpTarget, UserId, VerifiedIdentity};

/// Code accepted by [`MemoryIdentityProvider::default`].
pub const LOCAL_OTP_CODE: &str = "000000";

fn target_key(target: &OtpTarget) -> String {
    match target {
        OtpTarget::Email(email) => format!("email:{email}"),
        OtpTarget::Phone(phone) => format!("phone:{phone}"),
    }
}

/// [`IdentityProvider`] accepting one fixed code for any requested target.
///
/// Each target keeps the same user id across logins. Verifying a target that
/// never requested a code is rejected as an invalid token.
#[derive(Debug)]
pub struct MemoryIdentityProvider {
    code: String,
    requested: RwLock<BTreeMap<String, UserId>>,
}

impl MemoryIdentityProvider {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            requested: RwLock::default(),
        }
    }
}

impl Default for MemoryIdentityProvider {
    fn default() -> Self {
        Self::new(LOCAL_OTP_CODE)
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentityProvider {
    async fn request_otp(&self, target: &OtpTarget) -> Result<(), IdentityProviderError> {
        let key = target_key(target);
        self.requested
            .write()
            .map_err(|_| IdentityProviderError::unavailable("in-memory store lock poisoned"))?
            .entry(key)
            .or_insert_with(UserId::random);
        info!("local one-time code issued");
        Ok(())
    }

    async fn verify_otp(
        &self,
        target: &OtpTarget,
        code: &OtpCode,
    ) -> Result<VerifiedIdentity, IdentityProviderError> {
        let user_id = self
            .requested
            .read()
            .map_err(|_| IdentityProviderError::unavailable("in-memory store lock poisoned"))?
            .get(&target_key(target))
            .cloned()
            .ok_or_else(|| IdentityProviderError::invalid_token("no code was requested"))?;
        if code.as_str() != self.code {
            return Err(IdentityProviderError::invalid_token("code does not match"));
        }
        let (email, phone) = match target {
            OtpTarget::Email(email) => (Some(email.clone()), None),
            OtpTarget::Phone(phone) => (None, Some(phone.clone())),
        };
        Ok(VerifiedIdentity {
            user_id,
            email,
            phone,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn email_target() -> OtpTarget {
        OtpTarget::try_from_parts(Some("ada@example.com"), None).expect("target")
    }

    #[rstest]
    #[tokio::test]
    async fn repeated_logins_keep_user_id() {
        let provider = MemoryIdentityProvider::default();
        let code = OtpCode::new(LOCAL_OTP_CODE).expect("code");
        provider.request_otp(&email_target()).await.expect("request");
        let first = provider.verify_otp(&email_target(), &code).await.expect("verify");
        provider.request_otp(&email_target()).await.expect("request");
        let second = provider.verify_otp(&email_target(), &code).await.expect("verify");
        assert_eq!(first.user_id, second.user_id);
        assert!(first.email.is_some());
        assert!(first.phone.is_none());
    }

    #[rstest]
    #[case::wrong_code(true, "123456")]
    #[case::never_requested(false, LOCAL_OTP_CODE)]
    #[tokio::test]
    async fn bad_attempts_are_invalid_tokens(#[case] request_first: bool, #[case] code: &str) {
        let provider = MemoryIdentityProvider::default();
        if request_first {
            provider.request_otp(&email_target()).await.expect("request");
        }
        let code = OtpCode::new(code).expect("code");
        let err = provider
            .verify_otp(&email_target(), &code)
            .await
            .expect_err("rejected");
        assert!(matches!(err, IdentityProviderError::InvalidToken { .. }));
    }
}
