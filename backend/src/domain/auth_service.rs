//! Passwordless sign-in through the hosted auth provider.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{info, warn};

use super::ports::{IdentityProvider, IdentityProviderError, OtpLogin};
use super::{AdminPolicy, Error, OtpCode, OtpTarget, SessionUser};

/// Sign-in service implementing [`OtpLogin`].
#[derive(Clone)]
pub struct AuthService<P: ?Sized> {
    provider: Arc<P>,
    admins: AdminPolicy,
}

impl<P: ?Sized> AuthService<P> {
    /// Create a service granting the admin role per `admins`.
    pub fn new(provider: Arc<P>, admins: AdminPolicy) -> Self {
        Self { provider, admins }
    }
}

fn map_provider_error(error: IdentityProviderError) -> Error {
    match error {
        IdentityProviderError::InvalidToken { .. } => {
            Error::unauthorized("invalid or expired code")
                .with_details(json!({ "field": "token", "code": "invalid_token" }))
        }
        IdentityProviderError::Rejected { message } => {
            Error::invalid_request(format!("sign-in request rejected: {message}"))
        }
        IdentityProviderError::RateLimited { .. } => {
            Error::service_unavailable("too many sign-in attempts, try again shortly")
        }
        IdentityProviderError::Timeout { .. } | IdentityProviderError::Unavailable { .. } => {
            Error::service_unavailable("sign-in is temporarily unavailable")
        }
    }
}

#[async_trait]
impl<P: ?Sized> OtpLogin for AuthService<P>
where
    P: IdentityProvider,
{
    async fn request_otp(&self, target: OtpTarget) -> Result<(), Error> {
        self.provider.request_otp(&target).await.map_err(|err| {
            warn!(error = %err, "otp request failed");
            map_provider_error(err)
        })
    }

    async fn verify_otp(&self, target: OtpTarget, code: OtpCode) -> Result<SessionUser, Error> {
        let identity = self
            .provider
            .verify_otp(&target, &code)
            .await
            .map_err(map_provider_error)?;
        let user = self.admins.session_user(identity);
        info!(user_id = %user.id, admin = user.is_admin(), "user signed in");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockIdentityProvider;
    use crate::domain::{Email, ErrorCode, Role, UserId, VerifiedIdentity};
    use rstest::rstest;

    fn target() -> OtpTarget {
        OtpTarget::try_from_parts(Some("ops@example.com"), None).expect("target")
    }

    fn service(provider: MockIdentityProvider) -> AuthService<MockIdentityProvider> {
        AuthService::new(Arc::new(provider), AdminPolicy::from_csv("ops@example.com"))
    }

    #[rstest]
    #[tokio::test]
    async fn verified_admin_email_gets_admin_role() {
        let mut provider = MockIdentityProvider::new();
        provider
            .expect_verify_otp()
            .withf(|_, code| code.as_str() == "123456")
            .return_once(|_, _| {
                Ok(VerifiedIdentity {
                    user_id: UserId::random(),
                    email: Some(Email::new("ops@example.com").expect("email")),
                    phone: None,
                })
            });

        let user = service(provider)
            .verify_otp(target(), OtpCode::new("123456").expect("code"))
            .await
            .expect("signed in");
        assert_eq!(user.role, Role::Admin);
    }

    #[rstest]
    #[case(IdentityProviderError::invalid_token("expired"), ErrorCode::Unauthorized)]
    #[case(IdentityProviderError::rate_limited("429"), ErrorCode::ServiceUnavailable)]
    #[case(IdentityProviderError::unavailable("502"), ErrorCode::ServiceUnavailable)]
    #[case(IdentityProviderError::rejected("bad phone"), ErrorCode::InvalidRequest)]
    #[tokio::test]
    async fn provider_failures_are_mapped(
        #[case] failure: IdentityProviderError,
        #[case] expected: ErrorCode,
    ) {
        let mut provider = MockIdentityProvider::new();
        provider
            .expect_verify_otp()
            .return_once(move |_, _| Err(failure));
        let err = service(provider)
            .verify_otp(target(), OtpCode::new("000000").expect("code"))
            .await
            .expect_err("failure");
        assert_eq!(err.code(), expected);
    }

    #[rstest]
    #[tokio::test]
    async fn request_otp_forwards_target() {
        let mut provider = MockIdentityProvider::new();
        provider
            .expect_request_otp()
            .withf(|target| matches!(target, OtpTarget::Email(email) if email.as_ref() == "ops@example.com"))
            .times(1)
            .return_once(|_| Ok(()));
        service(provider)
            .request_otp(target())
            .await
            .expect("otp requested");
    }
}
