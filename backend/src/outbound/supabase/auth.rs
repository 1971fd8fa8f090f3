//! Identity provider backed by the hosted auth API's passwordless endpoints.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::client::{SupabaseClient, execute};
use crate::domain::ports::{IdentityProvider, IdentityProviderError};
use crate::domain::{Email, OtpCode, OtpTarget, PhoneNumber, UserId, VerifiedIdentity};
use crate::outbound::http::RemoteError;

#[derive(Debug, Serialize)]
struct OtpRequestBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<&'a str>,
    create_user: bool,
}

#[derive(Debug, Serialize)]
struct VerifyBody<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<&'a str>,
    token: &'a str,
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    user: AuthUserDto,
}

#[derive(Debug, Deserialize)]
struct AuthUserDto {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    phone: Option<String>,
}

impl AuthUserDto {
    fn into_identity(self) -> Result<VerifiedIdentity, String> {
        let user_id = UserId::new(&self.id).map_err(|err| format!("user id: {err}"))?;
        // The provider returns empty strings for unset contact fields.
        let email = self
            .email
            .filter(|raw| !raw.is_empty())
            .map(Email::new)
            .transpose()
            .map_err(|err| format!("email: {err}"))?;
        let phone = self
            .phone
            .filter(|raw| !raw.is_empty())
            .map(PhoneNumber::new)
            .transpose()
            .map_err(|err| format!("phone: {err}"))?;
        Ok(VerifiedIdentity {
            user_id,
            email,
            phone,
        })
    }
}

fn target_fields(target: &OtpTarget) -> (Option<&str>, Option<&str>) {
    match target {
        OtpTarget::Email(email) => (Some(email.as_ref()), None),
        OtpTarget::Phone(phone) => (None, Some(phone.as_ref())),
    }
}

/// [`IdentityProvider`] calling `/auth/v1/otp` and `/auth/v1/verify`.
#[derive(Clone)]
pub struct SupabaseAuthProvider {
    client: Arc<SupabaseClient>,
}

impl SupabaseAuthProvider {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self { client }
    }

    async fn post<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Vec<u8>, RemoteError> {
        let url = self.client.endpoint(path)?;
        execute(self.client.request(Method::POST, url).json(body))
            .await
            .inspect_err(|err| warn!(path, error = %err, "auth request failed"))
    }
}

fn map_remote_error(error: RemoteError, verifying: bool) -> IdentityProviderError {
    match error {
        RemoteError::RateLimited { message } => IdentityProviderError::rate_limited(message),
        RemoteError::Timeout { message } => IdentityProviderError::timeout(message),
        RemoteError::Rejected { message }
        | RemoteError::Unauthorized { message }
        | RemoteError::NotFound { message }
            if verifying =>
        {
            IdentityProviderError::invalid_token(message)
        }
        RemoteError::Rejected { message } | RemoteError::Conflict { message } => {
            IdentityProviderError::rejected(message)
        }
        other => IdentityProviderError::unavailable(other.to_string()),
    }
}

#[async_trait]
impl IdentityProvider for SupabaseAuthProvider {
    async fn request_otp(&self, target: &OtpTarget) -> Result<(), IdentityProviderError> {
        let (email, phone) = target_fields(target);
        let body = OtpRequestBody {
            email,
            phone,
            create_user: true,
        };
        self.post("auth/v1/otp", &body)
            .await
            .map_err(|err| map_remote_error(err, false))?;
        Ok(())
    }

    async fn verify_otp(
        &self,
        target: &OtpTarget,
        code: &OtpCode,
    ) -> Result<VerifiedIdentity, IdentityProviderError> {
        let (email, phone) = target_fields(target);
        let body = VerifyBody {
            kind: if email.is_some() { "email" } else { "sms" },
            email,
            phone,
            token: code.as_str(),
        };
        let response = self
            .post("auth/v1/verify", &body)
            .await
            .map_err(|err| map_remote_error(err, true))?;
        let decoded: VerifyResponse = serde_json::from_slice(&response)
            .map_err(|err| IdentityProviderError::unavailable(format!("verify response: {err}")))?;
        decoded
            .user
            .into_identity()
            .map_err(IdentityProviderError::unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn verify_body_uses_sms_for_phones() {
        let target = OtpTarget::try_from_parts(None, Some("+14155550100")).expect("target");
        let code = OtpCode::new("123456").expect("code");
        let (email, phone) = target_fields(&target);
        let body = VerifyBody {
            kind: if email.is_some() { "email" } else { "sms" },
            email,
            phone,
            token: code.as_str(),
        };
        assert_eq!(
            serde_json::to_value(&body).expect("json"),
            json!({ "type": "sms", "phone": "+14155550100", "token": "123456" })
        );
    }

    #[rstest]
    #[case(RemoteError::rejected("otp_expired"), true, "InvalidToken")]
    #[case(RemoteError::rejected("invalid phone"), false, "Rejected")]
    #[case(RemoteError::rate_limited("429"), true, "RateLimited")]
    #[case(RemoteError::unavailable("502"), false, "Unavailable")]
    fn remote_errors_map_by_operation(
        #[case] error: RemoteError,
        #[case] verifying: bool,
        #[case] expected: &str,
    ) {
        let mapped = match map_remote_error(error, verifying) {
            IdentityProviderError::InvalidToken { .. } => "InvalidToken",
            IdentityProviderError::Rejected { .. } => "Rejected",
            IdentityProviderError::RateLimited { .. } => "RateLimited",
            IdentityProviderError::Timeout { .. } => "Timeout",
            IdentityProviderError::Unavailable { .. } => "Unavailable",
        };
        assert_eq!(mapped, expected);
    }

    #[rstest]
    fn blank_contact_fields_are_absent() {
        let user: AuthUserDto = serde_json::from_value(json!({
            "id": "3fa85f64-5717-4562-b3fc-2c963f66afa6",
            "email": "Ada@Example.com",
            "phone": ""
        }))
        .expect("user");
        let identity = user.into_identity().expect("identity");
        assert_eq!(
            identity.email,
            Some(Email::new("ada@example.com").expect("email"))
        );
        assert!(identity.phone.is_none());
    }
}
