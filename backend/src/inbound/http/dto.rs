//! Request and response bodies shared by several handlers.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{ContactDetails, Error, SessionUser};
use crate::inbound::http::validation::contact_error;

/// Name, email and phone as typed into the site's forms.
///
/// Example JSON:
/// `{"name":"Ada Lovelace","email":"ada@example.com","phone":"(415) 555-0100"}`
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

impl TryFrom<ContactRequest> for ContactDetails {
    type Error = Error;

    fn try_from(value: ContactRequest) -> Result<Self, Self::Error> {
        ContactDetails::try_from_parts(&value.name, &value.email, &value.phone)
            .map_err(contact_error)
    }
}

/// `{success, message}` acknowledgement used by the form endpoints.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: String,
}

impl SuccessResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Signed-in user as exposed to the browser.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionUserResponse {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[schema(example = "member")]
    pub role: String,
}

impl From<&SessionUser> for SessionUserResponse {
    fn from(user: &SessionUser) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.as_ref().map(ToString::to_string),
            phone: user.phone.as_ref().map(ToString::to_string),
            role: if user.is_admin() { "admin" } else { "member" }.to_owned(),
        }
    }
}
