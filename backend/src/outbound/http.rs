//! Transport error mapping shared by the reqwest-backed adapters.
//!
//! Adapters classify failures once here, then translate the classification
//! into their own port error enum.

use reqwest::StatusCode;

use crate::domain::ports::define_port_error;

define_port_error! {
    /// Classified failure of a remote HTTP call.
    pub enum RemoteError {
        /// Credentials were refused (401/403).
        Unauthorized { message: String } => "remote refused credentials: {message}",
        /// The addressed resource does not exist (404).
        NotFound { message: String } => "remote resource not found: {message}",
        /// A uniqueness or state conflict (409).
        Conflict { message: String } => "remote conflict: {message}",
        /// The remote is throttling requests (429).
        RateLimited { message: String } => "remote rate limited: {message}",
        /// Any other client error.
        Rejected { message: String } => "remote rejected request: {message}",
        /// The request timed out in transit or at the remote gateway.
        Timeout { message: String } => "remote timed out: {message}",
        /// Connection failure or server error.
        Unavailable { message: String } => "remote unavailable: {message}",
        /// The response body did not match the expected shape.
        Decode { message: String } => "remote response malformed: {message}",
    }
}

impl RemoteError {
    /// Whether the failure is the remote being unreachable or overloaded
    /// rather than the request being wrong.
    pub fn is_connectivity(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized { .. }
                | Self::RateLimited { .. }
                | Self::Timeout { .. }
                | Self::Unavailable { .. }
        )
    }
}

pub(crate) fn map_transport_error(error: reqwest::Error) -> RemoteError {
    if error.is_timeout() {
        RemoteError::timeout(error.to_string())
    } else if error.is_decode() {
        RemoteError::decode(error.to_string())
    } else {
        RemoteError::unavailable(error.to_string())
    }
}

pub(crate) fn map_status_error(status: StatusCode, body: &[u8]) -> RemoteError {
    let body_preview = body_preview(body);
    let message = if body_preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), body_preview)
    };

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RemoteError::unauthorized(message),
        StatusCode::NOT_FOUND => RemoteError::not_found(message),
        StatusCode::CONFLICT => RemoteError::conflict(message),
        StatusCode::TOO_MANY_REQUESTS => RemoteError::rate_limited(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            RemoteError::timeout(message)
        }
        _ if status.is_client_error() => RemoteError::rejected(message),
        _ => RemoteError::unavailable(message),
    }
}

pub(crate) fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
