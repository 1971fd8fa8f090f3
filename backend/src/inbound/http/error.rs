//! Maps [`Error`] onto actix responses.
//!
//! Every handler returns [`ApiResult`], so waitlist, checkout, ticket and
//! event failures all leave the server as the same JSON envelope with a
//! `trace-id` header. Messages from internal failures never reach the client.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use tracing::{error, warn};

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

pub type ApiResult<T> = Result<T, Error>;

const REDACTED_MESSAGE: &str = "Internal server error";

impl ErrorCode {
    /// HTTP status carried by responses with this code.
    pub fn http_status(self) -> StatusCode {
        match self {
            Self::InvalidRequest => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::PaymentRequired => StatusCode::PAYMENT_REQUIRED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict => StatusCode::CONFLICT,
            Self::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::NotImplemented => StatusCode::NOT_IMPLEMENTED,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// The body actually sent: internal errors lose their message and details.
fn client_view(err: &Error) -> Error {
    if err.code() != ErrorCode::InternalError {
        return err.clone();
    }
    error!(
        message = err.message(),
        trace_id = err.trace_id().unwrap_or("-"),
        "internal error hidden from client"
    );
    let hidden = Error::internal(REDACTED_MESSAGE);
    match err.trace_id() {
        Some(trace_id) => hidden.with_trace_id(trace_id.to_owned()),
        None => hidden,
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        self.code().http_status()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status == StatusCode::SERVICE_UNAVAILABLE {
            warn!(message = self.message(), "dependency unavailable");
        }
        let mut response = HttpResponse::build(status);
        if let Some(trace_id) = self.trace_id() {
            response.insert_header((TRACE_ID_HEADER, trace_id.to_owned()));
        }
        response.json(client_view(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "framework error surfaced from a handler");
        Error::internal(REDACTED_MESSAGE)
    }
}
