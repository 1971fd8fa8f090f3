//! Domain primitives, services and ports.
//!
//! Purpose: define the strongly typed values the HTTP layer validates into,
//! the services that orchestrate the hosted database, auth provider and
//! payment processor, and the ports those collaborators are reached through.
//!
//! Public surface:
//! - Error / ErrorCode: API error response payload and stable identifier.
//! - Contact values (`Email`, `PhoneNumber`, `PersonName`, `ContactDetails`)
//!   and identity matching shared by the waitlist and attendee flows.
//! - Services: `WaitlistService`, `AttendeeService`, `PaymentService`,
//!   `TicketService`, `EventService`, `AuthService`.
//! - `CheckoutState`: the resumable purchase wizard.

pub mod attendee;
pub mod auth;
mod auth_service;
pub mod checkout;
pub mod contact;
pub mod error;
pub mod event;
mod event_service;
pub mod payment;
mod payment_service;
pub mod ports;
pub mod ticket;
mod ticket_service;
pub mod trace_id;
pub mod user;
pub mod waitlist;

#[cfg(test)]
pub(crate) mod test_clock;

pub use self::attendee::{Attendee, AttendeeService, Identification};
pub use self::auth::{
    AdminPolicy, OTP_LENGTH, OtpCode, OtpTarget, OtpValidationError, VerifiedIdentity,
};
pub use self::auth_service::AuthService;
pub use self::checkout::{
    CHECKOUT_STATE_KEY, CheckoutEvent, CheckoutState, CheckoutStep, CheckoutTransitionError,
    PaymentRedirect, RedirectStatus,
};
pub use self::contact::{
    ContactDetails, ContactRecord, ContactValidationError, EMAIL_MAX, Email, IdentityMatch,
    NAME_MAX, PersonName, PhoneNumber, match_identity,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::event::{
    Event, EventDraft, EventDraftParts, EventId, EventValidationError, TITLE_MAX,
    sort_upcoming_first,
};
pub use self::event_service::EventService;
pub use self::payment::{
    CheckoutForm, CreatePaymentIntent, CreatedPaymentIntent, Currency, MAX_AMOUNT_CENTS,
    MAX_QUANTITY, MIN_AMOUNT_CENTS, PaymentAmount, PaymentIntent, PaymentIntentId,
    PaymentStatus, PaymentValidationError, Quantity,
};
pub use self::payment_service::PaymentService;
pub use self::ticket::{IssuedTicket, Ticket, TicketView, scan_url};
pub use self::ticket_service::TicketService;
pub use self::trace_id::TraceId;
pub use self::user::{Role, SessionUser, UserId, UserValidationError, authorize_admin};
pub use self::waitlist::{WAITLIST_JOINED_MESSAGE, WaitlistEntry, WaitlistService};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use site_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("admin access required"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
