//! HTTP inbound adapter exposing REST endpoints.

pub mod attendees;
pub mod auth;
pub mod checkout;
pub mod dto;
pub mod error;
pub mod events;
pub mod health;
pub mod payments;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod tickets;
pub mod validation;
pub mod waitlist;

use actix_web::web;
use serde_json::json;

use crate::domain::Error;

pub use error::ApiResult;

fn body_error(message: String, code: &str) -> Error {
    Error::invalid_request(message).with_details(json!({ "code": code }))
}

/// Register every `/api` handler on `cfg`.
///
/// The caller mounts this under `/api` and wraps it with the session
/// middleware.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use site_backend::inbound::http::configure_api;
///
/// let app = App::new().service(web::scope("/api").configure(configure_api));
/// ```
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _| {
        body_error(err.to_string(), "invalid_json").into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _| {
        body_error(err.to_string(), "invalid_query").into()
    }))
    .service(waitlist::join_waitlist)
    .service(attendees::identify_attendee)
    .service(payments::create_payment_intent)
    .service(tickets::issue_ticket)
    .service(tickets::wallet_pass)
    .service(tickets::get_ticket)
    .service(tickets::scan_ticket)
    .service(tickets::toggle_check_in)
    .service(events::list_events)
    .service(events::create_event)
    .service(events::get_event)
    .service(events::update_event)
    .service(events::delete_event)
    .service(auth::request_otp)
    .service(auth::verify_otp)
    .service(auth::current_session)
    .service(auth::logout)
    .service(checkout::get_checkout_state)
    .service(checkout::advance_checkout)
    .service(checkout::clear_checkout_state);
}
