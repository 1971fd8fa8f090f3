//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::ServiceResponse;
use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use actix_web::{App, HttpResponse, post, web};
use serde_json::Value;

use crate::domain::ports::{
    MockAttendeeCommand, MockEventCommand, MockEventQuery, MockOtpLogin, MockPaymentCommand,
    MockTicketCommand, MockTicketQuery, MockWaitlistCommand,
};
use crate::domain::{Email, Role, SessionUser, UserId};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::{ApiResult, configure_api};

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Extract the session cookie set by a response.
pub fn session_cookie<B>(response: &ServiceResponse<B>) -> Cookie<'static> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie set")
}

/// Mocked driving ports; tests set expectations on the fields they need.
#[derive(Default)]
pub struct MockPorts {
    pub waitlist: MockWaitlistCommand,
    pub attendees: MockAttendeeCommand,
    pub payments: MockPaymentCommand,
    pub tickets: MockTicketCommand,
    pub tickets_query: MockTicketQuery,
    pub events: MockEventCommand,
    pub events_query: MockEventQuery,
    pub login: MockOtpLogin,
}

impl MockPorts {
    pub fn into_state(self) -> web::Data<HttpState> {
        web::Data::new(HttpState {
            waitlist: Arc::new(self.waitlist),
            attendees: Arc::new(self.attendees),
            payments: Arc::new(self.payments),
            tickets: Arc::new(self.tickets),
            tickets_query: Arc::new(self.tickets_query),
            events: Arc::new(self.events),
            events_query: Arc::new(self.events_query),
            login: Arc::new(self.login),
        })
    }
}

pub fn admin_user() -> SessionUser {
    SessionUser {
        id: UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("user id"),
        email: Some(Email::new("host@example.com").expect("email")),
        phone: None,
        role: Role::Admin,
    }
}

pub fn member_user() -> SessionUser {
    SessionUser {
        id: UserId::new("9b2f7c1e-4a3d-4f5e-8c6b-1d2e3f4a5b6c").expect("user id"),
        email: Some(Email::new("guest@example.com").expect("email")),
        phone: None,
        role: Role::Member,
    }
}

#[post("/__test/sign-in")]
async fn sign_in(
    session: SessionContext,
    user: web::Json<SessionUser>,
) -> ApiResult<HttpResponse> {
    session.persist_user(&user.into_inner())?;
    Ok(HttpResponse::NoContent().finish())
}

fn decode(body: &[u8]) -> Value {
    if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(body).expect("json body")
    }
}

/// Send a request through the `/api` routes and decode the JSON reply.
pub async fn call_json(ports: MockPorts, request: TestRequest) -> (StatusCode, Value) {
    call_json_as(ports, None, request).await
}

/// Like [`call_json`], signing `user` in first when given.
pub async fn call_json_as(
    ports: MockPorts,
    user: Option<SessionUser>,
    request: TestRequest,
) -> (StatusCode, Value) {
    let app = test::init_service(
        App::new()
            .app_data(ports.into_state())
            .wrap(test_session_middleware())
            .service(sign_in)
            .service(web::scope("/api").configure(configure_api)),
    )
    .await;

    let request = match user {
        Some(user) => {
            let response = test::call_service(
                &app,
                TestRequest::post()
                    .uri("/__test/sign-in")
                    .set_json(&user)
                    .to_request(),
            )
            .await;
            assert_eq!(response.status(), StatusCode::NO_CONTENT);
            request.cookie(session_cookie(&response))
        }
        None => request,
    };

    let response = test::call_service(&app, request.to_request()).await;
    let status = response.status();
    let body = test::read_body(response).await;
    (status, decode(&body))
}
