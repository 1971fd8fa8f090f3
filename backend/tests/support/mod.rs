//! Shared harness for backend integration tests.
//!
//! Wires the real domain services over the in-memory adapters and mounts the
//! `/api` routes the same way the server binary does, so tests exercise whole
//! flows without network access.

#![allow(dead_code)]

use std::sync::Arc;

use actix_session::SessionMiddleware;
use actix_session::storage::CookieSessionStore;
use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use actix_web::{App, web};
use mockable::DefaultClock;
use serde_json::Value;
use url::Url;

use site_backend::Trace;
use site_backend::domain::{
    AdminPolicy, AttendeeService, AuthService, Currency, EventService, PaymentService,
    TicketService, WaitlistService,
};
use site_backend::inbound::http::configure_api;
use site_backend::inbound::http::state::HttpState;
use site_backend::outbound::memory::{
    LOCAL_OTP_CODE, MemoryAttendeeRepository, MemoryEventRepository, MemoryIdentityProvider,
    MemoryPaymentGateway, MemoryTicketRepository, MemoryWaitlistRepository,
};

pub const ADMIN_EMAIL: &str = "host@example.com";
pub const PUBLIC_BASE_URL: &str = "https://events.example.com/";

/// In-memory site with handles on the adapters tests need to steer.
pub struct Site {
    pub gateway: Arc<MemoryPaymentGateway>,
    pub waitlist: Arc<MemoryWaitlistRepository>,
    pub state: web::Data<HttpState>,
    key: Key,
}

impl Site {
    /// Build a site whose payments stay pending until confirmed by the test.
    pub fn new() -> Self {
        let gateway = Arc::new(MemoryPaymentGateway::new(false));
        let waitlist = Arc::new(MemoryWaitlistRepository::new());
        let events = Arc::new(MemoryEventRepository::new());
        let tickets = Arc::new(TicketService::new(
            Arc::new(MemoryTicketRepository::new()),
            gateway.clone(),
            Arc::new(DefaultClock),
            Url::parse(PUBLIC_BASE_URL).expect("base url"),
        ));
        let event_service = Arc::new(EventService::new(events.clone(), Arc::new(DefaultClock)));
        let state = web::Data::new(HttpState {
            waitlist: Arc::new(WaitlistService::new(waitlist.clone(), Arc::new(DefaultClock))),
            attendees: Arc::new(AttendeeService::new(
                Arc::new(MemoryAttendeeRepository::new()),
                Arc::new(DefaultClock),
            )),
            payments: Arc::new(PaymentService::new(
                events,
                gateway.clone(),
                Currency::default(),
            )),
            tickets: tickets.clone(),
            tickets_query: tickets,
            events: event_service.clone(),
            events_query: event_service,
            login: Arc::new(AuthService::new(
                Arc::new(MemoryIdentityProvider::new(LOCAL_OTP_CODE)),
                AdminPolicy::from_csv(ADMIN_EMAIL),
            )),
        });
        Self {
            gateway,
            waitlist,
            state,
            key: Key::generate(),
        }
    }

    /// Application factory mirroring the server's route layout.
    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        let session = SessionMiddleware::builder(CookieSessionStore::default(), self.key.clone())
            .cookie_name("session".to_owned())
            .cookie_secure(false)
            .build();
        App::new()
            .app_data(self.state.clone())
            .wrap(Trace)
            .service(web::scope("/api").wrap(session).configure(configure_api))
    }
}

/// Cookie jar for one browser session.
#[derive(Default)]
pub struct Browser {
    cookie: Option<Cookie<'static>>,
}

impl Browser {
    pub fn get(&self, uri: &str) -> TestRequest {
        self.attach(TestRequest::get().uri(uri))
    }

    pub fn post(&self, uri: &str, body: Value) -> TestRequest {
        self.attach(TestRequest::post().uri(uri).set_json(body))
    }

    pub fn put(&self, uri: &str, body: Value) -> TestRequest {
        self.attach(TestRequest::put().uri(uri).set_json(body))
    }

    pub fn delete(&self, uri: &str) -> TestRequest {
        self.attach(TestRequest::delete().uri(uri))
    }

    fn attach(&self, request: TestRequest) -> TestRequest {
        match &self.cookie {
            Some(cookie) => request.cookie(cookie.clone()),
            None => request,
        }
    }

    /// Keep the session cookie a response sets, if any.
    pub fn remember<B>(&mut self, response: &ServiceResponse<B>) {
        if let Some(cookie) = response
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
        {
            self.cookie = Some(cookie.into_owned());
        }
    }
}

/// Status and decoded JSON body; an empty body decodes to `null`.
pub async fn json<B: MessageBody>(response: ServiceResponse<B>) -> (StatusCode, Value) {
    let status = response.status();
    let body = test::read_body(response).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("json body")
    };
    (status, value)
}

/// Sign `$browser` in through the one-time code flow and evaluate to the
/// session body.
#[allow(unused_macros)]
macro_rules! sign_in {
    ($app:expr, $browser:expr, $email:expr) => {{
        let response = actix_web::test::call_service(
            &$app,
            $browser
                .post("/api/auth/otp", serde_json::json!({"email": $email}))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), actix_web::http::StatusCode::OK);

        let response = actix_web::test::call_service(
            &$app,
            $browser
                .post(
                    "/api/auth/verify",
                    serde_json::json!({"email": $email, "token": "000000"}),
                )
                .to_request(),
        )
        .await;
        $browser.remember(&response);
        let (status, body) = $crate::support::json(response).await;
        assert_eq!(status, actix_web::http::StatusCode::OK);
        body
    }};
}
