//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! Provides a thin wrapper around Actix sessions so handlers only deal with
//! domain-friendly operations: the signed-in user and the checkout wizard
//! state. Both live in the private session cookie.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::domain::{CHECKOUT_STATE_KEY, CheckoutState, Error, SessionUser};

pub(crate) const USER_KEY: &str = "auth.v1.user";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.0.get::<T>(key) {
            Ok(value) => value,
            Err(error) => {
                // Stale or foreign shapes are dropped rather than failing the request.
                warn!(key, %error, "discarding unreadable session value");
                self.0.remove(key);
                None
            }
        }
    }

    fn write<T: Serialize>(&self, key: &str, value: &T) -> Result<(), Error> {
        self.0
            .insert(key, value)
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Persist the signed-in user in the session cookie.
    ///
    /// The session id is renewed so a pre-login cookie cannot be reused.
    pub fn persist_user(&self, user: &SessionUser) -> Result<(), Error> {
        self.0.renew();
        self.write(USER_KEY, user)
    }

    /// The signed-in user, if any.
    pub fn user(&self) -> Option<SessionUser> {
        self.read(USER_KEY)
    }

    /// Require a signed-in user or return `401 Unauthorized`.
    pub fn require_user(&self) -> Result<SessionUser, Error> {
        self.user()
            .ok_or_else(|| Error::unauthorized("sign in required"))
    }

    /// Drop everything stored in the session, including checkout progress.
    pub fn logout(&self) {
        self.0.purge();
    }

    /// Stored checkout wizard state, if any.
    pub fn checkout_state(&self) -> Option<CheckoutState> {
        self.read(CHECKOUT_STATE_KEY)
    }

    pub fn persist_checkout(&self, state: &CheckoutState) -> Result<(), Error> {
        self.write(CHECKOUT_STATE_KEY, state)
    }

    pub fn clear_checkout(&self) {
        self.0.remove(CHECKOUT_STATE_KEY);
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
