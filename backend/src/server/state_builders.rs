//! Builders for HTTP state ports from configured adapters.
//!
//! Hosted adapters are used when their settings are present. Otherwise the
//! in-memory adapters stand in, which debug builds allow with a warning and
//! release builds refuse.

use std::io;
use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;
use tracing::{info, warn};

use site_backend::domain::ports::{
    AttendeeRepository, EventRepository, IdentityProvider, PaymentGateway, TicketRepository,
    WaitlistRepository,
};
use site_backend::domain::{
    AttendeeService, AuthService, EventService, PaymentService, TicketService, WaitlistService,
};
use site_backend::inbound::http::session_config::BuildMode;
use site_backend::inbound::http::state::HttpState;
use site_backend::outbound::memory::{
    LOCAL_OTP_CODE, MemoryAttendeeRepository, MemoryEventRepository, MemoryIdentityProvider,
    MemoryPaymentGateway, MemoryTicketRepository, MemoryWaitlistRepository,
};
use site_backend::outbound::stripe::StripeGateway;
use site_backend::outbound::supabase::{
    SupabaseAttendeeRepository, SupabaseAuthProvider, SupabaseClient, SupabaseEventRepository,
    SupabaseTicketRepository, SupabaseWaitlistRepository,
};
use site_backend::settings::AppSettings;

/// Driven adapters the services are built from.
pub(crate) struct Adapters {
    waitlist: Arc<dyn WaitlistRepository>,
    attendees: Arc<dyn AttendeeRepository>,
    tickets: Arc<dyn TicketRepository>,
    events: Arc<dyn EventRepository>,
    identity: Arc<dyn IdentityProvider>,
    payments: Arc<dyn PaymentGateway>,
}

fn config_error(err: impl std::fmt::Display) -> io::Error {
    io::Error::other(format!("invalid configuration: {err}"))
}

fn require_hosted(mode: BuildMode, what: &str) -> io::Result<()> {
    match mode {
        BuildMode::Debug => {
            warn!(adapter = what, "not configured; using in-memory adapter (dev only)");
            Ok(())
        }
        BuildMode::Release => Err(io::Error::other(format!(
            "{what} must be configured in release builds"
        ))),
    }
}

impl Adapters {
    /// Select adapters from `settings`.
    ///
    /// # Errors
    /// Returns an error for invalid settings, or when a hosted service is not
    /// configured in a release build.
    pub(crate) fn from_settings(settings: &AppSettings, mode: BuildMode) -> io::Result<Self> {
        let mut adapters = match settings.supabase().map_err(config_error)? {
            Some(supabase) => {
                info!(base_url = %supabase.base_url, "using hosted database and auth");
                let client = Arc::new(SupabaseClient::new(supabase).map_err(io::Error::other)?);
                Self {
                    waitlist: Arc::new(SupabaseWaitlistRepository::new(client.clone())),
                    attendees: Arc::new(SupabaseAttendeeRepository::new(client.clone())),
                    tickets: Arc::new(SupabaseTicketRepository::new(client.clone())),
                    events: Arc::new(SupabaseEventRepository::new(client.clone())),
                    identity: Arc::new(SupabaseAuthProvider::new(client)),
                    payments: Arc::new(MemoryPaymentGateway::new(true)),
                }
            }
            None => {
                require_hosted(mode, "database and auth")?;
                Self::memory()
            }
        };

        match settings.stripe().map_err(config_error)? {
            Some(stripe) => {
                adapters.payments = Arc::new(StripeGateway::new(stripe).map_err(io::Error::other)?);
            }
            None => require_hosted(mode, "payment processor")?,
        }
        Ok(adapters)
    }

    /// In-memory adapters with auto-confirmed payments and the fixed local
    /// passcode.
    pub(crate) fn memory() -> Self {
        Self {
            waitlist: Arc::new(MemoryWaitlistRepository::new()),
            attendees: Arc::new(MemoryAttendeeRepository::new()),
            tickets: Arc::new(MemoryTicketRepository::new()),
            events: Arc::new(MemoryEventRepository::new()),
            identity: Arc::new(MemoryIdentityProvider::new(LOCAL_OTP_CODE)),
            payments: Arc::new(MemoryPaymentGateway::new(true)),
        }
    }
}

/// Wire domain services over `adapters` into the handler state.
///
/// # Errors
/// Returns an error when the public base URL or currency is invalid.
pub(crate) fn build_http_state(
    adapters: Adapters,
    settings: &AppSettings,
) -> io::Result<web::Data<HttpState>> {
    let Adapters {
        waitlist,
        attendees,
        tickets,
        events,
        identity,
        payments,
    } = adapters;
    let public_base_url = settings.public_base_url().map_err(config_error)?;
    let currency = settings.currency().map_err(config_error)?;
    let admins = settings.admin_policy();
    if admins.is_empty() {
        warn!("no admin emails configured; event management and scanning are disabled");
    }

    let tickets = Arc::new(TicketService::new(
        tickets,
        payments.clone(),
        Arc::new(DefaultClock),
        public_base_url,
    ));
    let payment_service = PaymentService::new(events.clone(), payments, currency);
    let events = Arc::new(EventService::new(events, Arc::new(DefaultClock)));

    Ok(web::Data::new(HttpState {
        waitlist: Arc::new(WaitlistService::new(waitlist, Arc::new(DefaultClock))),
        attendees: Arc::new(AttendeeService::new(attendees, Arc::new(DefaultClock))),
        payments: Arc::new(payment_service),
        tickets: tickets.clone(),
        tickets_query: tickets,
        events: events.clone(),
        events_query: events,
        login: Arc::new(AuthService::new(identity, admins)),
    }))
}
