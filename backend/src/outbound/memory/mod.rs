//! Process-local adapters used when no hosted services are configured.
//!
//! State is lost on restart. Debug builds fall back to these adapters so the
//! site runs without credentials; release builds refuse to start without the
//! hosted adapters.

mod identity;
mod payments;
mod repositories;

pub use identity::{LOCAL_OTP_CODE, MemoryIdentityProvider};
pub use payments::MemoryPaymentGateway;
pub use repositories::{
    MemoryAttendeeRepository, MemoryEventRepository, MemoryTicketRepository,
    MemoryWaitlistRepository,
};
