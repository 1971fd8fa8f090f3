//! Resumable ticket purchase wizard.
//!
//! The wizard walks `browse → identify → pay → ticket → wallet`. Its state is
//! kept in the signed session cookie so a reload, or the processor's redirect
//! back after card confirmation, resumes at the right step.

use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::{ContactDetails, Error, EventId, PaymentIntentId};

/// Session key holding the serialised [`CheckoutState`].
pub const CHECKOUT_STATE_KEY: &str = "checkout.v1.state";

/// Wizard step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    #[default]
    Browse,
    Identify,
    Pay,
    Ticket,
    Wallet,
}

impl CheckoutStep {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Browse => "browse",
            Self::Identify => "identify",
            Self::Pay => "pay",
            Self::Ticket => "ticket",
            Self::Wallet => "wallet",
        }
    }
}

/// Persisted wizard progress.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutState {
    pub step: CheckoutStep,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<EventId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form: Option<ContactDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendee_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_intent_id: Option<PaymentIntentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_id: Option<Uuid>,
}

/// Inputs that move the wizard forward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum CheckoutEvent {
    SelectEvent { event_id: Option<EventId> },
    Identified { form: ContactDetails, attendee_id: Uuid },
    PaymentCreated { payment_intent_id: PaymentIntentId },
    TicketIssued { ticket_id: Uuid },
    AddToWallet,
    Reset,
}

impl CheckoutEvent {
    fn name(&self) -> &'static str {
        match self {
            Self::SelectEvent { .. } => "selectEvent",
            Self::Identified { .. } => "identified",
            Self::PaymentCreated { .. } => "paymentCreated",
            Self::TicketIssued { .. } => "ticketIssued",
            Self::AddToWallet => "addToWallet",
            Self::Reset => "reset",
        }
    }
}

/// Rejected wizard transition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot apply {event} while at step {}", from.as_str())]
pub struct CheckoutTransitionError {
    pub from: CheckoutStep,
    pub event: &'static str,
}

impl From<CheckoutTransitionError> for Error {
    fn from(value: CheckoutTransitionError) -> Self {
        Error::conflict(value.to_string()).with_details(json!({
            "code": "invalid_transition",
            "step": value.from.as_str(),
            "event": value.event,
        }))
    }
}

impl CheckoutState {
    /// Apply a wizard event, returning the next state.
    ///
    /// # Examples
    /// ```
    /// use site_backend::domain::{CheckoutEvent, CheckoutState, CheckoutStep};
    ///
    /// let state = CheckoutState::default()
    ///     .apply(CheckoutEvent::SelectEvent { event_id: None })
    ///     .expect("select is always allowed");
    /// assert_eq!(state.step, CheckoutStep::Identify);
    /// assert!(state.apply(CheckoutEvent::AddToWallet).is_err());
    /// ```
    pub fn apply(self, event: CheckoutEvent) -> Result<Self, CheckoutTransitionError> {
        let reject = |state: &Self, event: &CheckoutEvent| CheckoutTransitionError {
            from: state.step,
            event: event.name(),
        };
        match event {
            CheckoutEvent::SelectEvent { event_id } => Ok(Self {
                step: CheckoutStep::Identify,
                event_id,
                ..Self::default()
            }),
            CheckoutEvent::Reset => Ok(Self::default()),
            CheckoutEvent::Identified { form, attendee_id }
                if matches!(self.step, CheckoutStep::Browse | CheckoutStep::Identify) =>
            {
                Ok(Self {
                    step: CheckoutStep::Pay,
                    form: Some(form),
                    attendee_id: Some(attendee_id),
                    payment_intent_id: None,
                    ticket_id: None,
                    ..self
                })
            }
            CheckoutEvent::PaymentCreated { payment_intent_id }
                if self.step == CheckoutStep::Pay =>
            {
                Ok(Self {
                    payment_intent_id: Some(payment_intent_id),
                    ..self
                })
            }
            CheckoutEvent::TicketIssued { ticket_id }
                if self.step == CheckoutStep::Pay && self.payment_intent_id.is_some() =>
            {
                Ok(Self {
                    step: CheckoutStep::Ticket,
                    ticket_id: Some(ticket_id),
                    ..self
                })
            }
            CheckoutEvent::AddToWallet if self.step == CheckoutStep::Ticket => Ok(Self {
                step: CheckoutStep::Wallet,
                ..self
            }),
            other => Err(reject(&self, &other)),
        }
    }

    /// Rebuild the wizard state when a page loads.
    ///
    /// A processor redirect takes precedence over the stored state; without
    /// one the stored state is used as-is, or a fresh state when none exists.
    pub fn restore(stored: Option<Self>, redirect: Option<PaymentRedirect>) -> Self {
        let stored = stored.unwrap_or_default();
        let Some(redirect) = redirect else {
            return stored;
        };
        let same_intent = stored.payment_intent_id.as_ref() == Some(&redirect.payment_intent_id);
        match redirect.status {
            RedirectStatus::Succeeded => {
                let base = if same_intent {
                    stored
                } else {
                    Self::default()
                };
                Self {
                    step: CheckoutStep::Ticket,
                    payment_intent_id: Some(redirect.payment_intent_id),
                    ..base
                }
            }
            RedirectStatus::Processing => Self {
                step: CheckoutStep::Pay,
                payment_intent_id: Some(redirect.payment_intent_id),
                ticket_id: None,
                ..stored
            },
            RedirectStatus::Failed | RedirectStatus::RequiresPaymentMethod => Self {
                step: CheckoutStep::Pay,
                payment_intent_id: None,
                ticket_id: None,
                ..stored
            },
        }
    }
}

/// Outcome the processor reports when redirecting back to the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedirectStatus {
    Succeeded,
    Processing,
    Failed,
    RequiresPaymentMethod,
}

impl RedirectStatus {
    /// Parse the `redirect_status` query value.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "succeeded" => Some(Self::Succeeded),
            "processing" => Some(Self::Processing),
            "failed" => Some(Self::Failed),
            "requires_payment_method" => Some(Self::RequiresPaymentMethod),
            _ => None,
        }
    }
}

/// Parameters appended to the return URL by the processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRedirect {
    pub payment_intent_id: PaymentIntentId,
    pub status: RedirectStatus,
}
