//! Payment-intent value types and the checkout metadata they carry.
//!
//! The payment processor owns the charge; the site only creates intents and
//! reads them back. Everything needed to issue a ticket later travels in the
//! intent metadata so ticket issuance needs no client-supplied fields.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ContactDetails, ContactValidationError, Email, EventId, PersonName, PhoneNumber};

/// Smallest charge the processor accepts, in minor units.
pub const MIN_AMOUNT_CENTS: u64 = 50;
/// Largest charge the site will create, in minor units.
pub const MAX_AMOUNT_CENTS: u64 = 1_000_000;
/// Largest number of tickets in a single purchase.
pub const MAX_QUANTITY: u8 = 10;

/// Validation errors for payment value types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaymentValidationError {
    #[error("amount must be between {min} and {max} cents")]
    AmountOutOfRange { min: u64, max: u64 },
    #[error("quantity must be between 1 and {max}")]
    QuantityOutOfRange { max: u8 },
    #[error("currency must be a three-letter ISO code")]
    InvalidCurrency,
    #[error("payment intent id is malformed")]
    InvalidPaymentIntentId,
    #[error("payment metadata is missing {key}")]
    MissingMetadata { key: &'static str },
    #[error("payment metadata field {key} is invalid")]
    InvalidMetadata { key: &'static str },
}

fn payment_intent_regex() -> &'static Regex {
    static PAYMENT_INTENT_RE: OnceLock<Regex> = OnceLock::new();
    PAYMENT_INTENT_RE.get_or_init(|| {
        Regex::new("^pi_[A-Za-z0-9]{8,64}$")
            .unwrap_or_else(|error| panic!("payment intent regex failed to compile: {error}"))
    })
}

/// Processor-issued payment intent identifier (`pi_...`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PaymentIntentId(String);

impl PaymentIntentId {
    /// Validate a payment intent identifier.
    ///
    /// # Examples
    /// ```
    /// use site_backend::domain::PaymentIntentId;
    ///
    /// assert!(PaymentIntentId::new("pi_3Nq1x2LkdIwHu7ix0").is_ok());
    /// assert!(PaymentIntentId::new("pi_3Nq1x2&select=*").is_err());
    /// ```
    pub fn new(raw: impl AsRef<str>) -> Result<Self, PaymentValidationError> {
        let raw = raw.as_ref();
        if !payment_intent_regex().is_match(raw) {
            return Err(PaymentValidationError::InvalidPaymentIntentId);
        }
        Ok(Self(raw.to_owned()))
    }

    /// Mint an identifier in the processor's format for in-memory gateways.
    pub fn generate() -> Self {
        Self(format!("pi_{}", Uuid::new_v4().simple()))
    }
}

impl AsRef<str> for PaymentIntentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PaymentIntentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<PaymentIntentId> for String {
    fn from(value: PaymentIntentId) -> Self {
        value.0
    }
}

impl TryFrom<String> for PaymentIntentId {
    type Error = PaymentValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Charge amount in minor currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PaymentAmount(u64);

impl PaymentAmount {
    /// Validate a charge amount.
    pub fn new(cents: u64) -> Result<Self, PaymentValidationError> {
        if !(MIN_AMOUNT_CENTS..=MAX_AMOUNT_CENTS).contains(&cents) {
            return Err(PaymentValidationError::AmountOutOfRange {
                min: MIN_AMOUNT_CENTS,
                max: MAX_AMOUNT_CENTS,
            });
        }
        Ok(Self(cents))
    }

    pub fn cents(self) -> u64 {
        self.0
    }
}

/// Lowercase ISO 4217 currency code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Currency(String);

impl Currency {
    /// Validate and lowercase a currency code.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, PaymentValidationError> {
        let code = raw.as_ref().trim().to_ascii_lowercase();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_lowercase()) {
            return Err(PaymentValidationError::InvalidCurrency);
        }
        Ok(Self(code))
    }
}

impl AsRef<str> for Currency {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self("usd".to_owned())
    }
}

/// Number of tickets in one purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quantity(u8);

impl Quantity {
    /// Validate a ticket quantity.
    pub fn new(value: u8) -> Result<Self, PaymentValidationError> {
        if value == 0 || value > MAX_QUANTITY {
            return Err(PaymentValidationError::QuantityOutOfRange { max: MAX_QUANTITY });
        }
        Ok(Self(value))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self(1)
    }
}

/// Checkout form fields submitted with a payment request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutForm {
    pub contact: ContactDetails,
    pub event_id: Option<EventId>,
    pub quantity: Quantity,
}

const META_NAME: &str = "name";
const META_EMAIL: &str = "email";
const META_PHONE: &str = "phone";
const META_EVENT_ID: &str = "eventId";
const META_QUANTITY: &str = "quantity";

impl CheckoutForm {
    /// Flatten the form into processor metadata.
    pub fn to_metadata(&self) -> BTreeMap<String, String> {
        let mut metadata = BTreeMap::new();
        metadata.insert(META_NAME.to_owned(), self.contact.name.to_string());
        metadata.insert(META_EMAIL.to_owned(), self.contact.email.to_string());
        metadata.insert(META_PHONE.to_owned(), self.contact.phone.to_string());
        metadata.insert(META_QUANTITY.to_owned(), self.quantity.get().to_string());
        if let Some(event_id) = self.event_id {
            metadata.insert(META_EVENT_ID.to_owned(), event_id.to_string());
        }
        metadata
    }

    /// Rebuild the form from processor metadata.
    ///
    /// # Examples
    /// ```
    /// use site_backend::domain::{CheckoutForm, ContactDetails, Quantity};
    ///
    /// let form = CheckoutForm {
    ///     contact: ContactDetails::try_from_parts("Ada", "ada@example.com", "4155550100")
    ///         .expect("contact"),
    ///     event_id: None,
    ///     quantity: Quantity::new(2).expect("quantity"),
    /// };
    /// let restored = CheckoutForm::from_metadata(&form.to_metadata()).expect("metadata");
    /// assert_eq!(restored, form);
    /// ```
    pub fn from_metadata(
        metadata: &BTreeMap<String, String>,
    ) -> Result<Self, PaymentValidationError> {
        fn required<'a>(
            metadata: &'a BTreeMap<String, String>,
            key: &'static str,
        ) -> Result<&'a str, PaymentValidationError> {
            metadata
                .get(key)
                .map(String::as_str)
                .ok_or(PaymentValidationError::MissingMetadata { key })
        }
        let invalid = |key: &'static str| {
            move |_: ContactValidationError| PaymentValidationError::InvalidMetadata { key }
        };

        let contact = ContactDetails {
            name: PersonName::new(required(metadata, META_NAME)?).map_err(invalid(META_NAME))?,
            email: Email::new(required(metadata, META_EMAIL)?).map_err(invalid(META_EMAIL))?,
            phone: PhoneNumber::new(required(metadata, META_PHONE)?)
                .map_err(invalid(META_PHONE))?,
        };
        let quantity = match metadata.get(META_QUANTITY) {
            Some(raw) => raw
                .parse::<u8>()
                .ok()
                .and_then(|value| Quantity::new(value).ok())
                .ok_or(PaymentValidationError::InvalidMetadata { key: META_QUANTITY })?,
            None => Quantity::default(),
        };
        let event_id = metadata
            .get(META_EVENT_ID)
            .map(|raw| {
                Uuid::parse_str(raw)
                    .map(EventId::from_uuid)
                    .map_err(|_| PaymentValidationError::InvalidMetadata { key: META_EVENT_ID })
            })
            .transpose()?;

        Ok(Self {
            contact,
            event_id,
            quantity,
        })
    }
}

/// Processor-side lifecycle of a payment intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    RequiresPaymentMethod,
    RequiresConfirmation,
    RequiresAction,
    Processing,
    RequiresCapture,
    Canceled,
    Succeeded,
    #[serde(other)]
    Unknown,
}

impl PaymentStatus {
    /// Wire representation of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RequiresPaymentMethod => "requires_payment_method",
            Self::RequiresConfirmation => "requires_confirmation",
            Self::RequiresAction => "requires_action",
            Self::Processing => "processing",
            Self::RequiresCapture => "requires_capture",
            Self::Canceled => "canceled",
            Self::Succeeded => "succeeded",
            Self::Unknown => "unknown",
        }
    }
}

/// Request to create a payment intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePaymentIntent {
    pub amount: PaymentAmount,
    pub currency: Currency,
    pub receipt_email: Email,
    pub metadata: BTreeMap<String, String>,
}

/// Payment intent as reported by the processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntent {
    pub id: PaymentIntentId,
    pub client_secret: String,
    pub status: PaymentStatus,
    pub amount_cents: u64,
    pub currency: String,
    pub metadata: BTreeMap<String, String>,
}

/// Values handed back to the browser after creating an intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedPaymentIntent {
    pub client_secret: String,
    pub payment_intent_id: PaymentIntentId,
}
