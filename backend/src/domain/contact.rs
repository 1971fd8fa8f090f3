//! Contact details shared by waitlist signups, attendees and checkout forms.
//!
//! Every inbound form in the site collects the same three fields. The types in
//! this module normalise them once so repositories can compare stored rows by
//! value: emails are lowercased, phone numbers lose their punctuation.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Maximum accepted email length, per RFC 5321 path limits.
pub const EMAIL_MAX: usize = 254;
/// Maximum accepted display name length.
pub const NAME_MAX: usize = 100;

/// Validation errors raised while building contact details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ContactValidationError {
    #[error("name must not be empty")]
    EmptyName,
    #[error("name must be at most {max} characters")]
    NameTooLong { max: usize },
    #[error("email must be a valid email address")]
    InvalidEmail,
    #[error("phone must be a valid phone number")]
    InvalidPhone,
}

impl ContactValidationError {
    /// Request field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyName | Self::NameTooLong { .. } => "name",
            Self::InvalidEmail => "email",
            Self::InvalidPhone => "phone",
        }
    }

    /// Stable machine-readable code for clients.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyName => "empty_name",
            Self::NameTooLong { .. } => "name_too_long",
            Self::InvalidEmail => "invalid_email",
            Self::InvalidPhone => "invalid_phone",
        }
    }
}

fn email_regex() -> &'static Regex {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

fn phone_regex() -> &'static Regex {
    static PHONE_RE: OnceLock<Regex> = OnceLock::new();
    PHONE_RE.get_or_init(|| {
        Regex::new(r"^\+?[0-9]{7,15}$")
            .unwrap_or_else(|error| panic!("phone regex failed to compile: {error}"))
    })
}

/// Lowercased, trimmed email address.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Validate and normalise an email address.
    ///
    /// # Examples
    /// ```
    /// use site_backend::domain::Email;
    ///
    /// let email = Email::new("  Ada@Example.COM ").expect("valid email");
    /// assert_eq!(email.as_ref(), "ada@example.com");
    /// assert!(Email::new("not-an-email").is_err());
    /// ```
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ContactValidationError> {
        let normalised = raw.as_ref().trim().to_lowercase();
        if normalised.len() > EMAIL_MAX || !email_regex().is_match(&normalised) {
            return Err(ContactValidationError::InvalidEmail);
        }
        Ok(Self(normalised))
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl TryFrom<String> for Email {
    type Error = ContactValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Phone number stored as digits with an optional leading `+`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Validate a phone number after stripping common punctuation.
    ///
    /// # Examples
    /// ```
    /// use site_backend::domain::PhoneNumber;
    ///
    /// let phone = PhoneNumber::new("+1 (415) 555-0100").expect("valid phone");
    /// assert_eq!(phone.as_ref(), "+14155550100");
    /// ```
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ContactValidationError> {
        let compact: String = raw
            .as_ref()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
            .collect();
        if !phone_regex().is_match(&compact) {
            return Err(ContactValidationError::InvalidPhone);
        }
        Ok(Self(compact))
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<PhoneNumber> for String {
    fn from(value: PhoneNumber) -> Self {
        value.0
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = ContactValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Trimmed, non-empty person name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PersonName(String);

impl PersonName {
    /// Validate and trim a person name.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ContactValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ContactValidationError::EmptyName);
        }
        if trimmed.chars().count() > NAME_MAX {
            return Err(ContactValidationError::NameTooLong { max: NAME_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for PersonName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PersonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<PersonName> for String {
    fn from(value: PersonName) -> Self {
        value.0
    }
}

impl TryFrom<String> for PersonName {
    type Error = ContactValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Validated name, email and phone triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    pub name: PersonName,
    pub email: Email,
    pub phone: PhoneNumber,
}

impl ContactDetails {
    /// Validate raw form fields, reporting the first invalid one in form order.
    ///
    /// # Examples
    /// ```
    /// use site_backend::domain::{ContactDetails, ContactValidationError};
    ///
    /// let details = ContactDetails::try_from_parts("Ada", "ada@example.com", "4155550100")
    ///     .expect("valid contact");
    /// assert_eq!(details.name.as_ref(), "Ada");
    ///
    /// let err = ContactDetails::try_from_parts("", "ada@example.com", "4155550100")
    ///     .expect_err("name is required");
    /// assert_eq!(err, ContactValidationError::EmptyName);
    /// ```
    pub fn try_from_parts(
        name: &str,
        email: &str,
        phone: &str,
    ) -> Result<Self, ContactValidationError> {
        Ok(Self {
            name: PersonName::new(name)?,
            email: Email::new(email)?,
            phone: PhoneNumber::new(phone)?,
        })
    }
}

/// Stored records that carry an email and phone number.
pub trait ContactRecord {
    /// Record identity used to tell two lookups apart.
    fn record_key(&self) -> String;
    /// Stored email address.
    fn email(&self) -> &Email;
    /// Stored phone number.
    fn phone(&self) -> &PhoneNumber;
}

/// Outcome of looking up a contact by email and by phone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityMatch<T> {
    /// Neither the email nor the phone is known.
    New,
    /// Both fields point at the same stored record.
    Existing(T),
    /// The email is known but registered with another phone number.
    EmailTakenWithDifferentPhone(T),
    /// The phone is known but registered with another email address.
    PhoneTakenWithDifferentEmail(T),
    /// The email and phone belong to two different stored records.
    Split { by_email: T, by_phone: T },
}

/// Classify the results of an email lookup and a phone lookup.
///
/// # Examples
/// ```
/// use site_backend::domain::{match_identity, Email, IdentityMatch, PhoneNumber};
///
/// let email = Email::new("ada@example.com").expect("email");
/// let phone = PhoneNumber::new("4155550100").expect("phone");
/// let outcome = match_identity::<site_backend::domain::WaitlistEntry>(None, None, &email, &phone);
/// assert_eq!(outcome, IdentityMatch::New);
/// ```
pub fn match_identity<T: ContactRecord>(
    by_email: Option<T>,
    by_phone: Option<T>,
    email: &Email,
    phone: &PhoneNumber,
) -> IdentityMatch<T> {
    match (by_email, by_phone) {
        (None, None) => IdentityMatch::New,
        (Some(by_email), Some(by_phone)) => {
            if by_email.record_key() == by_phone.record_key() {
                IdentityMatch::Existing(by_email)
            } else {
                IdentityMatch::Split { by_email, by_phone }
            }
        }
        (Some(record), None) => {
            if record.phone() == phone {
                IdentityMatch::Existing(record)
            } else {
                IdentityMatch::EmailTakenWithDifferentPhone(record)
            }
        }
        (None, Some(record)) => {
            if record.email() == email {
                IdentityMatch::Existing(record)
            } else {
                IdentityMatch::PhoneTakenWithDifferentEmail(record)
            }
        }
    }
}
