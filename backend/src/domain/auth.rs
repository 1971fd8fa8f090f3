//! One-time-passcode sign-in primitives.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use std::collections::BTreeSet;
use std::fmt;

use zeroize::Zeroizing;

use super::{ContactValidationError, Email, PhoneNumber, Role, SessionUser, UserId};

/// Number of digits in a one-time passcode.
pub const OTP_LENGTH: usize = 6;

/// Domain error returned when sign-in payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OtpValidationError {
    /// Neither an email nor a phone number was supplied.
    MissingTarget,
    /// Both an email and a phone number were supplied.
    AmbiguousTarget,
    /// The supplied email or phone failed validation.
    InvalidTarget(ContactValidationError),
    /// The passcode was not exactly six digits.
    InvalidCode,
}

impl OtpValidationError {
    /// Request field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingTarget | Self::AmbiguousTarget => "email",
            Self::InvalidTarget(inner) => inner.field(),
            Self::InvalidCode => "token",
        }
    }

    /// Stable machine-readable code for clients.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingTarget => "missing_target",
            Self::AmbiguousTarget => "ambiguous_target",
            Self::InvalidTarget(inner) => inner.code(),
            Self::InvalidCode => "invalid_token",
        }
    }
}

impl fmt::Display for OtpValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingTarget => write!(f, "either email or phone is required"),
            Self::AmbiguousTarget => write!(f, "supply either email or phone, not both"),
            Self::InvalidTarget(inner) => write!(f, "{inner}"),
            Self::InvalidCode => write!(f, "token must be {OTP_LENGTH} digits"),
        }
    }
}

impl std::error::Error for OtpValidationError {}

/// Where a one-time passcode is delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OtpTarget {
    Email(Email),
    Phone(PhoneNumber),
}

impl OtpTarget {
    /// Build a target from optional raw fields; exactly one must be present.
    ///
    /// # Examples
    /// ```
    /// use site_backend::domain::{OtpTarget, OtpValidationError};
    ///
    /// let target = OtpTarget::try_from_parts(Some("ada@example.com"), None).unwrap();
    /// assert!(matches!(target, OtpTarget::Email(_)));
    /// assert_eq!(
    ///     OtpTarget::try_from_parts(None, None),
    ///     Err(OtpValidationError::MissingTarget)
    /// );
    /// ```
    pub fn try_from_parts(
        email: Option<&str>,
        phone: Option<&str>,
    ) -> Result<Self, OtpValidationError> {
        let email = email.filter(|value| !value.trim().is_empty());
        let phone = phone.filter(|value| !value.trim().is_empty());
        match (email, phone) {
            (Some(_), Some(_)) => Err(OtpValidationError::AmbiguousTarget),
            (None, None) => Err(OtpValidationError::MissingTarget),
            (Some(email), None) => Email::new(email)
                .map(Self::Email)
                .map_err(OtpValidationError::InvalidTarget),
            (None, Some(phone)) => PhoneNumber::new(phone)
                .map(Self::Phone)
                .map_err(OtpValidationError::InvalidTarget),
        }
    }
}

/// Six-digit passcode, wiped from memory on drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpCode(Zeroizing<String>);

impl OtpCode {
    /// Validate a passcode.
    pub fn new(raw: &str) -> Result<Self, OtpValidationError> {
        let trimmed = raw.trim();
        if trimmed.len() != OTP_LENGTH || !trimmed.chars().all(|c| c.is_ascii_digit()) {
            return Err(OtpValidationError::InvalidCode);
        }
        Ok(Self(Zeroizing::new(trimmed.to_owned())))
    }

    /// Passcode digits.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// User identity confirmed by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub user_id: UserId,
    pub email: Option<Email>,
    pub phone: Option<PhoneNumber>,
}

/// Decides which verified users are site admins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminPolicy {
    admin_emails: BTreeSet<Email>,
}

impl AdminPolicy {
    /// Build a policy from a comma-separated email list, skipping blanks and
    /// entries that are not valid addresses.
    ///
    /// # Examples
    /// ```
    /// use site_backend::domain::{AdminPolicy, Email};
    ///
    /// let policy = AdminPolicy::from_csv("Ops@Example.com, ,nonsense");
    /// assert!(policy.is_admin(&Email::new("ops@example.com").unwrap()));
    /// assert_eq!(policy.len(), 1);
    /// ```
    pub fn from_csv(raw: &str) -> Self {
        Self::from_emails(raw.split(','))
    }

    /// Build a policy from individual addresses. Blank and invalid entries
    /// are skipped.
    pub fn from_emails<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let admin_emails = emails
            .into_iter()
            .filter_map(|value| Email::new(value.as_ref().trim()).ok())
            .collect();
        Self { admin_emails }
    }

    pub fn is_admin(&self, email: &Email) -> bool {
        self.admin_emails.contains(email)
    }

    pub fn len(&self) -> usize {
        self.admin_emails.len()
    }

    pub fn is_empty(&self) -> bool {
        self.admin_emails.is_empty()
    }

    /// Session identity for a verified user.
    pub fn session_user(&self, identity: VerifiedIdentity) -> SessionUser {
        let role = match &identity.email {
            Some(email) if self.is_admin(email) => Role::Admin,
            _ => Role::Member,
        };
        SessionUser {
            id: identity.user_id,
            email: identity.email,
            phone: identity.phone,
            role,
        }
    }
}
