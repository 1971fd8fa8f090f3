//! Application settings loaded via OrthoConfig.
//!
//! Every field can be set through `SITE_*` environment variables, a config
//! file, or command-line flags. Absent remote credentials are not an error
//! here; the server decides whether to fall back to in-memory adapters.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;
use zeroize::Zeroizing;

use crate::domain::{AdminPolicy, Currency};
use crate::outbound::stripe::{STRIPE_API_BASE, StripeSettings};
use crate::outbound::supabase::SupabaseSettings;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:8080/";
const DEFAULT_CURRENCY: &str = "usd";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Errors raised while interpreting loaded settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
    #[error("{present} is set but {missing} is not")]
    Incomplete {
        present: &'static str,
        missing: &'static str,
    },
}

fn invalid(name: &'static str, reason: impl ToString) -> SettingsError {
    SettingsError::Invalid {
        name,
        reason: reason.to_string(),
    }
}

/// Parse a base URL, forcing a trailing slash so relative joins keep the path.
fn base_url(name: &'static str, raw: &str) -> Result<Url, SettingsError> {
    let trimmed = raw.trim();
    let normalised = if trimmed.ends_with('/') {
        trimmed.to_owned()
    } else {
        format!("{trimmed}/")
    };
    Url::parse(&normalised).map_err(|err| invalid(name, err))
}

/// Accept either one string or a list for list-valued settings.
///
/// The environment provider splits comma-separated values into a list but
/// leaves a single value as a plain string.
fn one_or_many<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(
        Option::<OneOrMany>::deserialize(deserializer)?.map(|value| match value {
            OneOrMany::One(raw) => raw.split(',').map(str::to_owned).collect(),
            OneOrMany::Many(list) => list,
        }),
    )
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Runtime settings for the site backend.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SITE")]
pub struct AppSettings {
    /// Interface to bind.
    #[ortho_config(default = DEFAULT_HOST.to_owned())]
    pub host: String,
    /// Port to bind.
    #[ortho_config(default = DEFAULT_PORT)]
    pub port: u16,
    /// Public site URL that QR scan links point at.
    pub public_base_url: Option<String>,
    /// Hosted database and auth project URL.
    pub supabase_url: Option<String>,
    /// Service key for the hosted database and auth API.
    pub supabase_service_key: Option<String>,
    /// Payment processor secret key.
    pub stripe_secret_key: Option<String>,
    /// Override for the payment processor API base.
    pub stripe_api_base: Option<String>,
    /// ISO 4217 currency for new payment intents.
    #[ortho_config(default = DEFAULT_CURRENCY.to_owned())]
    pub currency: String,
    /// Emails granted the admin role at sign-in; comma-separated in the
    /// environment.
    #[serde(default, deserialize_with = "one_or_many")]
    pub admin_emails: Option<Vec<String>>,
    /// Timeout for outbound HTTP calls, in seconds.
    #[ortho_config(default = DEFAULT_HTTP_TIMEOUT_SECS)]
    pub http_timeout_secs: u64,
}

impl AppSettings {
    /// Socket address to bind.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let ip: IpAddr = self
            .host
            .trim()
            .parse()
            .map_err(|err| invalid("host", err))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    /// Base URL for QR scan links.
    pub fn public_base_url(&self) -> Result<Url, SettingsError> {
        base_url(
            "public_base_url",
            self.public_base_url
                .as_deref()
                .unwrap_or(DEFAULT_PUBLIC_BASE_URL),
        )
    }

    pub fn currency(&self) -> Result<Currency, SettingsError> {
        Currency::new(&self.currency).map_err(|err| invalid("currency", err))
    }

    pub fn admin_policy(&self) -> AdminPolicy {
        AdminPolicy::from_emails(self.admin_emails.iter().flatten())
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs.max(1))
    }

    /// Hosted database settings, or `None` when neither field is set.
    ///
    /// Setting only one of the URL and the service key is an error.
    pub fn supabase(&self) -> Result<Option<SupabaseSettings>, SettingsError> {
        match (
            non_blank(&self.supabase_url),
            non_blank(&self.supabase_service_key),
        ) {
            (None, None) => Ok(None),
            (Some(_), None) => Err(SettingsError::Incomplete {
                present: "supabase_url",
                missing: "supabase_service_key",
            }),
            (None, Some(_)) => Err(SettingsError::Incomplete {
                present: "supabase_service_key",
                missing: "supabase_url",
            }),
            (Some(url), Some(key)) => Ok(Some(SupabaseSettings {
                base_url: base_url("supabase_url", url)?,
                service_key: Zeroizing::new(key.to_owned()),
                timeout: self.http_timeout(),
            })),
        }
    }

    /// Payment processor settings, or `None` when no secret key is set.
    pub fn stripe(&self) -> Result<Option<StripeSettings>, SettingsError> {
        let Some(key) = non_blank(&self.stripe_secret_key) else {
            return Ok(None);
        };
        let api_base = base_url(
            "stripe_api_base",
            non_blank(&self.stripe_api_base).unwrap_or(STRIPE_API_BASE),
        )?;
        Ok(Some(StripeSettings {
            api_base,
            secret_key: Zeroizing::new(key.to_owned()),
            timeout: self.http_timeout(),
        }))
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing.

    use super::*;
    use crate::domain::Email;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 10] = [
        "SITE_HOST",
        "SITE_PORT",
        "SITE_PUBLIC_BASE_URL",
        "SITE_SUPABASE_URL",
        "SITE_SUPABASE_SERVICE_KEY",
        "SITE_STRIPE_SECRET_KEY",
        "SITE_STRIPE_API_BASE",
        "SITE_CURRENCY",
        "SITE_ADMIN_EMAILS",
        "SITE_HTTP_TIMEOUT_SECS",
    ];

    fn load_with(overrides: &[(&str, &str)]) -> AppSettings {
        let _guard = lock_env(VARS.map(|name| {
            let value = overrides
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value).to_owned());
            (name, value)
        }));
        AppSettings::load_from_iter([OsString::from("site-backend")]).expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let settings = load_with(&[]);
        assert_eq!(
            settings.bind_addr().expect("addr"),
            "0.0.0.0:8080".parse().expect("socket")
        );
        assert_eq!(
            settings.public_base_url().expect("url").as_str(),
            DEFAULT_PUBLIC_BASE_URL
        );
        assert_eq!(settings.currency().expect("currency"), Currency::default());
        assert!(settings.admin_policy().is_empty());
        assert!(settings.supabase().expect("supabase").is_none());
        assert!(settings.stripe().expect("stripe").is_none());
        assert_eq!(settings.http_timeout(), Duration::from_secs(10));
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let settings = load_with(&[
            ("SITE_HOST", "127.0.0.1"),
            ("SITE_PORT", "9000"),
            ("SITE_PUBLIC_BASE_URL", "https://events.example.com/site"),
            ("SITE_SUPABASE_URL", "https://abc.supabase.co"),
            ("SITE_SUPABASE_SERVICE_KEY", "service"),
            ("SITE_STRIPE_SECRET_KEY", "sk_test_123"),
            ("SITE_CURRENCY", "EUR"),
            ("SITE_ADMIN_EMAILS", "ops@example.com, host@example.com"),
            ("SITE_HTTP_TIMEOUT_SECS", "3"),
        ]);
        assert_eq!(
            settings.bind_addr().expect("addr"),
            "127.0.0.1:9000".parse().expect("socket")
        );
        assert_eq!(
            settings.public_base_url().expect("url").as_str(),
            "https://events.example.com/site/"
        );
        assert_eq!(settings.currency().expect("currency").as_ref(), "eur");
        assert_eq!(settings.admin_policy().len(), 2);
        let supabase = settings.supabase().expect("valid").expect("configured");
        assert_eq!(supabase.base_url.as_str(), "https://abc.supabase.co/");
        assert_eq!(supabase.timeout, Duration::from_secs(3));
        let stripe = settings.stripe().expect("valid").expect("configured");
        assert_eq!(stripe.api_base.as_str(), STRIPE_API_BASE);
    }

    #[rstest]
    #[case("ops@example.com", 1)]
    #[case("ops@example.com,host@example.com", 2)]
    #[case("ops@example.com, host@example.com, door@example.com", 3)]
    #[case("ops@example.com,not-an-email", 1)]
    fn admin_lists_load_from_environment(#[case] raw: &str, #[case] expected: usize) {
        let settings = load_with(&[("SITE_ADMIN_EMAILS", raw)]);
        let policy = settings.admin_policy();
        assert_eq!(policy.len(), expected);
        assert!(policy.is_admin(&Email::new("ops@example.com").expect("email")));
    }

    #[derive(Debug, Deserialize)]
    struct AdminsOnly {
        #[serde(default, deserialize_with = "one_or_many")]
        admin_emails: Option<Vec<String>>,
    }

    #[rstest]
    #[case(serde_json::json!({"admin_emails": "a@example.com,b@example.com"}), Some(2))]
    #[case(serde_json::json!({"admin_emails": ["a@example.com", "b@example.com"]}), Some(2))]
    #[case(serde_json::json!({"admin_emails": null}), None)]
    #[case(serde_json::json!({}), None)]
    fn admin_emails_accept_strings_or_lists(
        #[case] raw: serde_json::Value,
        #[case] expected: Option<usize>,
    ) {
        let parsed: AdminsOnly = serde_json::from_value(raw).expect("deserialise");
        assert_eq!(parsed.admin_emails.map(|list| list.len()), expected);
    }

    #[rstest]
    fn half_configured_database_is_rejected() {
        let settings = load_with(&[("SITE_SUPABASE_URL", "https://abc.supabase.co")]);
        assert!(matches!(
            settings.supabase(),
            Err(SettingsError::Incomplete {
                missing: "supabase_service_key",
                ..
            })
        ));
    }

    #[rstest]
    #[case("SITE_HOST", "not-an-ip")]
    #[case("SITE_CURRENCY", "dollars")]
    fn malformed_values_are_rejected(#[case] name: &str, #[case] value: &str) {
        let settings = load_with(&[(name, value)]);
        assert!(settings.bind_addr().is_err() || settings.currency().is_err());
    }
}
