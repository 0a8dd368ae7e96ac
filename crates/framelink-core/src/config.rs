//! Client configuration.
//!
//! Every field has a default so `ClientConfig::default()` talks to the public
//! Framelink service. Values can be overridden with the `with_*` builders or
//! loaded from `FRAMELINK_*` environment variables.

use std::collections::HashMap;
use std::env;
use std::fmt;
use std::time::Duration;

use crate::polling::PollOptions;
use crate::{Error, Result};

/// Default base URL of the frame API.
pub const DEFAULT_API_BASE_URL: &str = "https://api.framelink.app";
/// Default base URL of the user service (credential exchange).
pub const DEFAULT_USER_BASE_URL: &str = "https://user.framelink.app";
/// Default application access key.
pub const DEFAULT_ACCESS_KEY: &str = "framelink-client";
/// Default application secret key.
pub const DEFAULT_SECRET_KEY: &str = "framelink-client-secret";
/// Default brand identifier sent to the user service.
pub const DEFAULT_BRAND_ID: &str = "1";
/// Default product identifier sent to the user service.
pub const DEFAULT_PRODUCT_ID: &str = "1";
/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub user_base_url: String,
    pub secret_key: String,
    pub access_key: String,
    pub brand_id: String,
    pub product_id: String,
    pub request_timeout: Duration,
    pub login_poll: PollOptions,
    pub upload_poll: PollOptions,
    pub revoke_poll: PollOptions,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            user_base_url: DEFAULT_USER_BASE_URL.to_string(),
            secret_key: DEFAULT_SECRET_KEY.to_string(),
            access_key: DEFAULT_ACCESS_KEY.to_string(),
            brand_id: DEFAULT_BRAND_ID.to_string(),
            product_id: DEFAULT_PRODUCT_ID.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            login_poll: PollOptions::login(),
            upload_poll: PollOptions::upload(),
            revoke_poll: PollOptions::revoke(),
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ClientConfig")
            .field("api_base_url", &self.api_base_url)
            .field("user_base_url", &self.user_base_url)
            .field("secret_key", &"[REDACTED]")
            .field("access_key", &self.access_key)
            .field("brand_id", &self.brand_id)
            .field("product_id", &self.product_id)
            .field("request_timeout", &self.request_timeout)
            .field("login_poll", &self.login_poll)
            .field("upload_poll", &self.upload_poll)
            .field("revoke_poll", &self.revoke_poll)
            .finish()
    }
}

impl ClientConfig {
    /// Load configuration from `FRAMELINK_*` environment variables,
    /// falling back to defaults for anything unset.
    pub fn from_env() -> Result<Self> {
        let values: HashMap<String, String> = env::vars().collect();
        Self::from_lookup(|name| values.get(name).cloned())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let api_base_url = normalize_base_url(
            &value_or_default(&lookup, "FRAMELINK_API_URL", &defaults.api_base_url),
            "FRAMELINK_API_URL",
        )?;
        let user_base_url = normalize_base_url(
            &value_or_default(&lookup, "FRAMELINK_USER_URL", &defaults.user_base_url),
            "FRAMELINK_USER_URL",
        )?;
        let secret_key = value_or_default(&lookup, "FRAMELINK_SECRET_KEY", &defaults.secret_key);
        let access_key = value_or_default(&lookup, "FRAMELINK_ACCESS_KEY", &defaults.access_key);
        let brand_id = value_or_default(&lookup, "FRAMELINK_BRAND_ID", &defaults.brand_id);
        let product_id = value_or_default(&lookup, "FRAMELINK_PRODUCT_ID", &defaults.product_id);

        let request_timeout = match optional_trimmed(&lookup, "FRAMELINK_REQUEST_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = parse_u64(&raw, "FRAMELINK_REQUEST_TIMEOUT_SECS")?;
                if secs == 0 {
                    return Err(Error::InvalidConfiguration(
                        "FRAMELINK_REQUEST_TIMEOUT_SECS must be > 0".to_string(),
                    ));
                }
                Duration::from_secs(secs)
            }
            None => defaults.request_timeout,
        };

        let interval = match optional_trimmed(&lookup, "FRAMELINK_POLL_INTERVAL_MS") {
            Some(raw) => {
                let millis = parse_u64(&raw, "FRAMELINK_POLL_INTERVAL_MS")?;
                if millis == 0 {
                    return Err(Error::InvalidConfiguration(
                        "FRAMELINK_POLL_INTERVAL_MS must be > 0".to_string(),
                    ));
                }
                Some(Duration::from_millis(millis))
            }
            None => None,
        };

        let login_poll = poll_options(
            &lookup,
            "FRAMELINK_LOGIN_POLL_ATTEMPTS",
            defaults.login_poll,
            interval,
        )?;
        let upload_poll = poll_options(
            &lookup,
            "FRAMELINK_UPLOAD_POLL_ATTEMPTS",
            defaults.upload_poll,
            interval,
        )?;
        let revoke_poll = poll_options(
            &lookup,
            "FRAMELINK_REVOKE_POLL_ATTEMPTS",
            defaults.revoke_poll,
            interval,
        )?;

        Ok(Self {
            api_base_url,
            user_base_url,
            secret_key,
            access_key,
            brand_id,
            product_id,
            request_timeout,
            login_poll,
            upload_poll,
            revoke_poll,
        })
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn with_user_base_url(mut self, url: impl Into<String>) -> Self {
        self.user_base_url = url.into();
        self
    }

    pub fn with_keys(mut self, access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        self.access_key = access_key.into();
        self.secret_key = secret_key.into();
        self
    }

    pub fn with_brand(mut self, brand_id: impl Into<String>, product_id: impl Into<String>) -> Self {
        self.brand_id = brand_id.into();
        self.product_id = product_id.into();
        self
    }

    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub const fn with_login_poll(mut self, options: PollOptions) -> Self {
        self.login_poll = options;
        self
    }

    pub const fn with_upload_poll(mut self, options: PollOptions) -> Self {
        self.upload_poll = options;
        self
    }

    pub const fn with_revoke_poll(mut self, options: PollOptions) -> Self {
        self.revoke_poll = options;
        self
    }

    /// Checks URLs and keys, returning a normalized copy.
    pub fn validated(mut self) -> Result<Self> {
        self.api_base_url = normalize_base_url(&self.api_base_url, "api_base_url")?;
        self.user_base_url = normalize_base_url(&self.user_base_url, "user_base_url")?;
        if self.access_key.trim().is_empty() || self.secret_key.trim().is_empty() {
            return Err(Error::InvalidConfiguration(
                "access key and secret key must not be empty".to_string(),
            ));
        }
        self.login_poll.validate()?;
        self.upload_poll.validate()?;
        self.revoke_poll.validate()?;
        Ok(self)
    }
}

fn poll_options(
    lookup: impl Fn(&str) -> Option<String>,
    name: &str,
    defaults: PollOptions,
    interval: Option<Duration>,
) -> Result<PollOptions> {
    let mut options = defaults;
    if let Some(interval) = interval {
        options.interval = interval;
    }
    if let Some(raw) = optional_trimmed(lookup, name) {
        let attempts = u32::try_from(parse_u64(&raw, name)?).map_err(|_| {
            Error::InvalidConfiguration(format!("{name} is too large"))
        })?;
        // 0 means "poll until success or failure"
        options.max_attempts = (attempts > 0).then_some(attempts);
    }
    Ok(options)
}

fn normalize_base_url(raw: &str, field: &str) -> Result<String> {
    let base = raw.trim().trim_end_matches('/').to_string();
    if base.is_empty() {
        return Err(Error::InvalidConfiguration(format!(
            "{field} must not be empty"
        )));
    }
    if !(base.starts_with("http://") || base.starts_with("https://")) {
        return Err(Error::InvalidConfiguration(format!(
            "{field} must include http:// or https://"
        )));
    }
    Ok(base)
}

fn parse_u64(raw: &str, name: &str) -> Result<u64> {
    raw.parse::<u64>()
        .map_err(|_| Error::InvalidConfiguration(format!("{name} must be a non-negative integer")))
}

fn value_or_default(lookup: impl Fn(&str) -> Option<String>, name: &str, default: &str) -> String {
    optional_trimmed(lookup, name).unwrap_or_else(|| default.to_string())
}

fn optional_trimmed(lookup: impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
