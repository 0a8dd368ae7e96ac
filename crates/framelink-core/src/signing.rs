//! Signed authorization tokens for the credential-exchange endpoint.
//!
//! A token has the shape `{access_key}:{signature}:{timestamp}` where the
//! signature is the base64-encoded HMAC-SHA1 of `path || timestamp` keyed with
//! the secret key.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use sha1::Sha1;

use crate::{Error, Result};

type HmacSha1 = Hmac<Sha1>;

/// Wall-clock time as Unix milliseconds, the unit used for signature
/// timestamps and credential expiry.
pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Computes the authorization token for `path` at `timestamp_ms`.
pub fn sign(path: &str, secret_key: &str, access_key: &str, timestamp_ms: i64) -> Result<String> {
    let mut mac = HmacSha1::new_from_slice(secret_key.as_bytes())
        .map_err(|error| Error::InvalidConfiguration(format!("unusable signing key: {error}")))?;
    mac.update(path.as_bytes());
    mac.update(timestamp_ms.to_string().as_bytes());
    let signature = STANDARD.encode(mac.finalize().into_bytes());
    Ok(format!("{access_key}:{signature}:{timestamp_ms}"))
}

/// Key pair used to sign requests.
#[derive(Clone, PartialEq, Eq)]
pub struct RequestSigner {
    access_key: String,
    secret_key: String,
}

impl RequestSigner {
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
        }
    }

    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    /// Signs `path` with the current wall-clock time.
    pub fn sign(&self, path: &str) -> Result<String> {
        self.sign_at(path, now_millis())
    }

    pub fn sign_at(&self, path: &str, timestamp_ms: i64) -> Result<String> {
        sign(path, &self.secret_key, &self.access_key, timestamp_ms)
    }
}

impl fmt::Debug for RequestSigner {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("RequestSigner")
            .field("access_key", &self.access_key)
            .field("secret_key", &"[REDACTED]")
            .finish()
    }
}
