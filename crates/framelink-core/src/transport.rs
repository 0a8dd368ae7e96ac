//! HTTP transport for the Framelink API.
//!
//! Every API response is wrapped in `{errorCode, errorMsg, data}`. An absent
//! or `"0"` error code means success; anything else becomes `Error::Api`.
//! Connection failures, timeouts and unparseable bodies become
//! `Error::Network`. Nothing here retries.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::{Error, Result};

const SUCCESS_CODE: &str = "0";
/// Longest slice of a response body quoted in an error message.
const BODY_EXCERPT_CHARS: usize = 180;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiEnvelope<T> {
    error_code: Option<Value>,
    error_msg: Option<String>,
    data: Option<T>,
}

impl<T> ApiEnvelope<T> {
    fn into_result(self) -> Result<Option<T>> {
        match normalize_error_code(self.error_code.as_ref()) {
            None => Ok(self.data),
            Some(code) => Err(Error::Api {
                code,
                message: self
                    .error_msg
                    .map(|message| message.trim().to_string())
                    .filter(|message| !message.is_empty())
                    .unwrap_or_else(|| "request rejected".to_string()),
            }),
        }
    }
}

/// Returns the error code when it denotes a failure.
fn normalize_error_code(code: Option<&Value>) -> Option<String> {
    let code = match code? {
        Value::Null => return None,
        Value::String(code) => code.trim().to_string(),
        other => other.to_string(),
    };
    if code.is_empty() || code == SUCCESS_CODE {
        None
    } else {
        Some(code)
    }
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| Error::network(format!("failed to construct HTTP client: {error}")))?;
        Ok(Self { client })
    }

    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client.request(method, url)
    }

    /// Sends an API request and returns the envelope's `data`, which may be
    /// absent.
    pub async fn call<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<Option<T>> {
        let response = request.send().await?;
        let status = response.status();
        let url = response.url().path().to_string();
        let body = response.text().await?;
        tracing::debug!(path = %url, status = status.as_u16(), "API response received");

        // `data` stays untyped until the error code has been checked, so a
        // rejection carrying an unexpected `data` shape is still an API error.
        let envelope = match serde_json::from_str::<ApiEnvelope<Value>>(&body) {
            Ok(envelope) => envelope,
            Err(error) if status.is_success() => return Err(error.into()),
            Err(_) => {
                return Err(Error::network(format!(
                    "HTTP {} from {url}: {}",
                    status.as_u16(),
                    excerpt(&body)
                )))
            }
        };

        let data = envelope.into_result().inspect_err(|error| {
            tracing::warn!(path = %url, %error, "API request rejected");
        })?;
        if !status.is_success() {
            return Err(Error::network(format!(
                "HTTP {} from {url}: {}",
                status.as_u16(),
                excerpt(&body)
            )));
        }
        decode_data(data)
    }

    /// Like [`call`](Self::call) but requires `data` to be present.
    pub async fn call_data<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        what: &str,
    ) -> Result<T> {
        self.call(request)
            .await?
            .ok_or_else(|| Error::network(format!("response did not include {what}")))
    }

    /// Sends an API request whose `data` is irrelevant.
    pub async fn call_unit(&self, request: RequestBuilder) -> Result<()> {
        self.call::<Value>(request).await.map(|_| ())
    }

    /// Raw `PUT` of a file body to an external storage URL.
    pub async fn put_bytes(&self, url: &str, bytes: Vec<u8>) -> Result<()> {
        let response = self.client.put(url).body(bytes).send().await?;
        ensure_success(response, "upload").await
    }
}

async fn ensure_success(response: Response, what: &str) -> Result<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(Error::network(format!(
        "{what} failed with HTTP {}: {}",
        status.as_u16(),
        excerpt(&body)
    )))
}

fn decode_data<T: DeserializeOwned>(data: Option<Value>) -> Result<Option<T>> {
    match data {
        None | Some(Value::Null) => Ok(None),
        Some(data) => Ok(Some(serde_json::from_value(data)?)),
    }
}

fn excerpt(body: &str) -> String {
    body.trim().chars().take(BODY_EXCERPT_CHARS).collect()
}
