//! Session lifecycle.
//!
//! The manager owns the single session identifier of a client and the user
//! credential obtained from login. It moves between three phases:
//!
//! ```text
//! NoSession --acquire_anonymous--> Anonymous --acquire_authenticated--> Authenticated
//! ```
//!
//! Either acquisition may be called from any phase and always replaces the
//! stored identifier. Every authenticated request goes through
//! [`SessionManager::authorize`], which is the one place the "no session"
//! precondition is enforced.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use reqwest::{Method, RequestBuilder};
use serde::{Deserialize, Serialize};

use crate::config::ClientConfig;
use crate::signing::{now_millis, RequestSigner};
use crate::transport::HttpTransport;
use crate::{Error, Result};

pub(crate) const SESSION_PATH: &str = "/api/session";
pub(crate) const SESSION_STATE_PATH: &str = "/api/session/state";
pub(crate) const LOGIN_PATH: &str = "/user/login";

pub(crate) const SESSION_HEADER: &str = "sessionId";
const AUTHORIZATION_HEADER: &str = "authorization";
const BRAND_HEADER: &str = "brandId";
const PRODUCT_HEADER: &str = "productId";

/// Server-reported state of the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionState {
    LoggedOut,
    Scanned,
    LoggedIn,
    Failed,
    Expired,
    Unknown,
}

impl SessionState {
    /// Maps the service's numeric code; unrecognized codes become `Unknown`.
    pub const fn from_code(code: i64) -> Self {
        match code {
            0 => Self::LoggedOut,
            1 => Self::Scanned,
            2 => Self::LoggedIn,
            3 => Self::Failed,
            4 => Self::Expired,
            _ => Self::Unknown,
        }
    }

    /// States that end login confirmation unsuccessfully.
    pub const fn is_login_failure(self) -> bool {
        matches!(self, Self::Failed | Self::Expired)
    }
}

/// Token returned by a successful credential exchange.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCredential {
    pub token: String,
    /// Unix timestamp in milliseconds.
    pub expires_at: i64,
}

impl UserCredential {
    pub fn is_expired(&self) -> bool {
        self.expires_at <= now_millis()
    }
}

impl fmt::Debug for UserCredential {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("UserCredential")
            .field("token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionPhase {
    NoSession,
    Anonymous,
    Authenticated,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
enum SessionSlot {
    #[default]
    NoSession,
    Anonymous(String),
    Authenticated(String),
}

impl SessionSlot {
    fn session_id(&self) -> Option<&str> {
        match self {
            Self::NoSession => None,
            Self::Anonymous(id) | Self::Authenticated(id) => Some(id),
        }
    }

    const fn phase(&self) -> SessionPhase {
        match self {
            Self::NoSession => SessionPhase::NoSession,
            Self::Anonymous(_) => SessionPhase::Anonymous,
            Self::Authenticated(_) => SessionPhase::Authenticated,
        }
    }
}

#[derive(Debug, Default)]
struct SessionInner {
    slot: SessionSlot,
    credential: Option<UserCredential>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IssuedSession {
    session_id: String,
}

#[derive(Debug, Deserialize)]
struct SessionStatePayload {
    state: Option<i64>,
}

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug)]
pub struct SessionManager {
    transport: HttpTransport,
    config: Arc<ClientConfig>,
    signer: RequestSigner,
    inner: RwLock<SessionInner>,
}

impl SessionManager {
    pub fn new(transport: HttpTransport, config: Arc<ClientConfig>) -> Self {
        let signer = RequestSigner::new(config.access_key.clone(), config.secret_key.clone());
        Self {
            transport,
            config,
            signer,
            inner: RwLock::new(SessionInner::default()),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.read().slot.phase()
    }

    pub fn session_id(&self) -> Option<String> {
        self.read().slot.session_id().map(ToString::to_string)
    }

    pub fn credential(&self) -> Option<UserCredential> {
        self.read().credential.clone()
    }

    /// Drops the local session and credential. The service is not contacted.
    pub fn reset(&self) {
        let mut inner = self.write();
        *inner = SessionInner::default();
        tracing::info!("session cleared");
    }

    /// Returns the live session identifier or a precondition error naming
    /// `operation`.
    pub fn require_session_id(&self, operation: &'static str) -> Result<String> {
        self.session_id().ok_or(Error::Precondition(operation))
    }

    /// Attaches the `sessionId` header to an authenticated request.
    pub fn authorize(
        &self,
        request: RequestBuilder,
        operation: &'static str,
    ) -> Result<RequestBuilder> {
        let session_id = self.require_session_id(operation)?;
        Ok(request.header(SESSION_HEADER, session_id))
    }

    /// Requests a fresh anonymous session, replacing any current one.
    pub async fn acquire_anonymous_session(&self) -> Result<String> {
        let url = format!("{}{SESSION_PATH}", self.config.api_base_url);
        let issued: IssuedSession = self
            .transport
            .call_data(self.transport.request(Method::GET, &url), "a session id")
            .await?;
        let session_id = non_empty(issued.session_id, "session id")?;

        self.write().slot = SessionSlot::Anonymous(session_id.clone());
        tracing::info!("anonymous session acquired");
        Ok(session_id)
    }

    /// Requests a session bound to `user_token`, replacing any current one.
    pub async fn acquire_authenticated_session(&self, user_token: &str) -> Result<String> {
        let user_token = user_token.trim();
        if user_token.is_empty() {
            return Err(Error::validation("user token must not be empty"));
        }

        let url = format!("{}{SESSION_PATH}", self.config.api_base_url);
        let request = self
            .transport
            .request(Method::GET, &url)
            .query(&[("token", user_token)]);
        let issued: IssuedSession = self.transport.call_data(request, "a session id").await?;
        let session_id = non_empty(issued.session_id, "session id")?;

        self.write().slot = SessionSlot::Authenticated(session_id.clone());
        tracing::info!("authenticated session acquired");
        Ok(session_id)
    }

    /// Asks the service for the state of the current session.
    pub async fn query_session_state(&self) -> Result<SessionState> {
        let url = format!("{}{SESSION_STATE_PATH}", self.config.api_base_url);
        let request = self.authorize(
            self.transport.request(Method::GET, &url),
            "query_session_state",
        )?;
        let payload: Option<SessionStatePayload> = self.transport.call(request).await?;
        Ok(payload
            .and_then(|payload| payload.state)
            .map_or(SessionState::Unknown, SessionState::from_code))
    }

    /// Anonymous session, credential exchange, then authenticated session.
    ///
    /// If the exchange fails the session stays anonymous and the call can
    /// simply be repeated.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserCredential> {
        let email = email.trim();
        if email.is_empty() {
            return Err(Error::validation("email is required"));
        }
        if password.is_empty() {
            return Err(Error::validation("password is required"));
        }

        self.acquire_anonymous_session().await?;

        let credential = self.exchange_credentials(email, password).await?;
        self.write().credential = Some(credential.clone());

        self.acquire_authenticated_session(&credential.token).await?;
        tracing::info!("login completed");
        Ok(credential)
    }

    async fn exchange_credentials(&self, email: &str, password: &str) -> Result<UserCredential> {
        let url = format!("{}{LOGIN_PATH}", self.config.user_base_url);
        let authorization = self.signer.sign(LOGIN_PATH)?;
        let request = self
            .transport
            .request(Method::POST, &url)
            .header(AUTHORIZATION_HEADER, authorization)
            .header(BRAND_HEADER, &self.config.brand_id)
            .header(PRODUCT_HEADER, &self.config.product_id)
            .json(&Credentials { email, password });

        let credential: UserCredential = self.transport.call_data(request, "a user token").await?;
        let token = non_empty(credential.token, "user token")?;
        Ok(UserCredential {
            token,
            expires_at: credential.expires_at,
        })
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn non_empty(value: String, what: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(Error::network(format!("response contained an empty {what}")))
    } else {
        Ok(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use super::*;

    fn manager() -> SessionManager {
        // Port 9 (discard) is never contacted by these tests.
        let config = ClientConfig::default()
            .with_api_base_url("http://127.0.0.1:9")
            .with_user_base_url("http://127.0.0.1:9");
        let transport = HttpTransport::new(Duration::from_secs(1)).unwrap();
        SessionManager::new(transport, Arc::new(config))
    }

    #[test]
    fn session_state_codes() {
        assert_eq!(SessionState::from_code(0), SessionState::LoggedOut);
        assert_eq!(SessionState::from_code(1), SessionState::Scanned);
        assert_eq!(SessionState::from_code(2), SessionState::LoggedIn);
        assert_eq!(SessionState::from_code(3), SessionState::Failed);
        assert_eq!(SessionState::from_code(4), SessionState::Expired);
        assert_eq!(SessionState::from_code(5), SessionState::Unknown);
        assert_eq!(SessionState::from_code(-1), SessionState::Unknown);
    }

    #[test]
    fn only_failed_and_expired_end_login() {
        assert!(SessionState::Failed.is_login_failure());
        assert!(SessionState::Expired.is_login_failure());
        assert!(!SessionState::Scanned.is_login_failure());
        assert!(!SessionState::Unknown.is_login_failure());
    }

    #[test]
    fn new_manager_has_no_session() {
        let manager = manager();
        assert_eq!(manager.phase(), SessionPhase::NoSession);
        assert_eq!(manager.session_id(), None);
        assert!(manager.credential().is_none());
        assert!(matches!(
            manager.require_session_id("get_terminals"),
            Err(Error::Precondition("get_terminals"))
        ));
    }

    #[tokio::test]
    async fn state_query_without_session_is_a_precondition_error() {
        let error = manager().query_session_state().await.unwrap_err();
        assert!(matches!(error, Error::Precondition("query_session_state")));
    }

    #[tokio::test]
    async fn login_rejects_empty_credentials_before_network() {
        let manager = manager();
        for (email, password) in [("", "x"), ("x", ""), ("   ", "x")] {
            let error = manager.login(email, password).await.unwrap_err();
            assert!(matches!(error, Error::Validation(_)), "{email:?}/{password:?}");
        }
        assert_eq!(manager.phase(), SessionPhase::NoSession);
    }

    #[tokio::test]
    async fn authenticated_acquisition_requires_token() {
        let error = manager()
            .acquire_authenticated_session("  ")
            .await
            .unwrap_err();
        assert!(matches!(error, Error::Validation(_)));
    }

    #[test]
    fn slot_transitions_replace_identifier() {
        let mut inner = SessionInner::default();
        inner.slot = SessionSlot::Anonymous("a".to_string());
        assert_eq!(inner.slot.phase(), SessionPhase::Anonymous);
        inner.slot = SessionSlot::Authenticated("b".to_string());
        assert_eq!(inner.slot.session_id(), Some("b"));
        assert_eq!(inner.slot.phase(), SessionPhase::Authenticated);
    }

    #[test]
    fn credential_debug_redacts_token() {
        let credential = UserCredential {
            token: "secret-user-token".to_string(),
            expires_at: 1_700_000_000_000,
        };
        let rendered = format!("{credential:?}");
        assert!(!rendered.contains("secret-user-token"));
        assert!(rendered.contains("[REDACTED]"));
        assert!(credential.is_expired());
    }
}
