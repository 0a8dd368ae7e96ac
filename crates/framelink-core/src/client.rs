//! High-level Framelink client.
//!
//! `FrameClient` composes the session manager, the transport and the poller
//! into the operations callers actually use: logging in, listing terminals,
//! pushing a photo or video to a terminal, and revoking files from it.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;

use reqwest::Method;
use serde::Serialize;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::models::{
    FileState, FileStateEntry, MediaKind, PresignRequest, PresignedUpload, RevokeState,
    RevokeStateEntry, Terminal, UploadFile,
};
use crate::polling::{PollOptions, Poller};
use crate::session::{SessionManager, SessionState, UserCredential};
use crate::transport::HttpTransport;
use crate::{Error, Result};

pub(crate) const TERMINALS_PATH: &str = "/api/terminals";
pub(crate) const PRESIGN_PATH: &str = "/api/file/presigned-url";
pub(crate) const SAVE_UPLOAD_PATH: &str = "/api/file/save";
pub(crate) const FILE_STATE_PATH: &str = "/api/file/state";
pub(crate) const REVOKE_PATH: &str = "/api/file/revoke";
pub(crate) const REVOKE_STATE_PATH: &str = "/api/file/revoke/state";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PresignBody<'a> {
    extension: &'static str,
    file_size: u64,
    terminal_id: &'a str,
    offline_storage: bool,
    nonce: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SaveUploadBody<'a> {
    file_id: &'a str,
    file_url: &'a str,
    terminal_id: &'a str,
    subject: Option<&'a str>,
    is_image: bool,
    file_size: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FileIdsBody<'a> {
    file_ids: &'a [String],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RevokeBody<'a> {
    terminal_id: &'a str,
    file_ids: &'a [String],
}

#[derive(Debug)]
pub struct FrameClient {
    config: Arc<ClientConfig>,
    transport: HttpTransport,
    session: SessionManager,
}

impl FrameClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let config = Arc::new(config.validated()?);
        let transport = HttpTransport::new(config.request_timeout)?;
        let session = SessionManager::new(transport.clone(), Arc::clone(&config));
        Ok(Self {
            config,
            transport,
            session,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub const fn session(&self) -> &SessionManager {
        &self.session
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<UserCredential> {
        self.session.login(email, password).await
    }

    /// Forgets the local session. Nothing is sent to the service.
    pub fn logout(&self) {
        self.session.reset();
    }

    pub async fn session_state(&self) -> Result<SessionState> {
        self.session.query_session_state().await
    }

    /// Polls the session state until it reports `LoggedIn`.
    ///
    /// `Failed` and `Expired` end the wait with `PollFailed`.
    pub async fn wait_for_login(&self, options: PollOptions) -> Result<SessionState> {
        self.session.require_session_id("wait_for_login")?;
        let session = &self.session;
        Poller::new("login confirmation", options)
            .run(
                move || session.query_session_state(),
                |state| *state == SessionState::LoggedIn,
                |state| state.is_login_failure(),
            )
            .await
    }

    pub async fn get_terminals(&self) -> Result<Vec<Terminal>> {
        let url = self.api_url(TERMINALS_PATH);
        let request = self
            .session
            .authorize(self.transport.request(Method::GET, &url), "get_terminals")?;
        let terminals: Option<Vec<Terminal>> = self.transport.call(request).await?;
        Ok(terminals.unwrap_or_default())
    }

    /// Requests a single-use upload capability for one file.
    pub async fn get_presigned_url(&self, request: &PresignRequest) -> Result<PresignedUpload> {
        self.session.require_session_id("get_presigned_url")?;
        let terminal_id = require_terminal_id(&request.terminal_id)?;

        let body = PresignBody {
            extension: request.kind().extension(),
            file_size: request.file_size,
            terminal_id,
            offline_storage: request.offline_storage,
            nonce: Uuid::now_v7().to_string(),
        };
        let url = self.api_url(PRESIGN_PATH);
        let http_request = self.session.authorize(
            self.transport.request(Method::POST, &url).json(&body),
            "get_presigned_url",
        )?;
        self.transport
            .call_data(http_request, "a presigned upload")
            .await
    }

    /// Registers an object already uploaded through `upload` with the service.
    pub async fn save_uploaded_file(
        &self,
        upload: &PresignedUpload,
        terminal_id: &str,
        subject: Option<&str>,
        kind: MediaKind,
        file_size: u64,
    ) -> Result<()> {
        self.session.require_session_id("save_uploaded_file")?;
        let terminal_id = require_terminal_id(terminal_id)?;

        let body = SaveUploadBody {
            file_id: &upload.file_id,
            file_url: &upload.file_url,
            terminal_id,
            subject: subject.map(str::trim).filter(|subject| !subject.is_empty()),
            is_image: kind.is_image(),
            file_size,
        };
        let url = self.api_url(SAVE_UPLOAD_PATH);
        let request = self.session.authorize(
            self.transport.request(Method::POST, &url).json(&body),
            "save_uploaded_file",
        )?;
        self.transport.call_unit(request).await
    }

    /// One batch probe of ingestion state. Every requested id is present in
    /// the result; ids the service omits are `Unknown`.
    pub async fn query_file_states<S: AsRef<str>>(
        &self,
        file_ids: &[S],
    ) -> Result<BTreeMap<String, FileState>> {
        self.session.require_session_id("query_file_states")?;
        let file_ids = normalize_file_ids(file_ids)?;

        let url = self.api_url(FILE_STATE_PATH);
        let request = self.session.authorize(
            self.transport
                .request(Method::POST, &url)
                .json(&FileIdsBody {
                    file_ids: &file_ids,
                }),
            "query_file_states",
        )?;
        let entries: Option<Vec<FileStateEntry>> = self.transport.call(request).await?;

        let mut states: BTreeMap<String, FileState> = file_ids
            .into_iter()
            .map(|id| (id, FileState::Unknown))
            .collect();
        for entry in entries.unwrap_or_default() {
            if let Some(state) = states.get_mut(&entry.file_id) {
                *state = entry.state.map_or(FileState::Unknown, FileState::from_code);
            }
        }
        Ok(states)
    }

    /// Polls until every id reports `Uploaded`.
    pub async fn wait_for_files_uploaded<S: AsRef<str>>(
        &self,
        file_ids: &[S],
        options: PollOptions,
    ) -> Result<()> {
        self.session.require_session_id("wait_for_files_uploaded")?;
        let file_ids = normalize_file_ids(file_ids)?;
        let ids: &[String] = &file_ids;

        Poller::new("upload confirmation", options)
            .run_until(
                move || self.query_file_states(ids),
                |states| states.values().all(|state| *state == FileState::Uploaded),
            )
            .await?;
        Ok(())
    }

    /// Pushes a file to a terminal and waits until the service has ingested it.
    ///
    /// Stages: presigned URL, raw upload, registration, confirmation. A failure
    /// at any stage aborts the rest; an object uploaded before a failed
    /// registration is left as is.
    pub async fn upload_file(&self, file: UploadFile) -> Result<String> {
        self.session.require_session_id("upload_file")?;
        let file_size = file.resolved_size();
        let UploadFile {
            is_image,
            file: bytes,
            terminal_id,
            subject,
            ..
        } = file;
        require_terminal_id(&terminal_id)?;
        if bytes.is_empty() {
            return Err(Error::validation("file must not be empty"));
        }
        let kind = MediaKind::from_is_image(is_image);

        let upload = self
            .get_presigned_url(&PresignRequest::new(is_image, file_size, terminal_id.clone()))
            .await?;
        tracing::debug!(file_id = %upload.file_id, "presigned upload issued");

        self.transport.put_bytes(&upload.upload_url, bytes).await?;
        self.save_uploaded_file(&upload, &terminal_id, subject.as_deref(), kind, file_size)
            .await?;
        self.wait_for_files_uploaded(&[upload.file_id.as_str()], self.config.upload_poll)
            .await?;

        tracing::info!(file_id = %upload.file_id, ?kind, "file uploaded");
        Ok(upload.file_id)
    }

    /// Reads a local photo or video and uploads it with [`upload_file`](Self::upload_file).
    pub async fn upload_path(
        &self,
        path: &Path,
        terminal_id: &str,
        subject: Option<&str>,
    ) -> Result<String> {
        self.session.require_session_id("upload_file")?;
        let kind = MediaKind::from_path(path).ok_or_else(|| {
            Error::validation(format!(
                "{} is neither an image nor a video",
                path.display()
            ))
        })?;
        let bytes = tokio::fs::read(path).await?;

        let mut file = UploadFile::new(kind.is_image(), bytes, terminal_id);
        if let Some(subject) = subject {
            file = file.with_subject(subject);
        }
        self.upload_file(file).await
    }

    /// Asks the service to remove files from a terminal. Returns once the
    /// request is accepted; see [`wait_for_files_revoked`](Self::wait_for_files_revoked).
    pub async fn revoke_files<S: AsRef<str>>(&self, terminal_id: &str, file_ids: &[S]) -> Result<()> {
        self.session.require_session_id("revoke_files")?;
        let terminal_id = require_terminal_id(terminal_id)?;
        let file_ids = normalize_file_ids(file_ids)?;

        let url = self.api_url(REVOKE_PATH);
        let request = self.session.authorize(
            self.transport
                .request(Method::POST, &url)
                .json(&RevokeBody {
                    terminal_id,
                    file_ids: &file_ids,
                }),
            "revoke_files",
        )?;
        self.transport.call_unit(request).await?;
        tracing::info!(count = file_ids.len(), "revocation requested");
        Ok(())
    }

    /// One batch probe of revocation state; missing ids are `Unknown`.
    pub async fn query_revoke_states<S: AsRef<str>>(
        &self,
        file_ids: &[S],
    ) -> Result<BTreeMap<String, RevokeState>> {
        self.session.require_session_id("query_revoke_states")?;
        let file_ids = normalize_file_ids(file_ids)?;

        let url = self.api_url(REVOKE_STATE_PATH);
        let request = self.session.authorize(
            self.transport
                .request(Method::POST, &url)
                .json(&FileIdsBody {
                    file_ids: &file_ids,
                }),
            "query_revoke_states",
        )?;
        let entries: Option<Vec<RevokeStateEntry>> = self.transport.call(request).await?;

        let mut states: BTreeMap<String, RevokeState> = file_ids
            .into_iter()
            .map(|id| (id, RevokeState::Unknown))
            .collect();
        for entry in entries.unwrap_or_default() {
            if let Some(state) = states.get_mut(&entry.file_id) {
                *state = entry
                    .state
                    .map_or(RevokeState::Unknown, RevokeState::from_code);
            }
        }
        Ok(states)
    }

    /// Polls until every id reports `Revoked`.
    pub async fn wait_for_files_revoked<S: AsRef<str>>(
        &self,
        file_ids: &[S],
        options: PollOptions,
    ) -> Result<()> {
        self.session.require_session_id("wait_for_files_revoked")?;
        let file_ids = normalize_file_ids(file_ids)?;
        let ids: &[String] = &file_ids;

        Poller::new("revocation confirmation", options)
            .run_until(
                move || self.query_revoke_states(ids),
                |states| states.values().all(|state| *state == RevokeState::Revoked),
            )
            .await?;
        tracing::info!(count = ids.len(), "files revoked");
        Ok(())
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_base_url)
    }
}

fn require_terminal_id(terminal_id: &str) -> Result<&str> {
    let terminal_id = terminal_id.trim();
    if terminal_id.is_empty() {
        Err(Error::validation("terminal id must not be empty"))
    } else {
        Ok(terminal_id)
    }
}

/// Trims and de-duplicates ids, rejecting empty input.
fn normalize_file_ids<S: AsRef<str>>(file_ids: &[S]) -> Result<Vec<String>> {
    let mut seen = BTreeSet::new();
    let mut normalized = Vec::with_capacity(file_ids.len());
    for id in file_ids {
        let id = id.as_ref().trim();
        if id.is_empty() {
            return Err(Error::validation("file ids must not be blank"));
        }
        if seen.insert(id) {
            normalized.push(id.to_string());
        }
    }
    if normalized.is_empty() {
        return Err(Error::validation("at least one file id is required"));
    }
    Ok(normalized)
}
