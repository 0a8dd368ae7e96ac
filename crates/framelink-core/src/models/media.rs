//! Media upload and revocation models.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Kind of media accepted by a terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub const fn from_is_image(is_image: bool) -> Self {
        if is_image {
            Self::Image
        } else {
            Self::Video
        }
    }

    pub const fn is_image(self) -> bool {
        matches!(self, Self::Image)
    }

    /// File extension requested for the stored object.
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Image => ".jpg",
            Self::Video => ".mp4",
        }
    }

    /// Infers the kind from a file name's MIME type.
    ///
    /// Returns `None` for anything that is neither an image nor a video.
    pub fn from_path(path: &Path) -> Option<Self> {
        let mime = mime_guess::from_path(path).first()?;
        match mime.type_().as_str() {
            "image" => Some(Self::Image),
            "video" => Some(Self::Video),
            _ => None,
        }
    }
}

/// Ingestion state of an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileState {
    Pending,
    Uploaded,
    Unknown,
}

impl FileState {
    /// `1` is pending; `2` (image) and `3` (video) are both uploaded.
    pub const fn from_code(code: i64) -> Self {
        match code {
            1 => Self::Pending,
            2 | 3 => Self::Uploaded,
            _ => Self::Unknown,
        }
    }
}

/// Revocation state of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevokeState {
    Pending,
    Revoked,
    Unknown,
}

impl RevokeState {
    pub const fn from_code(code: i64) -> Self {
        match code {
            1 => Self::Pending,
            2 => Self::Revoked,
            _ => Self::Unknown,
        }
    }
}

/// Parameters for a presigned upload URL request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresignRequest {
    pub is_image: bool,
    pub file_size: u64,
    pub terminal_id: String,
    pub offline_storage: bool,
}

impl PresignRequest {
    pub fn new(is_image: bool, file_size: u64, terminal_id: impl Into<String>) -> Self {
        Self {
            is_image,
            file_size,
            terminal_id: terminal_id.into(),
            offline_storage: false,
        }
    }

    pub const fn with_offline_storage(mut self, offline_storage: bool) -> Self {
        self.offline_storage = offline_storage;
        self
    }

    pub const fn kind(&self) -> MediaKind {
        MediaKind::from_is_image(self.is_image)
    }
}

/// Single-use upload capability returned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignedUpload {
    pub upload_url: String,
    pub file_url: String,
    pub file_id: String,
}

/// A file to push to a terminal.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub is_image: bool,
    pub file: Vec<u8>,
    /// Taken from `file.len()` when absent.
    pub file_size: Option<u64>,
    pub terminal_id: String,
    pub subject: Option<String>,
}

impl UploadFile {
    pub fn new(is_image: bool, file: Vec<u8>, terminal_id: impl Into<String>) -> Self {
        Self {
            is_image,
            file,
            file_size: None,
            terminal_id: terminal_id.into(),
            subject: None,
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub const fn with_file_size(mut self, file_size: u64) -> Self {
        self.file_size = Some(file_size);
        self
    }

    pub fn resolved_size(&self) -> u64 {
        self.file_size
            .unwrap_or_else(|| u64::try_from(self.file.len()).unwrap_or(u64::MAX))
    }
}

impl fmt::Debug for UploadFile {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("UploadFile")
            .field("is_image", &self.is_image)
            .field("file", &format_args!("<{} bytes>", self.file.len()))
            .field("file_size", &self.file_size)
            .field("terminal_id", &self.terminal_id)
            .field("subject", &self.subject)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FileStateEntry {
    pub file_id: String,
    #[serde(default)]
    pub state: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RevokeStateEntry {
    pub file_id: String,
    #[serde(default)]
    pub state: Option<i64>,
}
