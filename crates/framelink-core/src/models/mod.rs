//! Data transfer types exchanged with the Framelink service.

mod media;
mod terminal;

pub use media::{FileState, MediaKind, PresignRequest, PresignedUpload, RevokeState, UploadFile};
pub(crate) use media::{FileStateEntry, RevokeStateEntry};
pub use terminal::Terminal;
