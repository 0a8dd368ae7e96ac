//! framelink-core - Core library for Framelink
//!
//! This crate contains the session handling, signed requests, polling and
//! upload/revocation workflows used by every Framelink interface.

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod polling;
pub mod session;
pub mod signing;
pub mod transport;

pub use client::FrameClient;
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use models::{FileState, MediaKind, PresignRequest, PresignedUpload, RevokeState, Terminal, UploadFile};
pub use polling::{PollOptions, Poller};
pub use session::{SessionPhase, SessionState, UserCredential};
