use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] framelink_core::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Missing credentials: pass --email and --password or set FRAMELINK_EMAIL and FRAMELINK_PASSWORD")]
    MissingCredentials,
}
