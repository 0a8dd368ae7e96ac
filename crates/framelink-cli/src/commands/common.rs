use framelink_core::{ClientConfig, FrameClient, Terminal};
use serde::Serialize;

use crate::error::CliError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Resolves credentials from flags (or their env fallbacks).
pub fn resolve_credentials(
    email: Option<&str>,
    password: Option<&str>,
) -> Result<Credentials, CliError> {
    let email = email.map(str::trim).filter(|email| !email.is_empty());
    let password = password.filter(|password| !password.is_empty());
    match (email, password) {
        (Some(email), Some(password)) => Ok(Credentials {
            email: email.to_string(),
            password: password.to_string(),
        }),
        _ => Err(CliError::MissingCredentials),
    }
}

pub fn build_client() -> Result<FrameClient, CliError> {
    let config = ClientConfig::from_env()?;
    Ok(FrameClient::new(config)?)
}

/// Builds a client from the environment and signs in.
pub async fn connect(credentials: &Credentials) -> Result<FrameClient, CliError> {
    let client = build_client()?;
    client
        .login(&credentials.email, &credentials.password)
        .await?;
    tracing::debug!(email = %credentials.email, "signed in");
    Ok(client)
}

pub fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn format_terminal_line(terminal: &Terminal) -> String {
    let status = match terminal.online {
        Some(true) => "online",
        Some(false) => "offline",
        None => "unknown",
    };
    let mut line = format!("{}  {}  [{status}]", terminal.terminal_id, terminal.display_name());
    if let Some(model) = terminal.model.as_deref().filter(|model| !model.is_empty()) {
        line.push_str("  ");
        line.push_str(model);
    }
    line
}
