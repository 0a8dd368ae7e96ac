use framelink_core::{SessionPhase, SessionState};
use serde::Serialize;

use crate::commands::common::{connect, print_json, Credentials};
use crate::error::CliError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginReport {
    phase: SessionPhase,
    expires_at: Option<i64>,
    state: Option<SessionState>,
}

pub async fn run_login(credentials: &Credentials, wait: bool, as_json: bool) -> Result<(), CliError> {
    let client = connect(credentials).await?;
    let state = if wait {
        Some(client.wait_for_login(client.config().login_poll).await?)
    } else {
        None
    };

    let report = LoginReport {
        phase: client.session().phase(),
        expires_at: client.session().credential().map(|credential| credential.expires_at),
        state,
    };
    if as_json {
        print_json(&report)?;
    } else {
        println!("Signed in as {}", credentials.email);
        if let Some(state) = report.state {
            println!("Session state: {state:?}");
        }
    }
    Ok(())
}
