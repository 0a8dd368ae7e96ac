use crate::commands::common::{connect, print_json, Credentials};
use crate::error::CliError;

pub async fn run_state(credentials: &Credentials, as_json: bool) -> Result<(), CliError> {
    let client = connect(credentials).await?;
    let state = client.session_state().await?;
    if as_json {
        print_json(&serde_json::json!({ "state": state }))?;
    } else {
        println!("{state:?}");
    }
    Ok(())
}
