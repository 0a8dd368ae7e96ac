use crate::commands::common::{connect, print_json, Credentials};
use crate::error::CliError;

pub async fn run_revoke(
    credentials: &Credentials,
    terminal_id: &str,
    file_ids: &[String],
    wait: bool,
    as_json: bool,
) -> Result<(), CliError> {
    let client = connect(credentials).await?;
    client.revoke_files(terminal_id, file_ids).await?;
    if wait {
        client
            .wait_for_files_revoked(file_ids, client.config().revoke_poll)
            .await?;
    }

    if as_json {
        print_json(&serde_json::json!({
            "fileIds": file_ids,
            "confirmed": wait,
        }))?;
    } else if wait {
        println!("Revoked {} file(s)", file_ids.len());
    } else {
        println!("Revocation requested for {} file(s)", file_ids.len());
    }
    Ok(())
}
