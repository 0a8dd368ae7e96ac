use std::path::Path;

use crate::commands::common::{connect, print_json, Credentials};
use crate::error::CliError;

pub async fn run_upload(
    credentials: &Credentials,
    path: &Path,
    terminal_id: &str,
    subject: Option<&str>,
    as_json: bool,
) -> Result<(), CliError> {
    let client = connect(credentials).await?;
    let file_id = client.upload_path(path, terminal_id, subject).await?;

    if as_json {
        print_json(&serde_json::json!({
            "fileId": file_id,
            "terminalId": terminal_id.trim(),
        }))?;
    } else {
        println!("Uploaded {} as {file_id}", path.display());
    }
    Ok(())
}
