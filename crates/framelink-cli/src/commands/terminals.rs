use crate::commands::common::{connect, format_terminal_line, print_json, Credentials};
use crate::error::CliError;

pub async fn run_terminals(credentials: &Credentials, as_json: bool) -> Result<(), CliError> {
    let client = connect(credentials).await?;
    let terminals = client.get_terminals().await?;

    if as_json {
        print_json(&terminals)?;
    } else if terminals.is_empty() {
        println!("No terminals bound to this account.");
    } else {
        for terminal in &terminals {
            println!("{}", format_terminal_line(terminal));
        }
    }
    Ok(())
}
