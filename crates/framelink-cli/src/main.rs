//! Framelink CLI - push photos and videos to picture frames from a terminal.

mod cli;
mod commands;
mod error;


use clap::Parser;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::common::resolve_credentials;
use crate::commands::login::run_login;
use crate::commands::revoke::run_revoke;
use crate::commands::state::run_state;
use crate::commands::terminals::run_terminals;
use crate::commands::upload::run_upload;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(framelink_directive()),
        )
        .init();

    let cli = Cli::parse();
    let credentials = resolve_credentials(cli.email.as_deref(), cli.password.as_deref())?;

    match cli.command {
        Commands::Login { wait } => run_login(&credentials, wait, cli.json).await?,
        Commands::State => run_state(&credentials, cli.json).await?,
        Commands::Terminals => run_terminals(&credentials, cli.json).await?,
        Commands::Upload {
            path,
            terminal,
            subject,
        } => {
            run_upload(&credentials, &path, &terminal, subject.as_deref(), cli.json).await?;
        }
        Commands::Revoke {
            terminal,
            file_ids,
            wait,
        } => run_revoke(&credentials, &terminal, &file_ids, wait, cli.json).await?,
    }

    Ok(())
}

fn framelink_directive() -> tracing_subscriber::filter::Directive {
    "framelink=info"
        .parse()
        .unwrap_or_else(|_| LevelFilter::INFO.into())
}
