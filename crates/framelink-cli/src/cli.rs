use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "framelink")]
#[command(about = "Push photos and videos to Framelink picture frames")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Account email
    #[arg(long, global = true, env = "FRAMELINK_EMAIL", value_name = "EMAIL")]
    pub email: Option<String>,

    /// Account password
    #[arg(
        long,
        global = true,
        env = "FRAMELINK_PASSWORD",
        value_name = "PASSWORD",
        hide_env_values = true
    )]
    pub password: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and print the session
    Login {
        /// Wait until the service confirms the login
        #[arg(long)]
        wait: bool,
    },
    /// Show the server-side session state
    State,
    /// List terminals bound to the account
    #[command(alias = "ls")]
    Terminals,
    /// Upload a photo or video to a terminal
    Upload {
        /// Image or video file
        #[arg(value_name = "PATH")]
        path: PathBuf,
        /// Target terminal id
        #[arg(short, long, value_name = "ID")]
        terminal: String,
        /// Caption shown with the file
        #[arg(short, long, value_name = "TEXT")]
        subject: Option<String>,
    },
    /// Remove files from a terminal
    Revoke {
        /// Target terminal id
        #[arg(short, long, value_name = "ID")]
        terminal: String,
        /// Ids of the files to remove
        #[arg(value_name = "FILE_ID", required = true)]
        file_ids: Vec<String>,
        /// Wait until every file is removed
        #[arg(long)]
        wait: bool,
    },
}
