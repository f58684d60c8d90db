use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{ENV_FRONTEND_ORIGIN, ENV_SERVER_URI};

#[derive(Debug, Parser)]
#[command(name = "quickgist")]
#[command(about = "Share code and text snippets from the terminal", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Backend base URL.
    #[arg(long, global = true, env = ENV_SERVER_URI)]
    pub server_uri: Option<String>,

    /// Frontend origin used for share and sign-in links.
    #[arg(long, global = true, env = ENV_FRONTEND_ORIGIN)]
    pub frontend_origin: Option<String>,

    /// Machine-readable JSON output (also switches logs to JSON).
    #[arg(long, global = true)]
    pub json: bool,

    /// Config file to use instead of the default location.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create a gist.
    Create {
        #[arg(long)]
        title: String,

        #[arg(long, default_value = "")]
        description: String,

        #[arg(long, conflicts_with = "stdin")]
        content: Option<String>,

        /// Read content from standard input.
        #[arg(long)]
        stdin: bool,

        /// Attach a file.
        #[arg(long)]
        file: Option<PathBuf>,

        /// Publish without attribution even when signed in.
        #[arg(long)]
        anonymous: bool,

        #[arg(long)]
        draft: bool,

        /// Copy the share link to the clipboard.
        #[arg(long)]
        copy: bool,
    },

    /// Show a gist.
    View {
        id: String,

        /// Copy the gist content to the clipboard.
        #[arg(long)]
        copy: bool,

        /// Copy the share link to the clipboard.
        #[arg(long)]
        copy_link: bool,

        /// Save the attached file to PATH (a directory keeps its name).
        #[arg(long, value_name = "PATH")]
        download: Option<PathBuf>,
    },

    /// List your gists.
    List,

    /// Show your profile and most recent gists.
    Profile,

    /// Show who the CLI is acting as.
    Whoami,

    /// Inspect or create the config file.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective config with secrets redacted.
    Show,
    /// Write a config file with default values.
    Init {
        /// Replace an existing config file.
        #[arg(long)]
        force: bool,

        /// Session token issued by the identity provider.
        #[arg(long)]
        session_token: Option<String>,

        /// Path to the identity provider's PEM public key.
        #[arg(long)]
        public_key_file: Option<PathBuf>,
    },
}
