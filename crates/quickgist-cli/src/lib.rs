//! quickgist-cli library root.
//!
//! The binary is a thin wrapper around [`run`]; the page and submission
//! flows live here so integration tests can drive them against a fake API.

pub mod cli;
pub mod clipboard;
pub mod commands;
pub mod config;
pub mod list;
pub mod profile;
pub mod render;
pub mod state;
pub mod submission;
pub mod view;

use std::path::PathBuf;

use cli::{Cli, Commands, ConfigAction};
use commands::{CreateArgs, Output, ViewArgs};
use config::{QuickgistConfig, config_path, load_config_from};
use state::AppState;

/// Resolve the effective config: file, then environment, then flags.
pub fn effective_config(cli: &Cli) -> eyre::Result<(PathBuf, QuickgistConfig)> {
    let path = match &cli.config {
        Some(path) => path.clone(),
        None => config_path()?,
    };
    let mut config = load_config_from(&path)?;
    config.apply_env(|name| std::env::var(name).ok());
    if let Some(server_uri) = &cli.server_uri {
        config.server_uri = server_uri.clone();
    }
    if let Some(frontend_origin) = &cli.frontend_origin {
        config.frontend_origin = frontend_origin.clone();
    }
    Ok((path, config))
}

pub async fn run(cli: Cli) -> eyre::Result<()> {
    let out = Output::detect(cli.json);
    let (path, config) = effective_config(&cli)?;

    match cli.command {
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config_show(&path, &config, out),
            ConfigAction::Init {
                force,
                session_token,
                public_key_file,
            } => commands::config_init(&path, force, session_token, public_key_file.as_deref())
                .map(|_| ()),
        },
        command => {
            let state = AppState::build(config, path)?;
            execute(&state, command, out).await
        }
    }
}

async fn execute(state: &AppState, command: Commands, out: Output) -> eyre::Result<()> {
    match command {
        Commands::Create {
            title,
            description,
            content,
            stdin,
            file,
            anonymous,
            draft,
            copy,
        } => {
            let args = CreateArgs {
                title,
                description,
                content,
                stdin,
                file,
                anonymous,
                draft,
                copy,
            };
            commands::create(state, args, out).await
        }
        Commands::View {
            id,
            copy,
            copy_link,
            download,
        } => {
            let args = ViewArgs {
                id,
                copy,
                copy_link,
                download,
            };
            commands::view(state, args, out).await
        }
        Commands::List => commands::list(state, out).await,
        Commands::Profile => commands::profile(state, out).await,
        Commands::Whoami => commands::whoami(state, out),
        Commands::Config { .. } => commands::config_show(&state.config_path, &state.config, out),
    }
}
