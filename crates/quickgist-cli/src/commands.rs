use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use eyre::WrapErr;
use tokio::io::AsyncReadExt;

use quickgist_core::links::{share_url, sign_in_url, sign_up_url};
use quickgist_core::models::gist::FileUpload;

use crate::clipboard;
use crate::config::{QuickgistConfig, config_info, save_config_to};
use crate::list::{ListPage, ListState};
use crate::profile::{ProfileState, load_profile};
use crate::render::{GistDetail, ProfileView, SubmissionNotice, SummaryTable, file_line};
use crate::state::AppState;
use crate::submission::{GistForm, SubmissionFlow, SubmitError};
use crate::view::{ViewPage, ViewState};

/// Output switches shared by every command.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub json: bool,
    pub enable_color: bool,
}

impl Output {
    pub fn detect(json: bool) -> Self {
        Self {
            json,
            enable_color: !json && std::io::stdout().is_terminal(),
        }
    }

    fn print_json(&self, value: &impl serde::Serialize) -> eyre::Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}

pub struct CreateArgs {
    pub title: String,
    pub description: String,
    pub content: Option<String>,
    pub stdin: bool,
    pub file: Option<PathBuf>,
    pub anonymous: bool,
    pub draft: bool,
    pub copy: bool,
}

pub struct ViewArgs {
    pub id: String,
    pub copy: bool,
    pub copy_link: bool,
    pub download: Option<PathBuf>,
}

pub async fn create(state: &AppState, args: CreateArgs, out: Output) -> eyre::Result<()> {
    let content = match (args.content, args.stdin) {
        (Some(content), _) => content,
        (None, true) => {
            let mut buf = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buf)
                .await
                .wrap_err("failed to read content from stdin")?;
            buf
        }
        (None, false) => String::new(),
    };

    let file = match args.file {
        Some(path) => Some(read_upload(&path).await?),
        None => None,
    };
    if let Some(file) = &file {
        tracing::info!(file = %file_line(&file.file_name, file.size()), "attaching file");
    }

    if args.anonymous && !state.identity.is_signed_in() {
        tracing::debug!("not signed in; gist is anonymous regardless");
    }

    let flow = SubmissionFlow::new(&state.config.frontend_origin, state.config.limits());
    flow.set_form(GistForm {
        title: args.title,
        description: args.description,
        content,
        file,
        is_draft: args.draft,
        post_anonymously: args.anonymous,
    });

    match flow.submit(&*state.queries, &state.identity).await {
        Ok(submission) => {
            if args.copy {
                eprintln!("{}", clipboard::copy(&submission.share_url, "share link"));
            }
            if out.json {
                out.print_json(&serde_json::json!({
                    "gist": submission.gist,
                    "shareUrl": submission.share_url,
                }))
            } else {
                print!(
                    "{}",
                    SubmissionNotice {
                        submission: &submission,
                        enable_color: out.enable_color,
                    }
                );
                Ok(())
            }
        }
        Err(SubmitError::Validation(e)) => {
            let lines: Vec<String> = e
                .errors
                .iter()
                .map(|fe| format!("  {}: {}", fe.field, fe.message))
                .collect();
            Err(eyre::eyre!("gist not created:\n{}", lines.join("\n")))
        }
        Err(e @ SubmitError::Api(_)) => {
            Err(eyre::Report::new(e).wrap_err("gist not created; your input was kept, try again"))
        }
        Err(e @ SubmitError::InFlight) => Err(eyre::Report::new(e)),
    }
}

async fn read_upload(path: &Path) -> eyre::Result<FileUpload> {
    let bytes = tokio::fs::read(path)
        .await
        .wrap_err_with(|| format!("failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| eyre::eyre!("{} has no usable file name", path.display()))?;
    Ok(FileUpload::new(file_name, bytes))
}

pub async fn view(state: &AppState, args: ViewArgs, out: Output) -> eyre::Result<()> {
    let id = args.id.trim();
    let page = ViewPage::new(state.queries.clone(), &state.config.server_uri);
    let view = match page.open(Some(id)).await {
        ViewState::Loaded(view) => view,
        ViewState::NotFound | ViewState::Loading => {
            if out.json {
                out.print_json(&not_found_json(id))?;
            }
            return Err(eyre::eyre!("gist not found: {id}"));
        }
    };

    if out.json {
        out.print_json(&view)?;
    } else {
        print!(
            "{}",
            GistDetail {
                view: &view,
                enable_color: out.enable_color,
            }
        );
    }

    if args.copy {
        eprintln!("{}", clipboard::copy(&view.gist.content, "gist content"));
    }
    if args.copy_link {
        let link = share_url(&state.config.frontend_origin, &view.gist.snippet_id);
        eprintln!("{}", clipboard::copy(&link, "share link"));
    }
    if let Some(dest) = &args.download {
        let file = view
            .file
            .as_ref()
            .ok_or_else(|| eyre::eyre!("gist {id} has no attached file"))?;
        let saved = file.save(state.queries.api().api(), dest).await?;
        eprintln!("Saved {} to {}", file.name, saved.display());
    }
    Ok(())
}

/// JSON body printed by `view --json` when the gist does not exist.
pub fn not_found_json(id: &str) -> serde_json::Value {
    serde_json::json!({ "status": "notFound", "id": id.trim() })
}

pub async fn list(state: &AppState, out: Output) -> eyre::Result<()> {
    let page = ListPage::new(state.queries.clone(), &state.config.frontend_origin);
    match page.load(&state.identity).await {
        ListState::SignInRequired { sign_in_url } => Err(eyre::eyre!(
            "sign in to see your gists: {sign_in_url}"
        )),
        ListState::Empty => {
            if out.json {
                out.print_json(&serde_json::json!([]))
            } else {
                println!("You have no gists yet. Create one with `quickgist create`.");
                Ok(())
            }
        }
        ListState::Loaded(summaries) => {
            if out.json {
                out.print_json(&summaries)
            } else {
                print!(
                    "{}",
                    SummaryTable {
                        summaries: &summaries,
                        enable_color: out.enable_color,
                    }
                );
                Ok(())
            }
        }
        ListState::Failed(message) => Err(eyre::eyre!(message)),
    }
}

pub async fn profile(state: &AppState, out: Output) -> eyre::Result<()> {
    match load_profile(&*state.queries, &state.identity, &state.config.frontend_origin).await {
        ProfileState::SignInRequired { sign_in_url } => Err(eyre::eyre!(
            "sign in to see your profile: {sign_in_url}"
        )),
        ProfileState::Loaded(profile) => {
            if out.json {
                out.print_json(&profile)
            } else {
                print!(
                    "{}",
                    ProfileView {
                        profile: &profile,
                        enable_color: out.enable_color,
                    }
                );
                Ok(())
            }
        }
        ProfileState::Failed(message) => Err(eyre::eyre!(message)),
    }
}

pub fn whoami(state: &AppState, out: Output) -> eyre::Result<()> {
    let sign_in = sign_in_url(&state.config.frontend_origin);
    let sign_up = sign_up_url(&state.config.frontend_origin);
    if out.json {
        return out.print_json(&serde_json::json!({
            "signedIn": state.identity.is_signed_in(),
            "userId": state.identity.user_id(),
            "signInUrl": sign_in,
            "signUpUrl": sign_up,
            "sessionProblem": state.session_problem,
        }));
    }

    match state.identity.user_id() {
        Some(user_id) => println!("Signed in as {user_id}"),
        None => {
            println!("Not signed in. Gists you create are anonymous.");
            if let Some(problem) = &state.session_problem {
                println!("Stored session was rejected: {problem}");
            }
            println!("Sign in at {sign_in} and run `quickgist config init --session-token <TOKEN>`.");
            println!("No account yet? Sign up at {sign_up}");
        }
    }
    Ok(())
}

pub fn config_show(path: &Path, config: &QuickgistConfig, out: Output) -> eyre::Result<()> {
    let info = config_info(path, config);
    if out.json {
        return out.print_json(&info);
    }
    println!("config:            {}", info.path);
    println!("server_uri:        {}", info.server_uri);
    println!("frontend_origin:   {}", info.frontend_origin);
    println!(
        "public key:        {}",
        if info.identity_public_key { "set" } else { "not set" }
    );
    println!(
        "session token:     {}",
        info.session_token_hint.as_deref().unwrap_or("not set")
    );
    println!("cache ttl:         {}s", info.cache_ttl_secs);
    println!("max file size:     {} bytes", info.max_file_bytes);
    Ok(())
}

pub fn config_init(
    path: &Path,
    force: bool,
    session_token: Option<String>,
    public_key_file: Option<&Path>,
) -> eyre::Result<QuickgistConfig> {
    if path.exists() && !force {
        return Err(eyre::eyre!(
            "{} already exists; pass --force to replace it",
            path.display()
        ));
    }

    let identity_public_key = match public_key_file {
        Some(key_path) => Some(
            std::fs::read_to_string(key_path)
                .wrap_err_with(|| format!("failed to read {}", key_path.display()))?,
        ),
        None => None,
    };

    let config = QuickgistConfig {
        session_token,
        identity_public_key,
        ..QuickgistConfig::default()
    };
    save_config_to(path, &config)?;
    println!("Wrote {}", path.display());
    Ok(config)
}
