use serde::Serialize;

use quickgist_auth::Identity;
use quickgist_client::GistApi;
use quickgist_core::links::sign_in_url;
use quickgist_query::{Queries, QueryState};

use crate::list::{GistSummary, summarize};

/// How many recent gists the profile shows.
pub const RECENT_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
    pub user_id: String,
    pub gist_count: usize,
    pub draft_count: usize,
    pub recent: Vec<GistSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileState {
    SignInRequired { sign_in_url: String },
    Loaded(Profile),
    Failed(String),
}

pub async fn load_profile<A: GistApi>(
    queries: &Queries<A>,
    identity: &Identity,
    frontend_origin: &str,
) -> ProfileState {
    let Some(user_id) = identity.user_id() else {
        return ProfileState::SignInRequired {
            sign_in_url: sign_in_url(frontend_origin),
        };
    };

    match queries.user_gists(Some(user_id)).await {
        QueryState::Success { data, .. } => {
            let mut recent = summarize(&data, frontend_origin);
            recent.truncate(RECENT_LIMIT);
            ProfileState::Loaded(Profile {
                user_id: user_id.to_string(),
                gist_count: data.len(),
                draft_count: data.iter().filter(|g| g.is_draft).count(),
                recent,
            })
        }
        QueryState::Idle => ProfileState::SignInRequired {
            sign_in_url: sign_in_url(frontend_origin),
        },
        QueryState::Error(e) => ProfileState::Failed(format!("Failed to load profile: {e}")),
    }
}
