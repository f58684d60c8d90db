use std::sync::Arc;

use serde::Serialize;

use quickgist_auth::Identity;
use quickgist_client::GistApi;
use quickgist_core::links::{share_url, sign_in_url};
use quickgist_core::models::gist::{Gist, sort_newest_first};
use quickgist_query::{Queries, QueryState};

/// Characters of description shown in a list row.
pub const DESCRIPTION_PREVIEW_CHARS: usize = 120;

/// One row of the "My Gists" list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GistSummary {
    pub snippet_id: String,
    pub title: String,
    pub description: String,
    pub created_at: String,
    /// `YYYY-MM-DD` in UTC, or the raw value if it does not parse.
    pub created_date: String,
    pub is_draft: bool,
    pub has_file: bool,
    pub view_url: String,
}

impl GistSummary {
    pub fn from_gist(gist: &Gist, frontend_origin: &str) -> Self {
        let created_date = gist
            .created_timestamp()
            .map(|ts| ts.strftime("%Y-%m-%d").to_string())
            .unwrap_or_else(|| gist.created_at.clone());

        Self {
            snippet_id: gist.snippet_id.clone(),
            title: gist.title.clone(),
            description: truncate(&gist.description, DESCRIPTION_PREVIEW_CHARS),
            created_at: gist.created_at.clone(),
            created_date,
            is_draft: gist.is_draft,
            has_file: gist.has_file(),
            view_url: share_url(frontend_origin, &gist.snippet_id),
        }
    }
}

/// Summaries of `gists`, most recent first.
pub fn summarize(gists: &[Gist], frontend_origin: &str) -> Vec<GistSummary> {
    let mut sorted = gists.to_vec();
    sort_newest_first(&mut sorted);
    sorted
        .iter()
        .map(|g| GistSummary::from_gist(g, frontend_origin))
        .collect()
}

pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.truncate(out.trim_end().len());
    out.push_str("...");
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListState {
    SignInRequired { sign_in_url: String },
    Empty,
    Loaded(Vec<GistSummary>),
    Failed(String),
}

/// The signed-in user's own gists.
pub struct ListPage<A> {
    queries: Arc<Queries<A>>,
    frontend_origin: String,
}

impl<A: GistApi> ListPage<A> {
    pub fn new(queries: Arc<Queries<A>>, frontend_origin: impl Into<String>) -> Self {
        Self {
            queries,
            frontend_origin: frontend_origin.into(),
        }
    }

    /// Load the list. Signed-out users get a sign-in prompt and no request
    /// is made.
    pub async fn load(&self, identity: &Identity) -> ListState {
        let Some(user_id) = identity.user_id() else {
            return self.sign_in_required();
        };
        let result = self.queries.user_gists(Some(user_id)).await;
        self.to_state(result)
    }

    /// Reload, bypassing any cached list.
    pub async fn refresh(&self, identity: &Identity) -> ListState {
        let Some(user_id) = identity.user_id() else {
            return self.sign_in_required();
        };
        let result = self.queries.refetch_user_gists(user_id).await;
        self.to_state(result)
    }

    fn sign_in_required(&self) -> ListState {
        ListState::SignInRequired {
            sign_in_url: sign_in_url(&self.frontend_origin),
        }
    }

    fn to_state(&self, result: QueryState<Vec<Gist>>) -> ListState {
        match result {
            QueryState::Idle => self.sign_in_required(),
            QueryState::Success { data, .. } if data.is_empty() => ListState::Empty,
            QueryState::Success { data, .. } => {
                ListState::Loaded(summarize(&data, &self.frontend_origin))
            }
            QueryState::Error(e) => ListState::Failed(format!("Failed to load gists: {e}")),
        }
    }
}
