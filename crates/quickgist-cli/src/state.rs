use std::path::PathBuf;
use std::sync::Arc;

use quickgist_auth::Identity;
use quickgist_client::{ApiClient, GistClient};
use quickgist_query::Queries;

use crate::config::QuickgistConfig;

/// Everything a command needs: effective config, who we are, and the
/// shared query layer.
pub struct AppState {
    pub config: QuickgistConfig,
    pub config_path: PathBuf,
    pub identity: Identity,
    /// Why a stored session was not accepted, if it was not.
    pub session_problem: Option<String>,
    pub queries: Arc<Queries<GistClient>>,
}

impl AppState {
    pub fn build(config: QuickgistConfig, config_path: PathBuf) -> eyre::Result<Self> {
        config.validate()?;

        let (identity, session_problem) = match Identity::from_session(
            config.session_token.as_deref(),
            config.identity_public_key.as_deref(),
        ) {
            Ok(identity) => (identity, None),
            Err(e) => {
                tracing::warn!(error = %e, "stored session rejected, continuing anonymously");
                (Identity::anonymous(), Some(e.to_string()))
            }
        };

        // Only send the cookie for a session we accepted.
        let session_token = identity
            .is_signed_in()
            .then_some(config.session_token.as_deref())
            .flatten();
        let api = ApiClient::with_session(&config.server_uri, session_token)?;
        let queries = Queries::with_freshness(GistClient::new(api), config.cache_ttl());

        Ok(Self {
            config,
            config_path,
            identity,
            session_problem,
            queries: Arc::new(queries),
        })
    }
}
