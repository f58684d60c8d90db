use std::time::Duration;

use quickgist_client::{ClientError, GistApi};
use quickgist_core::models::gist::{CreateGistParams, Gist};

use crate::cache::{Origin, QueryCache};

/// Identifies one cached read.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    /// A single gist, by snippet id.
    Gist(String),
    /// Every gist owned by a user, by user id.
    UserGists(String),
}

/// Outcome of a query.
#[derive(Debug)]
pub enum QueryState<T> {
    /// The query had no key to run with and did not fetch.
    Idle,
    Success { data: T, from_cache: bool },
    Error(ClientError),
}

impl<T> QueryState<T> {
    pub fn is_idle(&self) -> bool {
        matches!(self, QueryState::Idle)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            QueryState::Success { data, .. } => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ClientError> {
        match self {
            QueryState::Error(e) => Some(e),
            _ => None,
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            QueryState::Success { data, .. } => Some(data),
            _ => None,
        }
    }

    fn from_fetch(result: Result<(T, Origin), ClientError>) -> Self {
        match result {
            Ok((data, origin)) => QueryState::Success {
                data,
                from_cache: origin == Origin::Cache,
            },
            Err(e) => QueryState::Error(e),
        }
    }
}

/// Gist queries and the create mutation over a [`GistApi`].
///
/// Share one instance (behind an `Arc`) between every view so that reads
/// are de-duplicated across them.
pub struct Queries<A> {
    api: A,
    gists: QueryCache<String, Gist>,
    user_gists: QueryCache<String, Vec<Gist>>,
}

impl<A: GistApi> Queries<A> {
    pub fn new(api: A) -> Self {
        Self::with_freshness(api, crate::cache::DEFAULT_FRESHNESS)
    }

    pub fn with_freshness(api: A, freshness: Duration) -> Self {
        Self {
            api,
            gists: QueryCache::new(freshness),
            user_gists: QueryCache::new(freshness),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Read one gist. Idle when `id` is absent or blank.
    pub async fn gist(&self, id: Option<&str>) -> QueryState<Gist> {
        let Some(id) = id.map(str::trim).filter(|id| !id.is_empty()) else {
            return QueryState::Idle;
        };

        let result = self
            .gists
            .fetch_with(id.to_string(), || self.api.fetch_gist(id))
            .await;
        log_read(&QueryKey::Gist(id.to_string()), &result);
        QueryState::from_fetch(result)
    }

    /// Read every gist owned by `user_id`, in server order. Idle when no
    /// signed-in user id is known.
    pub async fn user_gists(&self, user_id: Option<&str>) -> QueryState<Vec<Gist>> {
        let Some(user_id) = user_id.filter(|id| !id.is_empty()) else {
            return QueryState::Idle;
        };

        let result = self
            .user_gists
            .fetch_with(user_id.to_string(), || self.api.fetch_user_gists(user_id))
            .await;
        log_read(&QueryKey::UserGists(user_id.to_string()), &result);
        QueryState::from_fetch(result)
    }

    /// Create a gist. Runs exactly once; failures are returned, not retried.
    ///
    /// On success the owner's list is marked stale and the new gist is
    /// cached under its snippet id.
    pub async fn create_gist(&self, params: &CreateGistParams) -> Result<Gist, ClientError> {
        let gist = self.api.create_gist(params).await?;

        if let Some(owner) = params.owner() {
            self.invalidate(&QueryKey::UserGists(owner.to_string())).await;
        }
        self.gists.insert(gist.snippet_id.clone(), gist.clone()).await;

        Ok(gist)
    }

    /// Mark a cached read stale. The next access refetches it.
    pub async fn invalidate(&self, key: &QueryKey) -> bool {
        let existed = match key {
            QueryKey::Gist(id) => self.gists.invalidate(id).await,
            QueryKey::UserGists(user_id) => self.user_gists.invalidate(user_id).await,
        };
        tracing::debug!(?key, existed, "query invalidated");
        existed
    }

    /// Invalidate and immediately read the gist again.
    pub async fn refetch_gist(&self, id: &str) -> QueryState<Gist> {
        let id = id.trim();
        if !id.is_empty() {
            self.invalidate(&QueryKey::Gist(id.to_string())).await;
        }
        self.gist(Some(id)).await
    }

    pub async fn refetch_user_gists(&self, user_id: &str) -> QueryState<Vec<Gist>> {
        self.invalidate(&QueryKey::UserGists(user_id.to_string()))
            .await;
        self.user_gists(Some(user_id)).await
    }
}

fn log_read<T>(key: &QueryKey, result: &Result<(T, Origin), ClientError>) {
    match result {
        Ok((_, origin)) => tracing::debug!(?key, ?origin, "query resolved"),
        Err(e) => tracing::warn!(?key, error = %e, "query failed"),
    }
}
