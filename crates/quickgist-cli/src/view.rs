use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use eyre::WrapErr;
use serde::Serialize;

use quickgist_client::{ApiClient, GistApi};
use quickgist_core::language::language_hint;
use quickgist_core::links::{is_previewable, resolve_file_url};
use quickgist_core::models::gist::Gist;
use quickgist_query::{Queries, QueryState};

/// Attached file of a gist, ready to link to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileLink {
    pub name: String,
    pub url: String,
    pub previewable: bool,
}

impl FileLink {
    /// Download the file to `dest`. When `dest` is a directory the file
    /// keeps its own name inside it. Returns the path written.
    pub async fn save(&self, api: &ApiClient, dest: &Path) -> eyre::Result<PathBuf> {
        let target = if dest.is_dir() {
            let name = Path::new(&self.name)
                .file_name()
                .ok_or_else(|| eyre::eyre!("attached file has no usable name: {}", self.name))?;
            dest.join(name)
        } else {
            dest.to_path_buf()
        };

        let bytes = api
            .download(&self.url)
            .await
            .wrap_err_with(|| format!("failed to download {}", self.url))?;
        tokio::fs::write(&target, &bytes)
            .await
            .wrap_err_with(|| format!("failed to write {}", target.display()))?;
        tracing::info!(path = %target.display(), bytes = bytes.len(), "attachment saved");
        Ok(target)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GistView {
    pub gist: Gist,
    pub file: Option<FileLink>,
    pub language: &'static str,
}

impl GistView {
    /// Resolve display details for `gist`. Relative file URLs are joined
    /// onto `api_base`.
    pub fn from_gist(gist: Gist, api_base: &str) -> Self {
        let file = match (gist.file_name.as_deref(), gist.file_url.as_deref()) {
            (Some(name), Some(url)) if !name.is_empty() && !url.is_empty() => Some(FileLink {
                name: name.to_string(),
                url: resolve_file_url(api_base, url),
                previewable: is_previewable(name),
            }),
            _ => None,
        };
        let language = language_hint(gist.file_name.as_deref(), &gist.content);
        Self {
            gist,
            file,
            language,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    Loading,
    NotFound,
    Loaded(GistView),
}

/// The single-gist page.
///
/// Every call to [`ViewPage::open`] is a navigation. A result that comes
/// back after a newer navigation (or after [`ViewPage::leave`]) is dropped.
pub struct ViewPage<A> {
    queries: Arc<Queries<A>>,
    api_base: String,
    generation: AtomicU64,
    state: Mutex<ViewState>,
}

impl<A: GistApi> ViewPage<A> {
    pub fn new(queries: Arc<Queries<A>>, api_base: impl Into<String>) -> Self {
        Self {
            queries,
            api_base: api_base.into(),
            generation: AtomicU64::new(0),
            state: Mutex::new(ViewState::Loading),
        }
    }

    pub fn state(&self) -> ViewState {
        self.lock().clone()
    }

    /// Navigate to the gist with `id` and load it.
    ///
    /// Returns the page state after the load. If this navigation was
    /// superseded meanwhile, its result is discarded and the newer
    /// navigation's state is returned instead.
    pub async fn open(&self, id: Option<&str>) -> ViewState {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *self.lock() = ViewState::Loading;

        let next = match self.queries.gist(id).await {
            QueryState::Success { data, .. } => {
                ViewState::Loaded(GistView::from_gist(data, &self.api_base))
            }
            QueryState::Idle => ViewState::NotFound,
            QueryState::Error(e) => {
                tracing::debug!(?id, error = %e, "gist unavailable");
                ViewState::NotFound
            }
        };

        let mut state = self.lock();
        if self.generation.load(Ordering::SeqCst) == generation {
            *state = next;
        } else {
            tracing::debug!(?id, "discarding result of superseded navigation");
        }
        state.clone()
    }

    /// Navigate away. Any load still in flight will be discarded.
    pub fn leave(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        *self.lock() = ViewState::Loading;
    }

    fn lock(&self) -> MutexGuard<'_, ViewState> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }
}
