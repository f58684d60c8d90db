use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use quickgist_client::{ApiError, ClientError, GistApi};
use quickgist_core::models::gist::{CreateGistParams, Gist};

use crate::fixtures;

/// In-memory [`GistApi`] that counts calls per operation.
///
/// Latency can be added so tests can overlap requests, and creates can be
/// made to fail with a 500. Read latency is applied after a read has taken
/// its snapshot, so a write can land while the stale answer is in transit.
#[derive(Default)]
pub struct FakeGistApi {
    gists: Mutex<Vec<Gist>>,
    latency: Option<Duration>,
    read_latency: Option<Duration>,
    fail_creates: AtomicBool,
    fail_reads: AtomicBool,
    fetch_gist_calls: AtomicUsize,
    fetch_user_gists_calls: AtomicUsize,
    create_gist_calls: AtomicUsize,
    created: Mutex<Vec<CreateGistParams>>,
}

impl FakeGistApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn with_read_latency(mut self, latency: Duration) -> Self {
        self.read_latency = Some(latency);
        self
    }

    pub fn with_gist(self, gist: Gist) -> Self {
        self.lock_gists().push(gist);
        self
    }

    pub fn set_fail_creates(&self, fail: bool) {
        self.fail_creates.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fetch_gist_calls(&self) -> usize {
        self.fetch_gist_calls.load(Ordering::SeqCst)
    }

    pub fn fetch_user_gists_calls(&self) -> usize {
        self.fetch_user_gists_calls.load(Ordering::SeqCst)
    }

    pub fn create_gist_calls(&self) -> usize {
        self.create_gist_calls.load(Ordering::SeqCst)
    }

    /// Parameters of every create call, in order.
    pub fn created_params(&self) -> Vec<CreateGistParams> {
        self.created
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    pub fn total_calls(&self) -> usize {
        self.fetch_gist_calls() + self.fetch_user_gists_calls() + self.create_gist_calls()
    }

    fn lock_gists(&self) -> MutexGuard<'_, Vec<Gist>> {
        self.gists.lock().unwrap_or_else(|p| p.into_inner())
    }

    async fn delay(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    async fn read_delay(&self) {
        if let Some(latency) = self.read_latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn server_error() -> ClientError {
        ApiError {
            status: 500,
            body: "internal server error".to_string(),
        }
        .into()
    }
}

impl GistApi for FakeGistApi {
    async fn fetch_gist(&self, id: &str) -> Result<Gist, ClientError> {
        self.fetch_gist_calls.fetch_add(1, Ordering::SeqCst);
        self.delay().await;
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Self::server_error());
        }

        let found = self
            .lock_gists()
            .iter()
            .find(|g| g.snippet_id == id)
            .cloned();
        self.read_delay().await;
        found.ok_or_else(|| {
            ApiError {
                status: 404,
                body: "gist not found".to_string(),
            }
            .into()
        })
    }

    async fn fetch_user_gists(&self, user_id: &str) -> Result<Vec<Gist>, ClientError> {
        self.fetch_user_gists_calls.fetch_add(1, Ordering::SeqCst);
        self.delay().await;
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Self::server_error());
        }

        let owned: Vec<Gist> = self
            .lock_gists()
            .iter()
            .filter(|g| g.owner() == Some(user_id))
            .cloned()
            .collect();
        self.read_delay().await;
        Ok(owned)
    }

    async fn create_gist(&self, params: &CreateGistParams) -> Result<Gist, ClientError> {
        let n = self.create_gist_calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.delay().await;
        self.created
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(params.clone());
        if self.fail_creates.load(Ordering::SeqCst) {
            return Err(Self::server_error());
        }

        let id = format!("fake-{n}");
        let gist = Gist {
            snippet_id: id.clone(),
            title: params.title.clone(),
            description: params.description.clone(),
            content: params.content.clone(),
            is_draft: params.is_draft,
            created_at: fixtures::timestamp(10_000 + n as i64),
            user_id: params.owner().map(str::to_string),
            file_name: params.file.as_ref().map(|f| f.file_name.clone()),
            file_url: params
                .file
                .as_ref()
                .map(|f| format!("/files/{id}/{}", f.file_name)),
        };
        self.lock_gists().push(gist.clone());
        Ok(gist)
    }
}
