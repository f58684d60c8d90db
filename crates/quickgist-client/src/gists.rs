use std::future::Future;

use quickgist_core::links::encode_segment;
use quickgist_core::models::gist::{CreateGistParams, Gist};

use crate::client::{ApiClient, MultipartBody, RequestBody};
use crate::error::ClientError;

/// The three backend operations on gists.
///
/// Caches and flows are written against this trait so they can be driven
/// by an in-memory backend in tests.
pub trait GistApi: Send + Sync {
    fn fetch_gist(&self, id: &str) -> impl Future<Output = Result<Gist, ClientError>> + Send;

    fn fetch_user_gists(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Vec<Gist>, ClientError>> + Send;

    fn create_gist(
        &self,
        params: &CreateGistParams,
    ) -> impl Future<Output = Result<Gist, ClientError>> + Send;
}

/// `GET /gist/view/{id}`.
pub async fn fetch_gist(api: &ApiClient, id: &str) -> Result<Gist, ClientError> {
    let endpoint = format!("/gist/view/{}", encode_segment(id));
    api.get(&endpoint, None).await
}

/// `GET /gist/user-gists?userId=...`. Server ordering is preserved.
pub async fn fetch_user_gists(api: &ApiClient, user_id: &str) -> Result<Vec<Gist>, ClientError> {
    api.get("/gist/user-gists", Some(&[("userId", user_id)][..])).await
}

/// `POST /gist/create` as multipart form data.
pub async fn create_gist(api: &ApiClient, params: &CreateGistParams) -> Result<Gist, ClientError> {
    let gist: Gist = api
        .post("/gist/create", RequestBody::Multipart(create_form(params)))
        .await?;
    tracing::info!(
        snippet_id = %gist.snippet_id,
        anonymous = gist.is_anonymous(),
        has_file = gist.has_file(),
        "gist created"
    );
    Ok(gist)
}

/// Multipart body for a create request. `userId` is only included for
/// attributed gists and `file` only when one is attached.
pub fn create_form(params: &CreateGistParams) -> MultipartBody {
    let mut form = MultipartBody::new()
        .text("title", params.title.as_str())
        .text("description", params.description.as_str())
        .text("content", params.content.as_str())
        .text("isDraft", params.is_draft.to_string());

    if let Some(user_id) = params.owner() {
        form = form.text("userId", user_id);
    }

    if let Some(file) = &params.file {
        form = form.file(
            "file",
            file.file_name.as_str(),
            file.bytes.clone(),
            file.mime_type.clone(),
        );
    }

    form
}

/// [`GistApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct GistClient {
    api: ApiClient,
}

impl GistClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }
}

impl GistApi for GistClient {
    async fn fetch_gist(&self, id: &str) -> Result<Gist, ClientError> {
        fetch_gist(&self.api, id).await
    }

    async fn fetch_user_gists(&self, user_id: &str) -> Result<Vec<Gist>, ClientError> {
        fetch_user_gists(&self.api, user_id).await
    }

    async fn create_gist(&self, params: &CreateGistParams) -> Result<Gist, ClientError> {
        create_gist(&self.api, params).await
    }
}
