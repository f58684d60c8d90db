use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::body::Bytes;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{HeaderMap, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use quickgist_core::models::gist::Gist;

use crate::fixtures;

/// What the fake backend saw for one request.
#[derive(Debug, Clone, Default)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub content_type: Option<String>,
    pub cookie: Option<String>,
    /// Text parts of a multipart body, in arrival order.
    pub fields: Vec<(String, String)>,
    /// `(file_name, bytes)` of the `file` part, if any.
    pub file: Option<(String, Vec<u8>)>,
}

impl RecordedRequest {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Default)]
struct Inner {
    gists: Vec<Gist>,
    /// Uploaded file bytes keyed by `(snippet_id, file_name)`.
    files: HashMap<(String, String), Vec<u8>>,
    requests: Vec<RecordedRequest>,
    next_id: i64,
}

#[derive(Clone, Default)]
struct BackendState {
    inner: Arc<Mutex<Inner>>,
}

impl BackendState {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(&self, request: RecordedRequest) {
        self.lock().requests.push(request);
    }
}

/// An in-process HTTP server implementing the gist REST surface.
///
/// Bound to an ephemeral port on 127.0.0.1 and shut down on drop.
pub struct FakeBackend {
    addr: SocketAddr,
    state: BackendState,
    handle: JoinHandle<()>,
}

impl FakeBackend {
    pub async fn spawn() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake backend");
        let addr = listener.local_addr().expect("fake backend address");
        let state = BackendState::default();
        let app = router(state.clone());

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("fake backend stopped: {e}");
            }
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Insert a gist as if it had been created earlier.
    pub fn seed(&self, gist: Gist) {
        self.state.lock().gists.push(gist);
    }

    /// Serve `bytes` at `/files/{id}/{name}`.
    pub fn seed_file(&self, id: &str, name: &str, bytes: Vec<u8>) {
        self.state
            .lock()
            .files
            .insert((id.to_string(), name.to_string()), bytes);
    }

    pub fn gists(&self) -> Vec<Gist> {
        self.state.lock().gists.clone()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().requests.clone()
    }

    /// Requests whose path starts with `prefix`.
    pub fn requests_to(&self, prefix: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path.starts_with(prefix))
            .collect()
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn router(state: BackendState) -> Router {
    Router::new()
        .route("/gist/view/{id}", get(view_gist))
        .route("/gist/user-gists", get(user_gists))
        .route("/gist/create", post(create_gist))
        .route("/files/{id}/{name}", get(download_file))
        .route("/echo", get(echo).post(echo))
        .route("/status/{code}", get(status))
        .with_state(state)
}

fn base_request(method: &str, uri: &Uri, headers: &HeaderMap) -> RecordedRequest {
    let header_str = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    RecordedRequest {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        content_type: header_str(header::CONTENT_TYPE),
        cookie: header_str(header::COOKIE),
        ..RecordedRequest::default()
    }
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "code": "NOT_FOUND", "message": "gist not found" })),
    )
        .into_response()
}

fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "code": "BAD_REQUEST", "message": message })),
    )
        .into_response()
}

async fn view_gist(
    State(state): State<BackendState>,
    Path(id): Path<String>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    state.record(base_request("GET", &uri, &headers));

    let found = state
        .lock()
        .gists
        .iter()
        .find(|g| g.snippet_id == id)
        .cloned();
    match found {
        Some(gist) => Json(gist).into_response(),
        None => not_found(),
    }
}

async fn user_gists(
    State(state): State<BackendState>,
    Query(params): Query<HashMap<String, String>>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    state.record(base_request("GET", &uri, &headers));

    let Some(user_id) = params.get("userId").filter(|u| !u.trim().is_empty()) else {
        return bad_request("userId is required");
    };

    let gists: Vec<Gist> = state
        .lock()
        .gists
        .iter()
        .filter(|g| g.owner() == Some(user_id.as_str()))
        .cloned()
        .collect();
    Json(gists).into_response()
}

async fn create_gist(
    State(state): State<BackendState>,
    uri: Uri,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let mut request = base_request("POST", &uri, &headers);

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(_) => return bad_request("request too large or invalid form"),
        };
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let Ok(bytes) = field.bytes().await else {
            return bad_request("request too large or invalid form");
        };
        match file_name {
            Some(file_name) if name == "file" => request.file = Some((file_name, bytes.to_vec())),
            _ => request
                .fields
                .push((name, String::from_utf8_lossy(&bytes).into_owned())),
        }
    }

    let title = request.field("title").unwrap_or_default().trim().to_string();
    let content = request.field("content").unwrap_or_default().to_string();
    let description = request.field("description").unwrap_or_default().to_string();
    let is_draft = request.field("isDraft") == Some("true");
    let user_id = request
        .field("userId")
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .map(str::to_string);
    let file = request.file.clone();
    let file_name = file.as_ref().map(|(name, _)| name.clone());

    state.record(request);

    if title.is_empty() {
        return bad_request("title is required");
    }

    let mut inner = state.lock();
    inner.next_id += 1;
    let id = format!("gist-{}", inner.next_id);
    if let Some((name, bytes)) = file {
        inner.files.insert((id.clone(), name), bytes);
    }
    let gist = Gist {
        file_url: file_name.as_ref().map(|name| format!("/files/{id}/{name}")),
        snippet_id: id,
        title,
        description,
        content,
        is_draft,
        created_at: fixtures::timestamp(inner.next_id * 60),
        user_id,
        file_name,
    };
    inner.gists.push(gist.clone());

    (StatusCode::CREATED, Json(gist)).into_response()
}

async fn download_file(
    State(state): State<BackendState>,
    Path((id, name)): Path<(String, String)>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    state.record(base_request("GET", &uri, &headers));

    let bytes = state.lock().files.get(&(id, name)).cloned();
    match bytes {
        Some(bytes) => (
            [(header::CONTENT_TYPE, "application/octet-stream")],
            bytes,
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "file not found").into_response(),
    }
}

/// Reflects the request back as JSON so tests can inspect what was sent.
async fn echo(State(state): State<BackendState>, uri: Uri, headers: HeaderMap, body: Bytes) -> Response {
    let request = base_request("ECHO", &uri, &headers);
    let body_json: serde_json::Value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    let reply = json!({
        "path": request.path,
        "query": request.query,
        "contentType": request.content_type,
        "cookie": request.cookie,
        "body": body_json,
    });
    state.record(request);
    Json(reply).into_response()
}

async fn status(Path(code): Path<u16>) -> Response {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, "forced status").into_response()
}
