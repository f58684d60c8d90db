use std::sync::Arc;

use reqwest::cookie::Jar;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{ApiError, ClientError};

/// Cookie the identity provider uses to carry the session token.
pub const SESSION_COOKIE: &str = "__session";

/// Body of a POST request.
///
/// JSON bodies get an explicit `application/json` content type. Multipart
/// bodies leave the content type to reqwest so the boundary is set correctly.
#[derive(Debug, Clone)]
pub enum RequestBody {
    Json(serde_json::Value),
    Multipart(MultipartBody),
}

/// An ordered multipart form, kept as plain data until it is sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartBody {
    parts: Vec<(String, PartValue)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartValue {
    Text(String),
    File {
        file_name: String,
        bytes: Vec<u8>,
        mime_type: Option<String>,
    },
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push((name.into(), PartValue::Text(value.into())));
        self
    }

    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        bytes: Vec<u8>,
        mime_type: Option<String>,
    ) -> Self {
        self.parts.push((
            name.into(),
            PartValue::File {
                file_name: file_name.into(),
                bytes,
                mime_type,
            },
        ));
        self
    }

    pub fn parts(&self) -> &[(String, PartValue)] {
        &self.parts
    }

    /// Text value of the first part called `name`.
    pub fn text_value(&self, name: &str) -> Option<&str> {
        self.parts.iter().find_map(|(n, v)| match v {
            PartValue::Text(text) if n == name => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.parts.iter().any(|(n, _)| n == name)
    }

    fn into_form(self) -> Result<Form, ClientError> {
        let mut form = Form::new();
        for (name, value) in self.parts {
            form = match value {
                PartValue::Text(text) => form.text(name, text),
                PartValue::File {
                    file_name,
                    bytes,
                    mime_type,
                } => {
                    let mut part = Part::bytes(bytes).file_name(file_name);
                    if let Some(mime) = mime_type {
                        part = part.mime_str(&mime)?;
                    }
                    form.part(name, part)
                }
            };
        }
        Ok(form)
    }
}

/// Generic client for the backend REST surface.
///
/// Every request carries the cookie jar, so a configured session token is
/// sent with each call. There are no retries and no custom timeout.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client for `base_url` with no session.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_session(base_url, None)
    }

    /// Build a client for `base_url`, installing `session_token` as the
    /// session cookie when present.
    pub fn with_session(base_url: &str, session_token: Option<&str>) -> Result<Self, ClientError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        let parsed = Url::parse(&base_url)?;
        if parsed.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl(base_url));
        }

        let jar = Arc::new(Jar::default());
        if let Some(token) = session_token.filter(|t| !t.is_empty()) {
            jar.add_cookie_str(&format!("{SESSION_COOKIE}={token}; Path=/"), &parsed);
        }

        let http = reqwest::Client::builder().cookie_provider(jar).build()?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Join `endpoint` onto the base URL and append URL-encoded query
    /// parameters.
    pub fn url(&self, endpoint: &str, query: Option<&[(&str, &str)]>) -> Result<Url, ClientError> {
        let joined = if endpoint.starts_with('/') {
            format!("{}{endpoint}", self.base_url)
        } else {
            format!("{}/{endpoint}", self.base_url)
        };
        let mut url = Url::parse(&joined)?;

        if let Some(params) = query.filter(|p| !p.is_empty()) {
            url.query_pairs_mut().extend_pairs(params.iter());
        }

        Ok(url)
    }

    /// GET `endpoint` and decode the JSON response.
    pub async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: Option<&[(&str, &str)]>,
    ) -> Result<T, ClientError> {
        let url = self.url(endpoint, query)?;
        tracing::debug!(method = "GET", %url, "api request");

        let resp = self.http.request(Method::GET, url.clone()).send().await?;
        decode(url, resp).await
    }

    /// POST `body` to `endpoint` and decode the JSON response.
    pub async fn post<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: RequestBody,
    ) -> Result<T, ClientError> {
        let url = self.url(endpoint, None)?;
        tracing::debug!(method = "POST", %url, "api request");

        let req = self.http.request(Method::POST, url.clone());
        let req = match body {
            RequestBody::Json(value) => req
                .header(CONTENT_TYPE, "application/json")
                .body(serde_json::to_vec(&value)?),
            RequestBody::Multipart(form) => req.multipart(form.into_form()?),
        };

        let resp = req.send().await?;
        decode(url, resp).await
    }

    /// GET an absolute URL, such as an attached file's, and return the raw
    /// body. The session cookie is sent when the URL is on the backend.
    pub async fn download(&self, url: &str) -> Result<Vec<u8>, ClientError> {
        let url = Url::parse(url.trim())?;
        tracing::debug!(method = "GET", %url, "download");

        let resp = self.http.request(Method::GET, url.clone()).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(failure(url, resp).await);
        }
        Ok(resp.bytes().await?.to_vec())
    }
}

async fn decode<T: DeserializeOwned>(url: Url, resp: Response) -> Result<T, ClientError> {
    if !resp.status().is_success() {
        return Err(failure(url, resp).await);
    }

    let bytes = resp.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

async fn failure(url: Url, resp: Response) -> ClientError {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    tracing::warn!(%url, status, "api request failed");
    ApiError { status, body }.into()
}
