//! Link conventions.
//!
//! Pure string functions, no HTTP dependency. These define how the
//! client builds share links and resolves attached-file URLs.

use url::Url;

use crate::error::CoreError;

/// File extensions that can be previewed inline instead of only downloaded.
pub const PREVIEWABLE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "webp", "svg", "pdf", "txt", "md", "json",
];

/// Shareable link for a gist: `{frontend_origin}/view/{snippet_id}`.
pub fn share_url(frontend_origin: &str, snippet_id: &str) -> String {
    format!(
        "{}/view/{}",
        frontend_origin.trim_end_matches('/'),
        encode_segment(snippet_id)
    )
}

/// Sign-in page of the external identity provider's hosted UI.
pub fn sign_in_url(frontend_origin: &str) -> String {
    format!("{}/sign-in", frontend_origin.trim_end_matches('/'))
}

/// Sign-up page of the same hosted UI.
pub fn sign_up_url(frontend_origin: &str) -> String {
    format!("{}/sign-up", frontend_origin.trim_end_matches('/'))
}

/// Resolve an attached-file URL from the backend.
///
/// Absolute URLs are returned unchanged; anything else is treated as a path
/// on the backend and joined onto `api_base`.
pub fn resolve_file_url(api_base: &str, file_url: &str) -> String {
    if file_url.starts_with("http://") || file_url.starts_with("https://") {
        return file_url.to_string();
    }
    let base = api_base.trim_end_matches('/');
    if file_url.starts_with('/') {
        format!("{base}{file_url}")
    } else {
        format!("{base}/{file_url}")
    }
}

/// Whether the file can be shown inline, judged by its extension.
pub fn is_previewable(file_name: &str) -> bool {
    file_extension(file_name)
        .map(|ext| PREVIEWABLE_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Lowercased extension after the last dot, if any.
pub fn file_extension(file_name: &str) -> Option<String> {
    let (_, ext) = file_name.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Parse and normalise a configured base URL (backend or frontend origin).
pub fn parse_base_url(raw: &str) -> Result<Url, CoreError> {
    let trimmed = raw.trim().trim_end_matches('/');
    Ok(Url::parse(trimmed)?)
}

/// Percent-encode a value for use as a single URL path segment.
pub fn encode_segment(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
