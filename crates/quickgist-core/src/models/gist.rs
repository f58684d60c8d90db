use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// A shared snippet of text or code, optionally with one attached file.
///
/// Every field except the file descriptor is assigned at creation time and
/// never changes afterward. `snippet_id` and `created_at` come from the
/// backend; the client never fills them in itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gist {
    pub snippet_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub is_draft: bool,
    /// RFC 3339 timestamp as sent by the server.
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, rename = "fileURL", skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
}

impl Gist {
    /// Owner id, treating an empty string the same as an absent one.
    pub fn owner(&self) -> Option<&str> {
        self.user_id.as_deref().filter(|id| !id.is_empty())
    }

    pub fn is_anonymous(&self) -> bool {
        self.owner().is_none()
    }

    pub fn has_file(&self) -> bool {
        self.file_name.as_deref().is_some_and(|name| !name.is_empty())
    }

    /// `created_at` parsed for ordering. `None` if the server sent something
    /// that is not a valid timestamp.
    pub fn created_timestamp(&self) -> Option<jiff::Timestamp> {
        self.created_at.parse().ok()
    }
}

/// Most-recent-first ordering by `created_at`. Gists with unparseable
/// timestamps sort after every gist with a valid one.
pub fn newest_first(a: &Gist, b: &Gist) -> Ordering {
    match (a.created_timestamp(), b.created_timestamp()) {
        (Some(ta), Some(tb)) => tb.cmp(&ta),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => b.created_at.cmp(&a.created_at),
    }
}

/// Sort a gist list in place for display.
pub fn sort_newest_first(gists: &mut [Gist]) {
    gists.sort_by(newest_first);
}

/// A file picked for upload alongside a new gist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub mime_type: Option<String>,
}

impl FileUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
            mime_type: None,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Parameters for the create operation, after sanitization and validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateGistParams {
    pub title: String,
    pub description: String,
    pub content: String,
    pub is_draft: bool,
    /// Present only for attributed gists.
    pub user_id: Option<String>,
    pub file: Option<FileUpload>,
}

impl CreateGistParams {
    /// Owner id, treating an empty string the same as an absent one.
    pub fn owner(&self) -> Option<&str> {
        self.user_id.as_deref().filter(|id| !id.is_empty())
    }
}

/// Human-readable byte count, e.g. `1.5 KB`.
pub fn format_file_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = 1024 * 1024;
    if bytes < KB {
        format!("{bytes} B")
    } else if bytes < MB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    }
}
