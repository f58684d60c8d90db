use quickgist_core::models::gist::Gist;

/// Base of the fake clock: 2023-11-14T22:13:20Z.
const EPOCH_SECONDS: i64 = 1_700_000_000;

/// RFC 3339 timestamp `offset_secs` after the fake epoch.
pub fn timestamp(offset_secs: i64) -> String {
    jiff::Timestamp::from_second(EPOCH_SECONDS + offset_secs)
        .map(|t| t.to_string())
        .unwrap_or_default()
}

/// A minimal published gist.
pub fn gist(id: &str, title: &str, offset_secs: i64) -> Gist {
    Gist {
        snippet_id: id.to_string(),
        title: title.to_string(),
        description: String::new(),
        content: format!("// {title}"),
        is_draft: false,
        created_at: timestamp(offset_secs),
        user_id: None,
        file_name: None,
        file_url: None,
    }
}

/// Same as [`gist`] but owned by `user_id`.
pub fn owned_gist(id: &str, title: &str, offset_secs: i64, user_id: &str) -> Gist {
    Gist {
        user_id: Some(user_id.to_string()),
        ..gist(id, title, offset_secs)
    }
}
