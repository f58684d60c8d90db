use quickgist_core::models::gist::{Gist, format_file_size, sort_newest_first};

fn gist(id: &str, created_at: &str) -> Gist {
    Gist {
        snippet_id: id.to_string(),
        title: format!("gist {id}"),
        description: String::new(),
        content: "body".to_string(),
        is_draft: false,
        created_at: created_at.to_string(),
        user_id: None,
        file_name: None,
        file_url: None,
    }
}

#[test]
fn deserializes_server_shape() {
    let json = r#"{
        "snippetId": "abc",
        "title": "demo",
        "description": "",
        "content": "console.log(1)",
        "isDraft": false,
        "createdAt": "2025-03-01T10:00:00.123456Z",
        "fileName": "notes.txt",
        "fileURL": "/files/abc/notes.txt"
    }"#;
    let gist: Gist = serde_json::from_str(json).unwrap();
    assert_eq!(gist.snippet_id, "abc");
    assert!(gist.is_anonymous());
    assert!(gist.has_file());
    assert_eq!(gist.file_url.as_deref(), Some("/files/abc/notes.txt"));
    assert!(gist.created_timestamp().is_some());
}

#[test]
fn missing_optional_fields_default() {
    let json = r#"{"snippetId":"x","title":"t","createdAt":"2025-03-01T10:00:00Z"}"#;
    let gist: Gist = serde_json::from_str(json).unwrap();
    assert_eq!(gist.description, "");
    assert_eq!(gist.content, "");
    assert!(!gist.is_draft);
    assert!(!gist.has_file());
}

#[test]
fn empty_user_id_counts_as_anonymous() {
    let mut g = gist("a", "2025-03-01T10:00:00Z");
    g.user_id = Some(String::new());
    assert!(g.is_anonymous());
    g.user_id = Some("user_1".to_string());
    assert_eq!(g.owner(), Some("user_1"));
}

#[test]
fn serializes_with_wire_names() {
    let mut g = gist("a", "2025-03-01T10:00:00Z");
    g.file_url = Some("/files/a/x.txt".to_string());
    let value = serde_json::to_value(&g).unwrap();
    assert_eq!(value["snippetId"], "a");
    assert_eq!(value["fileURL"], "/files/a/x.txt");
    assert!(value.get("userId").is_none());
}

#[test]
fn sorts_most_recent_first() {
    let mut gists = vec![
        gist("old", "2024-01-01T00:00:00Z"),
        gist("broken", "yesterday"),
        gist("new", "2025-06-01T12:00:00Z"),
        gist("mid", "2025-01-01T00:00:00+02:00"),
    ];
    sort_newest_first(&mut gists);
    let ids: Vec<_> = gists.iter().map(|g| g.snippet_id.as_str()).collect();
    assert_eq!(ids, ["new", "mid", "old", "broken"]);
}

#[test]
fn file_sizes_are_human_readable() {
    assert_eq!(format_file_size(512), "512 B");
    assert_eq!(format_file_size(1536), "1.5 KB");
    assert_eq!(format_file_size(5 * 1024 * 1024), "5.0 MB");
}
