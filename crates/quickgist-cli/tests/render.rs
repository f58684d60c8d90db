use quickgist_cli::list::summarize;
use quickgist_cli::render::{
    GistDetail, HIGHLIGHT_PLAIN_THRESHOLD, SubmissionNotice, SummaryTable, syntax_token,
};
use quickgist_cli::submission::Submission;
use quickgist_cli::view::GistView;
use quickgist_core::models::gist::Gist;
use quickgist_testing::fixtures::{gist, owned_gist};

#[test]
fn plain_detail_has_gutter_and_badges() {
    let g = Gist {
        content: "let a = 1;\nlet b = 2;".to_string(),
        is_draft: true,
        file_name: Some("notes.md".to_string()),
        file_url: Some("/files/x/notes.md".to_string()),
        ..owned_gist("x", "Demo", 0, "user_1")
    };
    let view = GistView::from_gist(g, "http://api.test");

    let out = GistDetail {
        view: &view,
        enable_color: false,
    }
    .to_string();

    assert!(out.starts_with("Demo [draft]\n"));
    assert!(out.contains("user_1"));
    assert!(out.contains("1 │ let a = 1;"));
    assert!(out.contains("2 │ let b = 2;"));
    assert!(out.contains("File: notes.md (preview)"));
    assert!(out.contains("http://api.test/files/x/notes.md"));
}

#[test]
fn anonymous_author_is_labelled() {
    let view = GistView::from_gist(gist("x", "Anon", 0), "http://api.test");
    let out = GistDetail {
        view: &view,
        enable_color: false,
    }
    .to_string();
    assert!(out.contains("anonymous"));
}

#[test]
fn summary_table_lists_links() {
    let summaries = summarize(&[gist("a", "First", 0)], "https://quickgist.example");
    let out = SummaryTable {
        summaries: &summaries,
        enable_color: false,
    }
    .to_string();

    assert!(out.contains("2023-11-14 First"));
    assert!(out.contains("https://quickgist.example/view/a"));
}

fn colored(g: Gist) -> String {
    let view = GistView::from_gist(g, "http://api.test");
    GistDetail {
        view: &view,
        enable_color: true,
    }
    .to_string()
}

#[test]
fn rust_attribute_is_highlighted_as_code() {
    let out = colored(Gist {
        content: "#[derive(Debug)]\nstruct A;".to_string(),
        file_name: Some("a.rs".to_string()),
        ..gist("x", "Rust", 0)
    });

    assert!(out.contains("\u{1b}[38;2;"));
    assert!(!out.contains("\u{1b}[2m#[derive"));
    assert!(out.contains("derive"));
    assert!(out.contains("struct"));
}

#[test]
fn unknown_language_falls_back_to_plain_text() {
    let out = colored(Gist {
        content: "key = \"just some words\"".to_string(),
        file_name: Some("settings.toml".to_string()),
        ..gist("x", "Words", 0)
    });

    assert!(out.contains("key = \"just some words\""));
    assert!(out.contains("\u{1b}[0m"));
}

#[test]
fn oversized_content_is_not_highlighted() {
    let line = "let a = 1;\n";
    let content = line.repeat(HIGHLIGHT_PLAIN_THRESHOLD / line.len() + 1);
    let out = colored(Gist {
        content,
        file_name: Some("big.rs".to_string()),
        ..gist("x", "Big", 0)
    });

    assert!(!out.contains("\u{1b}[38;2;"));
    assert!(out.contains("let a = 1;"));
}

#[test]
fn language_hints_map_to_syntax_tokens() {
    assert_eq!(syntax_token("rust"), "rs");
    assert_eq!(syntax_token("Python"), "py");
    assert_eq!(syntax_token("bash"), "sh");
    assert_eq!(syntax_token("text"), "txt");
    assert_eq!(syntax_token("go"), "go");
}

#[test]
fn submission_notice_points_at_view_command() {
    let submission = Submission {
        gist: gist("abc123", "Demo", 0),
        share_url: "https://quickgist.example/view/abc123".to_string(),
    };

    let out = SubmissionNotice {
        submission: &submission,
        enable_color: false,
    }
    .to_string();

    assert!(out.contains("Gist created anonymously"));
    assert!(out.contains("https://quickgist.example/view/abc123"));
    assert!(out.contains("View now: quickgist view abc123"));
}
