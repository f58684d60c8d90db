use std::sync::Arc;

use quickgist_auth::Identity;
use quickgist_cli::list::{ListPage, ListState, truncate};
use quickgist_cli::profile::{ProfileState, RECENT_LIMIT, load_profile};
use quickgist_cli::submission::{GistForm, SubmissionFlow};
use quickgist_core::models::gist::Gist;
use quickgist_core::validation::Limits;
use quickgist_query::Queries;
use quickgist_testing::FakeGistApi;
use quickgist_testing::fixtures::{gist, owned_gist};

const ORIGIN: &str = "https://quickgist.example";

fn list_page(api: FakeGistApi) -> (Arc<Queries<FakeGistApi>>, ListPage<FakeGistApi>) {
    let queries = Arc::new(Queries::new(api));
    let page = ListPage::new(queries.clone(), ORIGIN);
    (queries, page)
}

#[tokio::test]
async fn signed_out_user_is_asked_to_sign_in() {
    let (queries, page) = list_page(FakeGistApi::new());

    let state = page.load(&Identity::anonymous()).await;

    assert_eq!(
        state,
        ListState::SignInRequired {
            sign_in_url: format!("{ORIGIN}/sign-in"),
        }
    );
    assert_eq!(queries.api().total_calls(), 0);
}

#[tokio::test]
async fn no_gists_is_empty() {
    let (_, page) = list_page(FakeGistApi::new().with_gist(owned_gist("x", "other", 0, "user_2")));
    assert_eq!(page.load(&Identity::signed_in("user_1")).await, ListState::Empty);
}

#[tokio::test]
async fn gists_are_listed_newest_first() {
    let (_, page) = list_page(
        FakeGistApi::new()
            .with_gist(owned_gist("old", "old", 0, "user_1"))
            .with_gist(owned_gist("new", "new", 100, "user_1"))
            .with_gist(owned_gist("mid", "mid", 50, "user_1")),
    );

    let ListState::Loaded(summaries) = page.load(&Identity::signed_in("user_1")).await else {
        panic!("expected loaded list");
    };
    let ids: Vec<&str> = summaries.iter().map(|s| s.snippet_id.as_str()).collect();
    assert_eq!(ids, ["new", "mid", "old"]);
    assert_eq!(summaries[0].view_url, format!("{ORIGIN}/view/new"));
    assert_eq!(summaries[0].created_date, "2023-11-14");
}

#[tokio::test]
async fn summary_carries_badges_and_short_description() {
    let long = "x".repeat(300);
    let (_, page) = list_page(FakeGistApi::new().with_gist(Gist {
        is_draft: true,
        description: long,
        file_name: Some("a.txt".to_string()),
        file_url: Some("/files/a/a.txt".to_string()),
        ..owned_gist("a", "draft", 0, "user_1")
    }));

    let ListState::Loaded(summaries) = page.load(&Identity::signed_in("user_1")).await else {
        panic!("expected loaded list");
    };
    assert!(summaries[0].is_draft);
    assert!(summaries[0].has_file);
    assert_eq!(summaries[0].description.chars().count(), 123);
    assert!(summaries[0].description.ends_with("..."));
}

#[tokio::test]
async fn read_failure_is_reported() {
    let api = FakeGistApi::new();
    api.set_fail_reads(true);
    let (_, page) = list_page(api);

    let ListState::Failed(message) = page.load(&Identity::signed_in("user_1")).await else {
        panic!("expected failure");
    };
    assert!(message.contains("API Error: 500"));
}

#[tokio::test]
async fn attributed_create_refreshes_list() {
    let (queries, page) =
        list_page(FakeGistApi::new().with_gist(owned_gist("a", "first", 0, "user_1")));
    let me = Identity::signed_in("user_1");

    assert!(matches!(page.load(&me).await, ListState::Loaded(ref s) if s.len() == 1));

    let flow = SubmissionFlow::new(ORIGIN, Limits::default());
    flow.set_form(GistForm {
        title: "second".to_string(),
        content: "body".to_string(),
        ..GistForm::default()
    });
    flow.submit(&*queries, &me).await.unwrap();

    assert!(matches!(page.load(&me).await, ListState::Loaded(ref s) if s.len() == 2));
    assert_eq!(queries.api().fetch_user_gists_calls(), 2);
}

#[tokio::test]
async fn anonymous_create_leaves_list_cached() {
    let (queries, page) =
        list_page(FakeGistApi::new().with_gist(owned_gist("a", "first", 0, "user_1")));
    let me = Identity::signed_in("user_1");
    page.load(&me).await;

    let flow = SubmissionFlow::new(ORIGIN, Limits::default());
    flow.set_form(GistForm {
        title: "anon".to_string(),
        content: "body".to_string(),
        post_anonymously: true,
        ..GistForm::default()
    });
    flow.submit(&*queries, &me).await.unwrap();

    assert!(matches!(page.load(&me).await, ListState::Loaded(ref s) if s.len() == 1));
    assert_eq!(queries.api().fetch_user_gists_calls(), 1);
}

#[tokio::test]
async fn refresh_bypasses_cache() {
    let (queries, page) =
        list_page(FakeGistApi::new().with_gist(owned_gist("a", "first", 0, "user_1")));
    let me = Identity::signed_in("user_1");

    page.load(&me).await;
    page.refresh(&me).await;

    assert_eq!(queries.api().fetch_user_gists_calls(), 2);
}

#[tokio::test]
async fn profile_counts_gists_and_limits_recent() {
    let mut api = FakeGistApi::new().with_gist(gist("anon", "not mine", 500));
    for i in 0..7 {
        let mut g = owned_gist(&format!("g{i}"), &format!("gist {i}"), i * 10, "user_1");
        g.is_draft = i % 3 == 0;
        api = api.with_gist(g);
    }
    let queries = Queries::new(api);

    let ProfileState::Loaded(profile) =
        load_profile(&queries, &Identity::signed_in("user_1"), ORIGIN).await
    else {
        panic!("expected profile");
    };

    assert_eq!(profile.user_id, "user_1");
    assert_eq!(profile.gist_count, 7);
    assert_eq!(profile.draft_count, 3);
    assert_eq!(profile.recent.len(), RECENT_LIMIT);
    assert_eq!(profile.recent[0].snippet_id, "g6");
}

#[tokio::test]
async fn profile_requires_sign_in() {
    let queries = Queries::new(FakeGistApi::new());
    let state = load_profile(&queries, &Identity::anonymous(), ORIGIN).await;
    assert!(matches!(state, ProfileState::SignInRequired { .. }));
    assert_eq!(queries.api().total_calls(), 0);
}

#[test]
fn truncate_keeps_short_text() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("a few words here", 6), "a few...");
}
