use std::sync::Arc;
use std::time::Duration;

use quickgist_auth::Identity;
use quickgist_cli::submission::{
    GistForm, SubmissionFlow, SubmissionState, SubmitError, build_params,
};
use quickgist_core::models::gist::FileUpload;
use quickgist_core::validation::{Field, Limits};
use quickgist_query::Queries;
use quickgist_testing::FakeGistApi;

const ORIGIN: &str = "https://quickgist.example";

fn form(title: &str, content: &str) -> GistForm {
    GistForm {
        title: title.to_string(),
        content: content.to_string(),
        ..GistForm::default()
    }
}

fn flow_with(form: GistForm) -> SubmissionFlow {
    let flow = SubmissionFlow::new(ORIGIN, Limits::default());
    flow.set_form(form);
    flow
}

#[test]
fn signed_in_user_owns_gist_by_default() {
    let params = build_params(
        &form("hello", "fn main() {}"),
        &Identity::signed_in("user_1"),
        &Limits::default(),
    )
    .unwrap();
    assert_eq!(params.user_id.as_deref(), Some("user_1"));
}

#[test]
fn anonymous_toggle_drops_owner() {
    let form = GistForm {
        post_anonymously: true,
        ..form("hello", "fn main() {}")
    };
    let params = build_params(&form, &Identity::signed_in("user_1"), &Limits::default()).unwrap();
    assert_eq!(params.user_id, None);
}

#[test]
fn signed_out_gist_is_anonymous() {
    let params = build_params(
        &form("hello", "x"),
        &Identity::anonymous(),
        &Limits::default(),
    )
    .unwrap();
    assert_eq!(params.user_id, None);
}

#[test]
fn title_and_description_are_sanitized_but_content_is_not() {
    let form = GistForm {
        description: "<b>bold</b> text".to_string(),
        ..form("<script>alert(1)</script>Demo", "<div>kept</div>")
    };
    let params = build_params(&form, &Identity::anonymous(), &Limits::default()).unwrap();

    assert_eq!(params.title, "alert(1)Demo");
    assert_eq!(params.description, "bold text");
    assert_eq!(params.content, "<div>kept</div>");
}

#[test]
fn title_of_only_tags_is_required() {
    let err = build_params(
        &form("<br>", "content"),
        &Identity::anonymous(),
        &Limits::default(),
    )
    .unwrap_err();
    assert_eq!(err.message_for(Field::Title), Some("Title is required"));
}

#[tokio::test]
async fn successful_submit_returns_share_url_and_resets_form() {
    let queries = Queries::new(FakeGistApi::new());
    let flow = flow_with(GistForm {
        post_anonymously: true,
        ..form("hello", "print('hi')")
    });

    let submission = flow
        .submit(&queries, &Identity::signed_in("user_1"))
        .await
        .unwrap();

    assert_eq!(submission.gist.snippet_id, "fake-1");
    assert_eq!(submission.share_url, format!("{ORIGIN}/view/fake-1"));
    assert!(submission.gist.is_anonymous());
    assert_eq!(flow.state(), SubmissionState::Success);

    let after = flow.form();
    assert!(after.title.is_empty());
    assert!(after.content.is_empty());
    assert!(after.post_anonymously);
}

#[tokio::test]
async fn invalid_form_sends_no_request() {
    let queries = Queries::new(FakeGistApi::new());
    let flow = flow_with(form("", ""));

    let err = flow.submit(&queries, &Identity::anonymous()).await.unwrap_err();

    let SubmitError::Validation(errors) = err else {
        panic!("expected validation error, got {err:?}");
    };
    assert!(errors.has(Field::Title));
    assert!(errors.has(Field::Content));
    assert_eq!(queries.api().total_calls(), 0);
    assert_eq!(flow.state(), SubmissionState::Failed);
}

#[tokio::test]
async fn oversized_file_sends_no_request() {
    let queries = Queries::new(FakeGistApi::new());
    let flow = SubmissionFlow::new(
        ORIGIN,
        Limits {
            file_max_bytes: 10,
            ..Limits::default()
        },
    );
    flow.set_form(GistForm {
        file: Some(FileUpload::new("big.bin", vec![0; 11])),
        ..form("big", "")
    });

    let err = flow.submit(&queries, &Identity::anonymous()).await.unwrap_err();

    assert!(matches!(err, SubmitError::Validation(ref e) if e.has(Field::File)));
    assert_eq!(queries.api().create_gist_calls(), 0);
}

#[tokio::test]
async fn file_alone_satisfies_content_requirement() {
    let queries = Queries::new(FakeGistApi::new());
    let flow = flow_with(GistForm {
        file: Some(FileUpload::new("notes.txt", b"hello".to_vec())),
        ..form("notes", "")
    });

    let submission = flow.submit(&queries, &Identity::anonymous()).await.unwrap();

    assert_eq!(submission.gist.file_name.as_deref(), Some("notes.txt"));
    assert_eq!(queries.api().created_params()[0].file.as_ref().unwrap().size(), 5);
}

#[tokio::test]
async fn failed_submit_keeps_form_for_retry() {
    let queries = Queries::new(FakeGistApi::new());
    queries.api().set_fail_creates(true);
    let original = form("retry me", "body");
    let flow = flow_with(original.clone());

    let err = flow.submit(&queries, &Identity::anonymous()).await.unwrap_err();
    assert!(matches!(err, SubmitError::Api(ref e) if e.status() == Some(500)));
    assert_eq!(flow.state(), SubmissionState::Failed);
    assert_eq!(flow.form(), original);

    queries.api().set_fail_creates(false);
    let submission = flow.submit(&queries, &Identity::anonymous()).await.unwrap();
    assert_eq!(submission.gist.title, "retry me");
    assert_eq!(queries.api().create_gist_calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn second_submit_while_in_flight_is_rejected() {
    let queries = Arc::new(Queries::new(
        FakeGistApi::new().with_latency(Duration::from_millis(100)),
    ));
    let flow = Arc::new(flow_with(form("once", "body")));

    let first = tokio::spawn({
        let queries = queries.clone();
        let flow = flow.clone();
        async move { flow.submit(&*queries, &Identity::anonymous()).await }
    });
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(flow.state(), SubmissionState::Submitting);

    let second = flow.submit(&*queries, &Identity::anonymous()).await;
    assert!(matches!(second, Err(SubmitError::InFlight)));

    let first = first.await.unwrap();
    assert!(first.is_ok());
    assert_eq!(queries.api().create_gist_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn dropped_submit_returns_to_idle() {
    let queries = Queries::new(FakeGistApi::new().with_latency(Duration::from_millis(100)));
    let flow = flow_with(form("cancel", "body"));

    let result = tokio::time::timeout(
        Duration::from_millis(10),
        flow.submit(&queries, &Identity::anonymous()),
    )
    .await;

    assert!(result.is_err());
    assert_eq!(flow.state(), SubmissionState::Idle);
    assert_eq!(flow.form().title, "cancel");
}
