use quickgist_core::models::gist::FileUpload;
use quickgist_core::validation::{Field, Limits, sanitize, validate};

#[test]
fn sanitize_strips_tags() {
    assert_eq!(sanitize("<b>demo</b>"), "demo");
    assert_eq!(sanitize("hello <script>alert(1)</script> world"), "hello alert(1) world");
    assert_eq!(sanitize("plain text"), "plain text");
}

#[test]
fn sanitize_drops_unterminated_tag() {
    assert_eq!(sanitize("a < b"), "a ");
    assert_eq!(sanitize("title <img src=x"), "title ");
}

#[test]
fn valid_form_passes() {
    let result = validate("demo", "", "console.log(1)", None, &Limits::default());
    assert!(result.is_ok());
}

#[test]
fn missing_title_is_rejected() {
    let err = validate("   ", "", "body", None, &Limits::default()).unwrap_err();
    assert_eq!(err.message_for(Field::Title), Some("Title is required"));
    assert!(!err.has(Field::Content));
}

#[test]
fn title_over_limit_is_rejected() {
    let title = "x".repeat(101);
    let err = validate(&title, "", "body", None, &Limits::default()).unwrap_err();
    assert!(err.has(Field::Title));

    let title = "x".repeat(100);
    assert!(validate(&title, "", "body", None, &Limits::default()).is_ok());
}

#[test]
fn title_limit_counts_characters_not_bytes() {
    let title = "é".repeat(100);
    assert!(validate(&title, "", "body", None, &Limits::default()).is_ok());
}

#[test]
fn description_over_limit_is_rejected() {
    let description = "d".repeat(501);
    let err = validate("demo", &description, "body", None, &Limits::default()).unwrap_err();
    assert!(err.has(Field::Description));
}

#[test]
fn empty_content_without_file_is_rejected() {
    let err = validate("demo", "", "", None, &Limits::default()).unwrap_err();
    assert!(err.has(Field::Content));

    let err = validate("demo", "", " \n\t", None, &Limits::default()).unwrap_err();
    assert!(err.has(Field::Content));
}

#[test]
fn empty_content_with_file_is_accepted() {
    let file = FileUpload::new("notes.txt", b"hello".to_vec());
    assert!(validate("demo", "", "", Some(&file), &Limits::default()).is_ok());
}

#[test]
fn oversized_file_is_rejected() {
    let limits = Limits {
        file_max_bytes: 4,
        ..Limits::default()
    };
    let file = FileUpload::new("notes.txt", b"hello".to_vec());
    let err = validate("demo", "", "", Some(&file), &limits).unwrap_err();
    assert!(err.has(Field::File));
    assert!(!err.has(Field::Content));
}

#[test]
fn content_over_limit_is_rejected() {
    let limits = Limits {
        content_max: 10,
        ..Limits::default()
    };
    let err = validate("demo", "", "01234567890", None, &limits).unwrap_err();
    assert_eq!(err.message_for(Field::Content), Some("Content is too large"));
}

#[test]
fn all_field_errors_are_collected() {
    let err = validate("", &"d".repeat(600), "", None, &Limits::default()).unwrap_err();
    assert_eq!(err.errors.len(), 3);
    let rendered = err.to_string();
    assert!(rendered.contains("title: Title is required"));
    assert!(rendered.contains("description:"));
    assert!(rendered.contains("content:"));
}
