use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use quickgist_auth::session::{read_session_unverified, verify_session};
use quickgist_auth::{AuthError, Identity};
use serde_json::json;

const PRIVATE_KEY: &str = include_str!("fixtures/session_private.pem");
const PUBLIC_KEY: &str = include_str!("fixtures/session_public.pem");
const OTHER_PUBLIC_KEY: &str = include_str!("fixtures/other_public.pem");

fn now() -> i64 {
    jiff::Timestamp::now().as_second()
}

fn token(sub: &str, exp: i64) -> String {
    let key = EncodingKey::from_rsa_pem(PRIVATE_KEY.as_bytes()).unwrap();
    let claims = json!({
        "sub": sub,
        "exp": exp,
        "iat": now(),
        "iss": "https://clerk.quickgist.example",
        "sid": "sess_1",
    });
    encode(&Header::new(Algorithm::RS256), &claims, &key).unwrap()
}

#[test]
fn valid_session_resolves_user() {
    let identity = Identity::from_session(Some(&token("user_123", now() + 3600)), Some(PUBLIC_KEY))
        .unwrap();
    assert!(identity.is_signed_in());
    assert_eq!(identity.user_id(), Some("user_123"));
}

#[test]
fn verify_session_returns_claims() {
    let claims = verify_session(&token("user_123", now() + 3600), PUBLIC_KEY).unwrap();
    assert_eq!(claims.sub, "user_123");
    assert_eq!(claims.sid.as_deref(), Some("sess_1"));
}

#[test]
fn no_token_is_anonymous() {
    let identity = Identity::from_session(None, Some(PUBLIC_KEY)).unwrap();
    assert!(!identity.is_signed_in());
    assert_eq!(identity.user_id(), None);

    let identity = Identity::from_session(Some("  "), None).unwrap();
    assert_eq!(identity, Identity::anonymous());
}

#[test]
fn expired_session_is_rejected() {
    let err = verify_session(&token("user_123", now() - 3600), PUBLIC_KEY).unwrap_err();
    assert!(matches!(err, AuthError::TokenExpired));
}

#[test]
fn token_signed_by_another_key_is_rejected() {
    let err = verify_session(&token("user_123", now() + 3600), OTHER_PUBLIC_KEY).unwrap_err();
    assert!(matches!(err, AuthError::Jwt(_)));
}

#[test]
fn malformed_public_key_is_reported() {
    let err = verify_session(&token("user_123", now() + 3600), "not a pem").unwrap_err();
    assert!(matches!(err, AuthError::InvalidPublicKey(_)));
}

#[test]
fn without_public_key_subject_is_read_unverified() {
    let identity = Identity::from_session(Some(&token("user_9", now() + 3600)), None).unwrap();
    assert_eq!(identity.user_id(), Some("user_9"));
}

#[test]
fn unverified_read_still_checks_expiry() {
    let err = read_session_unverified(&token("user_9", now() - 10)).unwrap_err();
    assert!(matches!(err, AuthError::TokenExpired));
}

#[test]
fn garbage_token_is_invalid() {
    assert!(matches!(
        read_session_unverified("not-a-jwt"),
        Err(AuthError::InvalidToken(_))
    ));
    assert!(matches!(
        read_session_unverified("a.!!!.c"),
        Err(AuthError::InvalidToken(_))
    ));
}

#[test]
fn empty_user_id_is_not_signed_in() {
    assert!(!Identity::signed_in("").is_signed_in());
    assert!(Identity::signed_in("user_1").is_signed_in());
}
