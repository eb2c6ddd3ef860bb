mod helpers;

use chrono::Utc;
use gatekeeper::credentials::errors::CredentialError;
use gatekeeper::credentials::{Issuer, Validator};
use gatekeeper::signer::TokenSigner;
use helpers::{ClientBuilder, PrincipalBuilder, TestDb};

const LIFETIME: i64 = 3600;

struct Fixture {
    db: TestDb,
    issuer: Issuer,
    validator: Validator,
}

/// alice / p@ssw0rd1 and client c1 / s3cret, both active.
async fn fixture() -> Fixture {
    let db = TestDb::new().await;
    let conn = db.connection().clone();
    PrincipalBuilder::new("alice")
        .with_password("p@ssw0rd1")
        .create(&conn)
        .await;
    ClientBuilder::new("c1").with_secret("s3cret").create(&conn).await;

    let signer = db.signer(LIFETIME);
    Fixture {
        issuer: Issuer::new(conn.clone(), signer.clone(), 32),
        validator: Validator::new(conn, signer),
        db,
    }
}

#[tokio::test]
async fn test_password_grant_issues_a_valid_token() {
    let f = fixture().await;

    let token = f
        .issuer
        .issue_password_grant("c1", "s3cret", "alice", "p@ssw0rd1")
        .await
        .expect("grant should succeed");

    assert_eq!(token.principal, "alice");
    assert_eq!(token.client, "c1");
    assert_eq!(token.expires_at - token.created_at, LIFETIME);
    assert_ne!(token.access_token, token.refresh_token);

    let auth = f.validator.validate(&token.access_token).await.unwrap();
    assert_eq!(auth.principal, "alice");
    assert_eq!(auth.client, "c1");
    assert_eq!(auth.expires_at, token.expires_at);
}

#[tokio::test]
async fn test_each_grant_yields_distinct_tokens() {
    let f = fixture().await;
    let a = f
        .issuer
        .issue_password_grant("c1", "s3cret", "alice", "p@ssw0rd1")
        .await
        .unwrap();
    let b = f
        .issuer
        .issue_password_grant("c1", "s3cret", "alice", "p@ssw0rd1")
        .await
        .unwrap();

    assert_ne!(a.access_token, b.access_token);
    assert_ne!(a.refresh_token, b.refresh_token);
    assert!(f.validator.validate(&a.access_token).await.is_ok());
    assert!(f.validator.validate(&b.access_token).await.is_ok());
}

#[tokio::test]
async fn test_password_grant_failures() {
    let f = fixture().await;
    let conn = f.db.connection();
    ClientBuilder::new("svc")
        .with_secret("s3cret")
        .with_grant_kind("client_credentials")
        .create(conn)
        .await;
    ClientBuilder::new("old")
        .with_secret("s3cret")
        .inactive()
        .create(conn)
        .await;
    PrincipalBuilder::new("zed")
        .with_password("p@ssw0rd1")
        .inactive()
        .create(conn)
        .await;

    let issue = |client: &'static str, secret: &'static str, who: &'static str, pw: &'static str| {
        let issuer = f.issuer.clone();
        async move { issuer.issue_password_grant(client, secret, who, pw).await }
    };

    assert!(matches!(
        issue("nope", "s3cret", "alice", "p@ssw0rd1").await,
        Err(CredentialError::InvalidClient)
    ));
    assert!(matches!(
        issue("c1", "wrong", "alice", "p@ssw0rd1").await,
        Err(CredentialError::InvalidClient)
    ));
    assert!(matches!(
        issue("old", "s3cret", "alice", "p@ssw0rd1").await,
        Err(CredentialError::InvalidClient)
    ));
    assert!(matches!(
        issue("svc", "s3cret", "alice", "p@ssw0rd1").await,
        Err(CredentialError::UnsupportedGrant(_))
    ));
    assert!(matches!(
        issue("c1", "s3cret", "alice", "wrong").await,
        Err(CredentialError::InvalidPrincipal)
    ));
    assert!(matches!(
        issue("c1", "s3cret", "ghost", "p@ssw0rd1").await,
        Err(CredentialError::InvalidPrincipal)
    ));
    assert!(matches!(
        issue("c1", "s3cret", "zed", "p@ssw0rd1").await,
        Err(CredentialError::InvalidPrincipal)
    ));
    // Client authentication is checked before the principal
    assert!(matches!(
        issue("c1", "wrong", "alice", "wrong").await,
        Err(CredentialError::InvalidClient)
    ));
}

#[tokio::test]
async fn test_refresh_rotates_and_kills_the_old_token() {
    let f = fixture().await;
    let first = f
        .issuer
        .issue_password_grant("c1", "s3cret", "alice", "p@ssw0rd1")
        .await
        .unwrap();

    let second = f.issuer.refresh(&first.refresh_token).await.unwrap();
    assert_eq!(second.principal, "alice");
    assert_eq!(second.client, "c1");
    assert_ne!(second.access_token, first.access_token);
    assert_ne!(second.refresh_token, first.refresh_token);

    assert!(matches!(
        f.validator.validate(&first.access_token).await,
        Err(CredentialError::NotFound)
    ));
    assert!(f.validator.validate(&second.access_token).await.is_ok());

    assert!(matches!(
        f.issuer.refresh(&first.refresh_token).await,
        Err(CredentialError::NotFound)
    ));
}

#[tokio::test]
async fn test_refresh_rejects_bad_input() {
    let f = fixture().await;
    assert!(matches!(
        f.issuer.refresh("").await,
        Err(CredentialError::Malformed)
    ));
    assert!(matches!(
        f.issuer.refresh("never-issued").await,
        Err(CredentialError::NotFound)
    ));
}

#[tokio::test]
async fn test_refresh_after_expiry() {
    let f = fixture().await;
    let now = Utc::now().timestamp();
    let token = f
        .issuer
        .issue_password_grant_at("c1", "s3cret", "alice", "p@ssw0rd1", now)
        .await
        .unwrap();

    assert!(matches!(
        f.issuer.refresh_at(&token.refresh_token, now + LIFETIME).await,
        Err(CredentialError::Expired)
    ));
    // Still present, so a timely refresh works
    assert!(f
        .issuer
        .refresh_at(&token.refresh_token, now + LIFETIME - 1)
        .await
        .is_ok());
}

#[tokio::test]
async fn test_concurrent_refresh_has_one_winner() {
    let f = fixture().await;
    let token = f
        .issuer
        .issue_password_grant("c1", "s3cret", "alice", "p@ssw0rd1")
        .await
        .unwrap();

    let (a, b) = tokio::join!(
        f.issuer.refresh(&token.refresh_token),
        f.issuer.refresh(&token.refresh_token)
    );

    let winners = [&a, &b].iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1, "a: {:?}, b: {:?}", a.is_ok(), b.is_ok());
    let loser = if a.is_ok() { b } else { a };
    assert!(matches!(loser, Err(CredentialError::NotFound)));
}

#[tokio::test]
async fn test_revoke_is_idempotent() {
    let f = fixture().await;
    let token = f
        .issuer
        .issue_password_grant("c1", "s3cret", "alice", "p@ssw0rd1")
        .await
        .unwrap();

    f.issuer.revoke(&token.access_token).await.unwrap();
    f.issuer.revoke(&token.access_token).await.unwrap();
    f.issuer.revoke("never-issued").await.unwrap();

    assert!(matches!(
        f.validator.validate(&token.access_token).await,
        Err(CredentialError::NotFound)
    ));
    assert!(matches!(
        f.issuer.refresh(&token.refresh_token).await,
        Err(CredentialError::NotFound)
    ));
}

#[tokio::test]
async fn test_expiry_wins_over_revocation() {
    let f = fixture().await;
    let now = Utc::now().timestamp();
    let token = f
        .issuer
        .issue_password_grant_at("c1", "s3cret", "alice", "p@ssw0rd1", now)
        .await
        .unwrap();
    f.issuer.revoke(&token.access_token).await.unwrap();

    assert!(matches!(
        f.validator.validate_at(&token.access_token, now + 10).await,
        Err(CredentialError::NotFound)
    ));
    assert!(matches!(
        f.validator.validate_at(&token.access_token, now + LIFETIME).await,
        Err(CredentialError::Expired)
    ));
}

#[tokio::test]
async fn test_validate_rejects_malformed_and_foreign_tokens() {
    let f = fixture().await;
    for bogus in ["", "abc", "a.b", "a..c", "a.b.c.d", "a.b.c"] {
        assert!(
            matches!(f.validator.validate(bogus).await, Err(CredentialError::Malformed)),
            "{bogus:?} should be malformed"
        );
    }

    let foreign = TokenSigner::new("some-other-secret-entirely-0123456789", LIFETIME).unwrap();
    let (forged, _) = foreign.sign("alice", "c1", Utc::now().timestamp()).unwrap();
    assert!(matches!(
        f.validator.validate(&forged).await,
        Err(CredentialError::Malformed)
    ));
}

#[tokio::test]
async fn test_deleting_a_principal_drops_its_tokens() {
    let f = fixture().await;
    let token = f
        .issuer
        .issue_password_grant("c1", "s3cret", "alice", "p@ssw0rd1")
        .await
        .unwrap();

    assert!(gatekeeper::storage::delete_principal(f.db.connection(), "alice")
        .await
        .unwrap());
    assert!(matches!(
        f.validator.validate(&token.access_token).await,
        Err(CredentialError::NotFound)
    ));
}
