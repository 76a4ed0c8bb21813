//! Login and logout flows

mod common;

use common::{Fixture, NOW, issued};
use railo_http::ClientError;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_login_stores_issued_token() {
    let fx = Fixture::new().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({ "memberNo": "2025000001", "password": "pw" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(issued("L1", 1800)))
        .expect(1)
        .mount(&fx.server)
        .await;

    fx.client.login("2025000001", "pw").await.unwrap();

    assert!(fx.session.is_authenticated());
    assert_eq!(fx.session.credentials().unwrap().expires_at_ms(), NOW + 1_800_000);
}

#[tokio::test]
async fn test_bad_credentials_do_not_trigger_reissue() {
    let fx = Fixture::new().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid credentials"))
        .expect(1)
        .mount(&fx.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/reissue"))
        .respond_with(ResponseTemplate::new(200).set_body_json(issued("T2", 600)))
        .expect(0)
        .mount(&fx.server)
        .await;

    let err = fx.client.login("2025000001", "wrong").await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(fx.session.token(), None);
}

#[tokio::test]
async fn test_logout_clears_tokens() {
    let fx = Fixture::with_token("T1", NOW + 60_000).await;
    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .and(header("authorization", "Bearer T1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "bye" })))
        .expect(1)
        .mount(&fx.server)
        .await;

    fx.client.logout().await.unwrap();
    assert_eq!(fx.session.token(), None);
    assert_eq!(
        fx.persisted(),
        Some(json!({ "accessToken": null, "tokenExpiresIn": null }))
    );
}

#[tokio::test]
async fn test_logout_clears_tokens_even_when_server_fails() {
    let fx = Fixture::with_token("T1", NOW + 60_000).await;
    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&fx.server)
        .await;

    let err = fx.client.logout().await.unwrap_err();
    assert!(matches!(err, ClientError::ServerError { status: 500, .. }));
    assert_eq!(fx.session.token(), None);
}
