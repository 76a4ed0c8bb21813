//! Token reissue against a mock backend

mod common;

use common::{Fixture, NOW, issued, mount_reissue};
use railo_http::RailClient;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_concurrent_refreshes_share_one_call() {
    let fx = Fixture::new().await;
    mount_reissue(
        &fx.server,
        "/auth/reissue",
        ResponseTemplate::new(200)
            .set_body_json(issued("T2", 600))
            .set_delay(Duration::from_millis(200)),
        1,
    )
    .await;

    let reissue = fx.client.manager().reissue();
    let outcomes = futures::future::join_all((0..5).map(|_| reissue.refresh_tokens())).await;

    assert_eq!(outcomes, vec![true; 5]);
    assert!(!reissue.is_in_flight());
    assert_eq!(fx.session.token().as_deref(), Some("T2"));
    assert_eq!(
        fx.session.credentials().unwrap().expires_at_ms(),
        NOW + 600_000
    );
}

#[tokio::test]
async fn test_refresh_after_settling_makes_new_call() {
    let fx = Fixture::new().await;
    mount_reissue(
        &fx.server,
        "/auth/reissue",
        ResponseTemplate::new(200).set_body_json(issued("T2", 60)),
        2,
    )
    .await;

    let reissue = fx.client.manager().reissue();
    assert!(reissue.refresh_tokens().await);
    assert!(reissue.refresh_tokens().await);
}

#[tokio::test]
async fn test_reissue_sends_no_bearer_and_persists_token() {
    let fx = Fixture::with_token("T1", NOW - 1).await;
    Mock::given(method("POST"))
        .and(path("/auth/reissue"))
        .and(|req: &wiremock::Request| !req.headers.contains_key("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(issued("T2", 600)))
        .expect(1)
        .mount(&fx.server)
        .await;

    assert!(fx.client.manager().reissue().refresh_tokens().await);
    assert_eq!(
        fx.persisted(),
        Some(json!({ "accessToken": "T2", "tokenExpiresIn": NOW + 600_000 }))
    );
}

#[tokio::test]
async fn test_fallback_endpoint_after_not_found() {
    let fx = Fixture::new().await;
    mount_reissue(&fx.server, "/auth/reissue", ResponseTemplate::new(404), 1).await;
    mount_reissue(
        &fx.server,
        "/api/v1/auth/reissue",
        ResponseTemplate::new(200).set_body_json(issued("T3", 120)),
        1,
    )
    .await;

    assert!(fx.client.manager().reissue().refresh_tokens().await);
    assert_eq!(fx.session.token().as_deref(), Some("T3"));
}

#[tokio::test]
async fn test_unauthorized_and_server_errors_fall_through() {
    let fx = Fixture::new().await;
    mount_reissue(&fx.server, "/auth/reissue", ResponseTemplate::new(500), 1).await;
    mount_reissue(&fx.server, "/api/v1/auth/reissue", ResponseTemplate::new(401), 1).await;

    assert!(!fx.client.manager().reissue().refresh_tokens().await);
}

#[tokio::test]
async fn test_empty_result_counts_as_failure() {
    let fx = Fixture::with_token("T1", NOW - 1).await;
    mount_reissue(
        &fx.server,
        "/auth/reissue",
        ResponseTemplate::new(200).set_body_json(json!({ "message": "ok", "result": null })),
        1,
    )
    .await;
    mount_reissue(
        &fx.server,
        "/api/v1/auth/reissue",
        ResponseTemplate::new(200).set_body_json(issued("", 600)),
        1,
    )
    .await;

    assert!(!fx.client.manager().reissue().refresh_tokens().await);
    assert_eq!(fx.session.token(), None);
    assert_eq!(
        fx.persisted(),
        Some(json!({ "accessToken": null, "tokenExpiresIn": null }))
    );
}

#[tokio::test]
async fn test_unparsable_body_counts_as_failure() {
    let fx = Fixture::new().await;
    mount_reissue(
        &fx.server,
        "/auth/reissue",
        ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"),
        1,
    )
    .await;
    mount_reissue(&fx.server, "/api/v1/auth/reissue", ResponseTemplate::new(404), 1).await;

    assert!(!fx.client.manager().reissue().refresh_tokens().await);
}

#[tokio::test]
async fn test_timeout_moves_to_next_endpoint() {
    let fx = Fixture::new().await;
    mount_reissue(
        &fx.server,
        "/auth/reissue",
        ResponseTemplate::new(200)
            .set_body_json(issued("SLOW", 600))
            .set_delay(Duration::from_secs(5)),
        1,
    )
    .await;
    mount_reissue(
        &fx.server,
        "/api/v1/auth/reissue",
        ResponseTemplate::new(200).set_body_json(issued("FAST", 600)),
        1,
    )
    .await;

    assert!(fx.client.manager().reissue().refresh_tokens().await);
    assert_eq!(fx.session.token().as_deref(), Some("FAST"));
}

#[tokio::test]
async fn test_failed_refresh_releases_flight() {
    let fx = Fixture::new().await;
    mount_reissue(&fx.server, "/auth/reissue", ResponseTemplate::new(401), 2).await;
    mount_reissue(&fx.server, "/api/v1/auth/reissue", ResponseTemplate::new(401), 2).await;

    let reissue = fx.client.manager().reissue();
    assert!(!reissue.refresh_tokens().await);
    assert!(!reissue.is_in_flight());
    assert!(!reissue.refresh_tokens().await);
}

#[tokio::test]
async fn test_refused_connection_moves_to_next_endpoint() {
    let fx = Fixture::new().await;
    mount_reissue(
        &fx.server,
        "/api/v1/auth/reissue",
        ResponseTemplate::new(200).set_body_json(issued("T2", 600)),
        1,
    )
    .await;

    let client = RailClient::builder()
        .base_url(fx.server.uri())
        .session(Arc::clone(&fx.session))
        .reissue_paths(["http://127.0.0.1:9/auth/reissue", "/api/v1/auth/reissue"])
        .reissue_timeout(Duration::from_secs(2))
        .build()
        .unwrap();

    assert!(client.manager().reissue().refresh_tokens().await);
    assert_eq!(fx.session.token().as_deref(), Some("T2"));
}

#[tokio::test]
async fn test_all_endpoints_unreachable_clears_session() {
    let fx = Fixture::with_token("T1", NOW - 1).await;
    let client = RailClient::builder()
        .base_url("http://127.0.0.1:9")
        .session(Arc::clone(&fx.session))
        .reissue_timeout(Duration::from_secs(2))
        .build()
        .unwrap();

    assert!(!client.manager().reissue().refresh_tokens().await);
    assert_eq!(fx.session.token(), None);
    assert_eq!(
        fx.persisted(),
        Some(json!({ "accessToken": null, "tokenExpiresIn": null }))
    );
}
