//! Startup validation and the async auth gate

mod common;

use common::{Fixture, NOW, issued, mount_reissue};
use railo_core::{GateDecision, GateOptions};
use railo_http::AuthGate;
use serde_json::json;
use std::time::Duration;
use wiremock::ResponseTemplate;

#[tokio::test]
async fn test_expired_token_is_reissued_on_initialize() {
    let fx = Fixture::with_token("T1", NOW - 1_000).await;
    mount_reissue(
        &fx.server,
        "/auth/reissue",
        ResponseTemplate::new(200).set_body_json(issued("T2", 600)),
        1,
    )
    .await;

    // Hydrated but not trusted yet
    assert_eq!(fx.session.token().as_deref(), Some("T1"));
    assert!(!fx.session.is_initialized());

    fx.client.manager().initialize().await;

    assert!(fx.session.is_initialized());
    assert!(fx.session.is_authenticated());
    let credentials = fx.session.credentials().unwrap();
    assert_eq!(credentials.access_token(), "T2");
    assert_eq!(credentials.expires_at_ms(), NOW + 600_000);
    assert_eq!(
        fx.persisted(),
        Some(json!({ "accessToken": "T2", "tokenExpiresIn": NOW + 600_000 }))
    );
}

#[tokio::test]
async fn test_fresh_token_skips_network() {
    let fx = Fixture::with_token("T1", NOW + 60_000).await;
    mount_reissue(&fx.server, "/auth/reissue", ResponseTemplate::new(500), 0).await;

    fx.client.manager().initialize().await;

    assert!(fx.session.is_initialized());
    assert_eq!(fx.session.token().as_deref(), Some("T1"));
}

#[tokio::test]
async fn test_double_initialize_reissues_at_most_once() {
    let fx = Fixture::new().await;
    mount_reissue(
        &fx.server,
        "/auth/reissue",
        ResponseTemplate::new(200)
            .set_body_json(issued("T2", 600))
            .set_delay(Duration::from_millis(100)),
        1,
    )
    .await;

    let manager = fx.client.manager();
    futures::join!(manager.initialize(), manager.initialize());
    manager.initialize().await;

    assert!(fx.session.is_initialized());
    assert_eq!(fx.session.token().as_deref(), Some("T2"));
}

#[tokio::test]
async fn test_failed_initialization_clears_and_finishes() {
    let fx = Fixture::with_token("T1", NOW - 1).await;
    mount_reissue(&fx.server, "/auth/reissue", ResponseTemplate::new(401), 1).await;
    mount_reissue(&fx.server, "/api/v1/auth/reissue", ResponseTemplate::new(404), 1).await;

    fx.client.manager().initialize().await;

    assert!(fx.session.is_initialized());
    assert!(!fx.session.is_authenticated());
    assert_eq!(fx.session.token(), None);
}

#[tokio::test]
async fn test_gate_checks_until_resolved_then_allows() {
    let fx = Fixture::with_token("T1", NOW + 60_000).await;
    let mut gate = AuthGate::new(
        fx.client.manager().clone(),
        GateOptions::protecting("/ticket/history"),
    );

    assert!(gate.status().is_checking);
    assert_eq!(gate.decision(), GateDecision::Checking);

    assert_eq!(gate.resolve().await, GateDecision::Allow);
    assert_eq!(gate.status().is_logged_in(), Some(true));
}

#[tokio::test]
async fn test_gate_redirects_when_unauthenticated() {
    let fx = Fixture::new().await;
    mount_reissue(&fx.server, "/auth/reissue", ResponseTemplate::new(401), 1).await;
    mount_reissue(&fx.server, "/api/v1/auth/reissue", ResponseTemplate::new(401), 1).await;

    let mut gate = AuthGate::new(
        fx.client.manager().clone(),
        GateOptions::protecting("/ticket/history"),
    );

    assert_eq!(
        gate.resolve().await,
        GateDecision::Redirect("/login?redirectTo=%2Fticket%2Fhistory".to_string())
    );
    assert!(gate.status().is_unauthenticated());
}

#[tokio::test]
async fn test_gate_follows_logout_elsewhere() {
    let fx = Fixture::with_token("T1", NOW + 60_000).await;
    let mut gate = AuthGate::new(fx.client.manager().clone(), GateOptions::default());
    assert_eq!(gate.resolve().await, GateDecision::Allow);

    fx.session.remove_tokens();

    let (status, decision) = gate.changed().await.unwrap();
    assert!(!status.is_authenticated);
    assert_eq!(decision, GateDecision::Redirect("/login".to_string()));
}

#[tokio::test]
async fn test_gate_reevaluates_expiry_on_read() {
    let fx = Fixture::with_token("T1", NOW + 1_000).await;
    let mut gate = AuthGate::new(fx.client.manager().clone(), GateOptions::default());
    assert_eq!(gate.resolve().await, GateDecision::Allow);

    fx.clock.advance(Duration::from_secs(2));
    assert_eq!(gate.decision(), GateDecision::Redirect("/login".to_string()));
}
