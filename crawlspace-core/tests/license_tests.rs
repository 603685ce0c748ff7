// Tests for the subscription backend client

use crawlspace_core::license::{
    check_subscription, generate_customer_id, verify_token, SubscriptionStatus,
};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[test]
fn test_generate_customer_id_shape() {
    let id = generate_customer_id();
    assert!(id.starts_with("cust_"));
    assert_eq!(id.len(), "cust_".len() + 32);
    assert_ne!(id, generate_customer_id());
}

#[test]
fn test_subscription_status_parses_wire_format() {
    // field names as the backend sends them
    let json = r#"{"subscribed":true,"expiresAt":"2026-09-28T00:00:00.000Z","token":"jwt"}"#;
    let status: SubscriptionStatus = serde_json::from_str(json).unwrap();

    assert!(status.subscribed);
    assert_eq!(status.expires_at.as_deref(), Some("2026-09-28T00:00:00.000Z"));
    assert_eq!(status.token.as_deref(), Some("jwt"));
}

#[test]
fn test_subscription_status_tolerates_missing_fields() {
    let status: SubscriptionStatus = serde_json::from_str(r#"{"subscribed":false}"#).unwrap();
    assert!(!status.subscribed);
    assert!(status.expires_at.is_none());
    assert!(status.token.is_none());
}

#[tokio::test]
async fn test_verify_token_valid() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/verify-token"))
        .and(header("authorization", "Bearer good-token"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"valid":true}"#))
        .mount(&server)
        .await;

    let valid = verify_token(&server.uri(), "good-token").await.unwrap();
    assert!(valid);
}

#[tokio::test]
async fn test_verify_token_rejected_status_means_invalid() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/verify-token"))
        .respond_with(ResponseTemplate::new(403).set_body_string(r#"{"error":"Invalid token"}"#))
        .mount(&server)
        .await;

    let valid = verify_token(&server.uri(), "stale-token").await.unwrap();
    assert!(!valid);
}

#[tokio::test]
async fn test_check_subscription_active() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/verify-subscription/cust_abc"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"subscribed":true,"expiresAt":"2026-09-28T00:00:00.000Z","token":"jwt"}"#,
        ))
        .mount(&server)
        .await;

    let status = check_subscription(&server.uri(), "cust_abc").await.unwrap();
    assert!(status.subscribed);
    assert_eq!(status.token.as_deref(), Some("jwt"));
}

#[tokio::test]
async fn test_check_subscription_unknown_customer_is_unsubscribed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/verify-subscription/cust_nobody"))
        .respond_with(ResponseTemplate::new(404).set_body_string(r#"{"subscribed":false}"#))
        .mount(&server)
        .await;

    let status = check_subscription(&server.uri(), "cust_nobody")
        .await
        .unwrap();
    assert!(!status.subscribed);
}
