//! Integration tests for the HTTP client adapter: origin resolution,
//! credential attachment and error classification over real HTTP.

use emporium_client::{ApiOrigin, ErrorKind, Session, StatusCode};
use emporium_integration_tests::{ADMIN_TOKEN, StubBackend, admin_session, customer_session};
use serde_json::{Value, json};

// ============================================================================
// Endpoint resolution
// ============================================================================

#[test]
fn test_host_resolves_origin() {
    for host in ["marzok16.github.io", "shop.loca.lt", "abc.ngrok-free.app"] {
        let origin = ApiOrigin::for_host(host);
        assert_eq!(origin.as_str(), "https://99e4adbd0611.ngrok-free.app/api");
        assert!(origin.is_tunnel());
    }
    for host in ["localhost", "127.0.0.1", "example.com"] {
        let origin = ApiOrigin::for_host(host);
        assert_eq!(origin.as_str(), "http://127.0.0.1:8000/api");
        assert!(!origin.is_tunnel());
    }
}

// ============================================================================
// Credentials
// ============================================================================

#[tokio::test]
async fn test_bearer_token_sent_verbatim() {
    let backend = StubBackend::spawn().await.expect("Failed to start backend");
    let api = backend.admin_api().expect("Failed to build client");

    api.stats().await.expect("Failed to fetch stats");

    let requests = backend.requests_to("/products/dashboard/stats/").await;
    assert_eq!(requests.len(), 1);
    let request = requests.first().expect("No request recorded");
    assert_eq!(
        request.authorization.as_deref(),
        Some(format!("Bearer {ADMIN_TOKEN}").as_str())
    );
    assert_eq!(request.tunnel_header, None);
}

#[tokio::test]
async fn test_public_paths_carry_no_credentials() {
    let backend = StubBackend::spawn().await.expect("Failed to start backend");
    let client = backend.client(admin_session()).expect("Failed to build client");

    let login: Value = client
        .post_json(
            "/users/login/",
            json!({ "email": "customer@example.com", "password": "password" }),
        )
        .await
        .expect("Login failed")
        .data;
    assert!(login["access"].is_string());

    let config: Value = client
        .get("/payments/stripe-config/")
        .await
        .expect("Failed to fetch Stripe config")
        .data;
    assert_eq!(config["publishable_key"], "pk_test_stub");

    for request in backend.requests().await {
        assert_eq!(request.authorization, None, "{} sent a token", request.path);
    }
}

#[tokio::test]
async fn test_anonymous_requests_carry_no_credentials() {
    let backend = StubBackend::spawn().await.expect("Failed to start backend");
    let api = backend.api(Session::anonymous()).expect("Failed to build client");

    let err = api.stats().await.expect_err("Anonymous stats should fail");
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));

    let requests = backend.requests().await;
    let request = requests.first().expect("No request recorded");
    assert_eq!(request.authorization, None);
}

#[tokio::test]
async fn test_sign_in_applies_to_next_request() {
    let backend = StubBackend::spawn().await.expect("Failed to start backend");
    let session = Session::anonymous();
    let api = backend.api(session.clone()).expect("Failed to build client");

    assert!(api.users().await.is_err());
    session.sign_in(ADMIN_TOKEN.to_owned().into(), None).await;
    let users = api.users().await.expect("Signed-in request failed").data;
    assert_eq!(users.len(), 3);
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_non_staff_gets_server_message() {
    let backend = StubBackend::spawn().await.expect("Failed to start backend");
    let api = backend.api(customer_session()).expect("Failed to build client");

    let err = api.users().await.expect_err("Customer should be refused");
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
    assert_eq!(err.server_message().as_deref(), Some("Admin access required"));
}

#[tokio::test]
async fn test_missing_review_is_not_found() {
    let backend = StubBackend::spawn().await.expect("Failed to start backend");
    let api = backend.admin_api().expect("Failed to build client");

    let err = api
        .delete_review(emporium_core::ReviewId::new(999))
        .await
        .expect_err("Deleting a missing review should fail");
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.server_message().as_deref(), Some("Review not found"));
}

#[tokio::test]
async fn test_unreachable_backend_is_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let addr = listener.local_addr().expect("No local address");
    drop(listener);
    let origin = ApiOrigin::parse(&format!("http://{addr}/api")).expect("Invalid origin");

    let api = emporium_client::DashboardApi::new(
        emporium_client::ApiClient::new(origin, admin_session()).expect("Failed to build client"),
    );
    let err = api.stats().await.expect_err("Request should not connect");
    assert_eq!(err.kind(), ErrorKind::Network);
}
