use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde_json::json;
use studio_core::{ErrorKind, SessionEvent};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::support::*;
use crate::RequestOptions;

#[tokio::test]
async fn test_attaches_bearer_and_json_content_type() {
    let server = MockServer::start().await;
    let (client, _store, access) = logged_in_client(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/v1/custom/"))
        .and(header("Authorization", format!("Bearer {}", access).as_str()))
        .and(header("Content-Type", "application/json"))
        .and(body_json(json!({ "ping": true })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "pong": true })))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/api/v1/custom/", server.uri());
    let response = client
        .authenticated_request(Method::POST, &url, RequestOptions::json(json!({ "ping": true })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_caller_headers_override_defaults() {
    let server = MockServer::start().await;
    let (client, _store, _access) = logged_in_client(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/export/"))
        .and(header("Content-Type", "text/csv"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/api/v1/export/", server.uri());
    let options =
        RequestOptions::default().with_header(CONTENT_TYPE, HeaderValue::from_static("text/csv"));
    client
        .authenticated_request(Method::GET, &url, options)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_other_failures_come_back_as_responses() {
    let server = MockServer::start().await;
    let (client, _store, _access) = logged_in_client(&server).await;

    Mock::given(method("DELETE"))
        .and(path("/api/v1/orders/9/delete/"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "detail": "Not found." })))
        .mount(&server)
        .await;

    let url = format!("{}/api/v1/orders/9/delete/", server.uri());
    let response = client
        .authenticated_request(Method::DELETE, &url, RequestOptions::default())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(client.tokens().get().await.unwrap().is_some());
}

#[tokio::test]
async fn test_no_token_fails_before_sending() {
    let server = MockServer::start().await;
    let (client, _store) = client_for(&server);

    let url = format!("{}/api/v1/anything/", server.uri());
    let err = client
        .authenticated_request(Method::GET, &url, RequestOptions::default())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NoSession);
    assert_eq!(err.to_string(), "Authentication required");
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_expired_token_is_still_sent() {
    let server = MockServer::start().await;
    let (client, _store) = client_for(&server);
    let stale = token_expiring_in(-60);
    client.tokens().set(&stale, "r").await.unwrap();

    Mock::given(method("GET"))
        .and(header("Authorization", format!("Bearer {}", stale).as_str()))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/api/v1/users/me/", server.uri());
    client
        .authenticated_request(Method::GET, &url, RequestOptions::default())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_unauthorized_clears_tokens_and_notifies() {
    let server = MockServer::start().await;
    let (client, store, _access) = logged_in_client(&server).await;
    let mut events = client.subscribe();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "Given token not valid for any token type"
        })))
        .mount(&server)
        .await;

    let url = format!("{}/api/v1/users/me/", server.uri());
    let err = client
        .authenticated_request(Method::GET, &url, RequestOptions::default())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::SessionExpired);
    assert_eq!(err.to_string(), "Authentication expired");
    assert!(store.is_empty());
    assert!(client.tokens().refresh_token().await.unwrap().is_none());
    assert_eq!(events.try_recv().unwrap(), SessionEvent::Expired);
}

#[tokio::test]
async fn test_transport_failure_is_a_network_failure() {
    let (client, _store) = client_for_url(UNREACHABLE_URL);
    client.tokens().set("a.b.c", "r").await.unwrap();

    let url = format!("{}/api/v1/users/me/", UNREACHABLE_URL);
    let err = client
        .authenticated_request(Method::GET, &url, RequestOptions::default())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NetworkFailure);
    assert!(client.tokens().get().await.unwrap().is_some());
}
