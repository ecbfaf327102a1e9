//! Integration tests for HTTP transport

use adapterkit_transport::{
    HttpRequest, HttpTransport, HttpTransportConfig, Transport, TransportError,
};
use std::time::Duration;
use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_http_request_builder() {
    let request = HttpRequest::new("GET", "https://example.com")
        .with_header("Authorization", "Bearer token123")
        .with_header("Content-Type", "application/json")
        .with_timeout(Duration::from_secs(3))
        .with_redirect_limit(2);

    assert_eq!(request.method, "GET");
    assert_eq!(request.url, "https://example.com");
    assert_eq!(request.headers.len(), 2);
    assert_eq!(
        request.headers.get("Authorization"),
        Some(&"Bearer token123".to_string())
    );
    assert_eq!(request.timeout, Some(Duration::from_secs(3)));
    assert_eq!(request.redirect_limit, Some(2));
}

#[tokio::test]
async fn test_successful_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hooks/run"))
        .and(header("x-api-key", "k1"))
        .and(header("cookie", "a=1; b=2"))
        .and(body_string("{\"go\":true}"))
        .respond_with(ResponseTemplate::new(201).set_body_string("created"))
        .expect(1)
        .mount(&server)
        .await;

    let transport = HttpTransport::new().unwrap();
    let request = HttpRequest::new("post", format!("{}/hooks/run", server.uri()))
        .with_header("x-api-key", "k1")
        .with_cookie("b", "2")
        .with_cookie("a", "1")
        .with_text_body("{\"go\":true}");

    let response = transport.send_http(request).await.unwrap();
    assert_eq!(response.status, 201);
    assert_eq!(response.text().unwrap(), "created");
}

#[tokio::test]
async fn test_error_status_is_not_a_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let transport = HttpTransport::new().unwrap();
    let response = transport
        .send_http(HttpRequest::new("GET", server.uri()))
        .await
        .unwrap();

    assert_eq!(response.status, 503);
    assert!(response.is_error());
}

#[tokio::test]
async fn test_connection_refused_is_connection_error() {
    let transport = HttpTransport::new().unwrap();
    let err = transport
        .send_http(HttpRequest::new("GET", "http://127.0.0.1:1/unreachable"))
        .await
        .unwrap_err();

    assert!(matches!(err, TransportError::Connection(_)), "got {err:?}");
}

#[tokio::test]
async fn test_request_timeout_is_timeout_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let transport = HttpTransport::new().unwrap();
    let err = transport
        .send_http(HttpRequest::new("GET", server.uri()).with_timeout(Duration::from_millis(100)))
        .await
        .unwrap_err();

    assert!(matches!(err, TransportError::Timeout(_)), "got {err:?}");
}

#[tokio::test]
async fn test_redirect_limit_is_enforced() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/loop"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("location", format!("{}/loop", server.uri())),
        )
        .mount(&server)
        .await;

    let transport = HttpTransport::with_config(HttpTransportConfig::default()).unwrap();
    let err = transport
        .send_http(HttpRequest::new("GET", format!("{}/loop", server.uri())).with_redirect_limit(2))
        .await
        .unwrap_err();

    assert!(matches!(err, TransportError::Redirect(_)), "got {err:?}");
}

#[tokio::test]
async fn test_zero_redirect_limit_returns_redirect_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/moved"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/elsewhere"))
        .mount(&server)
        .await;

    let transport = HttpTransport::new().unwrap();
    let response = transport
        .send_http(
            HttpRequest::new("GET", format!("{}/moved", server.uri())).with_redirect_limit(0),
        )
        .await
        .unwrap();

    assert_eq!(response.status, 301);
    assert_eq!(response.get_header("Location"), Some("/elsewhere"));
}
