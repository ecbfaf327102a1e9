//! Integration tests for the web scraper against a mock HTTP server
//!
//! Covers:
//! - Independent per-URL results in batches
//! - Selector extraction during scraping
//! - Local and server-reported rate limits

mod common;

use adapterkit::adapters::WebScraper;
use adapterkit::error::codes;
use adapterkit::{Adapter, Scraper};
use common::raw;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PAGE: &str = r#"<html><head><title>Shop</title></head>
<body><h1>Deals</h1><a class="item" href="/p/1">One</a><a class="item" href="/p/2">Two</a></body></html>"#;

fn scraper(config: serde_json::Value) -> WebScraper {
    WebScraper::new(&raw(config)).expect("scraper should build")
}

#[tokio::test]
async fn test_batch_failure_does_not_abort_other_urls() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/u1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("broken"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/u2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let u1 = format!("{}/u1", server.uri());
    let u2 = format!("{}/u2", server.uri());
    let scraper = scraper(json!({}));

    let results = scraper
        .scrape_batch(&[u1.clone(), u2.clone()], &Default::default())
        .await;

    assert_eq!(results.len(), 2);
    let err = results[&u1].as_ref().unwrap_err();
    assert_eq!(err.code, "http_500");
    let page = results[&u2].as_ref().expect("u2 is independent of u1");
    assert!(page.html.contains("<h1>Deals</h1>"));
    assert!(page.data.is_none());

    // The batch records the failure like any other call.
    assert_eq!(scraper.last_error().unwrap().code, "http_500");
}

#[tokio::test]
async fn test_scrape_with_selectors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/shop"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
        .mount(&server)
        .await;

    let scraper = scraper(json!({}));
    let options = raw(json!({
        "selectors": {"heading": "h1", "links": "a.item@href", "names": "a.item", "none": "table"},
        "request": {"headers": {"Accept": "text/html"}, "retries": 2},
    }));
    let page = scraper
        .scrape(&format!("{}/shop", server.uri()), &options)
        .await
        .unwrap();

    let data = page.data.expect("selectors produce data");
    assert_eq!(data["heading"], "Deals");
    assert_eq!(data["links"], json!(["/p/1", "/p/2"]));
    assert_eq!(data["names"], json!(["One", "Two"]));
    assert!(data["none"].is_null());
}

#[tokio::test]
async fn test_bad_selector_is_recorded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
        .mount(&server)
        .await;

    let scraper = scraper(json!({}));
    let options = raw(json!({"selectors": {"broken": "a[["}}));
    let err = scraper.scrape(&server.uri(), &options).await.unwrap_err();

    assert_eq!(err.code, codes::INVALID_SELECTOR);
    assert_eq!(scraper.last_error(), Some(err));
}

#[tokio::test]
async fn test_local_rate_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(2)
        .mount(&server)
        .await;

    let scraper = scraper(json!({"rate_limit_per_minute": "2"}));
    let before = scraper.rate_limit_status().await;
    assert_eq!((before.remaining, before.limit), (2, 2));

    scraper.scrape(&server.uri(), &Default::default()).await.unwrap();
    assert_eq!(scraper.rate_limit_status().await.remaining, 1);
    scraper.scrape(&server.uri(), &Default::default()).await.unwrap();
    let err = scraper
        .scrape(&server.uri(), &Default::default())
        .await
        .unwrap_err();

    assert_eq!(err.code, codes::RATE_LIMITED);
    assert!(err.is_warning());
    assert!(err.context.contains_key("reset_at"));
    let after = scraper.rate_limit_status().await;
    assert_eq!(after.remaining, 0);
    assert!(after.reset_at > chrono::Utc::now());
}

#[tokio::test]
async fn test_server_rate_limit_headers_override_local_budget() {
    let server = MockServer::start().await;
    let reset = chrono::Utc::now().timestamp() + 120;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("ok")
                .insert_header("X-RateLimit-Limit", "100")
                .insert_header("X-RateLimit-Remaining", "37")
                .insert_header("X-RateLimit-Reset", reset.to_string().as_str()),
        )
        .mount(&server)
        .await;

    let scraper = scraper(json!({}));
    scraper.scrape(&server.uri(), &Default::default()).await.unwrap();

    let status = scraper.rate_limit_status().await;
    assert_eq!(status.limit, 100);
    assert_eq!(status.remaining, 37);
    assert_eq!(status.reset_at.timestamp(), reset);
}

#[tokio::test]
async fn test_sanitized_fractional_timeout_is_accepted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let scraper = scraper(json!({"timeout": "2.5", "retries": "2"}));
    let page = scraper
        .scrape(&server.uri(), &Default::default())
        .await
        .expect("a fractional configured timeout is a valid timeout");

    assert!(page.html.contains("Deals"));
    assert!(scraper.last_error().is_none());
}

#[tokio::test]
async fn test_negative_request_retries_make_one_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let scraper = scraper(json!({}));
    let options = raw(json!({"request": {"retries": -1}}));
    let page = scraper.scrape(&server.uri(), &options).await.unwrap();

    assert_eq!(page.html, "ok");
}

#[tokio::test]
async fn test_rate_limit_reset_as_delta_seconds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("ok")
                .insert_header("X-RateLimit-Limit", "10")
                .insert_header("X-RateLimit-Remaining", "0")
                .insert_header("X-RateLimit-Reset", "60"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let scraper = scraper(json!({}));
    let before = chrono::Utc::now();
    scraper.scrape(&server.uri(), &Default::default()).await.unwrap();

    let status = scraper.rate_limit_status().await;
    assert_eq!((status.remaining, status.limit), (0, 10));
    assert!(status.reset_at >= before + chrono::Duration::seconds(59));
    assert!(status.reset_at <= chrono::Utc::now() + chrono::Duration::seconds(61));

    // The spent server budget gates the next call until its reset.
    let err = scraper
        .scrape(&server.uri(), &Default::default())
        .await
        .unwrap_err();
    assert_eq!(err.code, codes::RATE_LIMITED);
}
