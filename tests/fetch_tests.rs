//! Fetch layer tests
//!
//! Session routing and release, URL validation, and browser configuration.
//! No test here launches Chrome; the HTTP fetcher runs against a local mock
//! server.

mod common;

use common::*;
use httpmock::prelude::*;
use newsforge_extractor::browser::{BrowserConfig, RenderOptions};
use newsforge_extractor::config::ExtractorConfig;
use newsforge_extractor::error::{Error, ErrorKind, FetchError};
use newsforge_extractor::extractor::SingleExtractor;
use newsforge_extractor::fetch::{user_agent, FetchMode, FetchSession, Fetcher, HttpFetcher};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

const PAGE: &str = "https://news.example.com/a.html";

#[tokio::test]
async fn test_session_routes_by_mode() {
    let http = StaticPages::new().page(PAGE, "<p>static</p>");
    let driver = Arc::new(MockDriver::new().page(PAGE, "<p>rendered</p>"));
    let session = session(http, Some(driver.clone()));

    assert_eq!(session.fetch(PAGE, FetchMode::Static).await.unwrap(), "<p>static</p>");
    assert_eq!(session.fetch(PAGE, FetchMode::Dynamic).await.unwrap(), "<p>rendered</p>");
    assert_eq!(driver.render_count(PAGE), 1);

    session.close().await.unwrap();
}

#[tokio::test]
async fn test_close_is_idempotent() {
    let driver = Arc::new(MockDriver::new());
    let session = session(StaticPages::new(), Some(driver.clone()));

    session.close().await.unwrap();
    session.close().await.unwrap();
    session.close().await.unwrap();

    assert!(session.is_closed());
    assert_eq!(driver.quit_count(), 1);
}

#[tokio::test]
async fn test_closed_session_refuses_work() {
    let http = StaticPages::new().page(PAGE, "<p>static</p>");
    let driver = Arc::new(MockDriver::new().page(PAGE, "<p>rendered</p>"));
    let session = session(http, Some(driver.clone()));
    session.close().await.unwrap();

    assert!(session.fetch(PAGE, FetchMode::Static).await.is_err());
    assert!(session
        .render(PAGE, &RenderOptions::listing())
        .await
        .is_err());
    assert!(driver.rendered().is_empty());
}

#[tokio::test]
async fn test_session_without_browser() {
    let session = session(StaticPages::new(), None);
    assert!(!session.has_browser());

    let err = session.fetch(PAGE, FetchMode::Dynamic).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BrowserFault);

    session.close().await.unwrap();
}

#[tokio::test]
async fn test_single_extractor_close_releases_browser_once() {
    let driver = Arc::new(MockDriver::new());
    let extractor = single(StaticPages::new(), Some(driver.clone()), Default::default());

    extractor.close().await.unwrap();
    assert_eq!(driver.quit_count(), 1);
}

#[tokio::test]
async fn test_http_fetcher_rejects_bad_urls_before_sending() {
    let fetcher = HttpFetcher::new(Duration::from_secs(30)).unwrap();
    assert_eq!(fetcher.mode(), FetchMode::Static);

    for url in ["", "ftp://example.com/file", "not a url"] {
        let err = fetcher.fetch(url).await.unwrap_err();
        assert!(
            matches!(err, Error::Fetch(FetchError::InvalidUrl(_))),
            "{}: {:?}",
            url,
            err
        );
    }
}

#[tokio::test]
async fn test_http_fetcher_returns_body() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/news/a.html");
            then.status(200)
                .header("content-type", "text/html; charset=utf-8")
                .body("<article><p>Hello.</p></article>");
        })
        .await;

    let fetcher = HttpFetcher::new(Duration::from_secs(5)).unwrap();
    let body = fetcher.fetch(&server.url("/news/a.html")).await.unwrap();

    assert_eq!(body, "<article><p>Hello.</p></article>");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_http_fetcher_maps_error_status() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/gone");
            then.status(404).body("not here");
        })
        .await;

    let fetcher = HttpFetcher::new(Duration::from_secs(5)).unwrap();
    let err = fetcher.fetch(&server.url("/gone")).await.unwrap_err();

    match err {
        Error::Fetch(FetchError::HttpStatus { status, ref message }) => {
            assert_eq!(status, 404);
            assert_eq!(message, "Not Found");
        }
        other => panic!("expected HttpStatus, got {:?}", other),
    }
}

#[tokio::test]
async fn test_http_fetcher_times_out() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/stall");
            then.status(200).delay(Duration::from_secs(3)).body("late");
        })
        .await;

    let fetcher = HttpFetcher::new(Duration::from_millis(200)).unwrap();
    let err = fetcher.fetch(&server.url("/stall")).await.unwrap_err();

    assert!(matches!(err, Error::Fetch(FetchError::Timeout(200))), "{:?}", err);
    assert_eq!(err.result_message(), "page load timeout");
}

#[tokio::test]
async fn test_http_fetcher_sends_pooled_user_agent() {
    let server = MockServer::start_async().await;
    for (i, agent) in user_agent::all().iter().enumerate() {
        server
            .mock_async(|when, then| {
                when.method(GET).path("/ua").header("user-agent", *agent);
                then.status(200).body(i.to_string());
            })
            .await;
    }

    let fetcher = HttpFetcher::new(Duration::from_secs(5)).unwrap();
    for _ in 0..5 {
        let body = fetcher.fetch(&server.url("/ua")).await.unwrap();
        let index: usize = body.parse().unwrap();
        assert!(index < user_agent::all().len());
    }
}

#[tokio::test]
async fn test_static_timeout_through_extractor() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/slow");
            then.status(200)
                .delay(Duration::from_secs(3))
                .body("<article><p>Too late.</p></article>");
        })
        .await;

    let http = HttpFetcher::new(Duration::from_millis(200)).unwrap();
    let session = FetchSession::from_parts(Arc::new(http), None, Duration::from_secs(20));
    let extractor = SingleExtractor::with_session(session, ExtractorConfig::default());

    let result = extractor.extract(&server.url("/slow"), FetchMode::Static).await;
    extractor.close().await.unwrap();

    assert!(!result.is_success());
    assert_eq!(result.error(), Some("page load timeout"));
}

#[test]
fn test_fetch_mode_suggestion() {
    assert_eq!(
        FetchMode::suggest_for("https://finance.yahoo.com/news/a.html"),
        FetchMode::Dynamic
    );
    assert_eq!(
        FetchMode::suggest_for("https://www.bloomberg.com/news/articles/x"),
        FetchMode::Dynamic
    );
    assert_eq!(FetchMode::suggest_for(PAGE), FetchMode::Static);
}

#[test]
fn test_user_agent_pool() {
    let pool = user_agent::all();
    assert!(pool.len() >= 5);
    for _ in 0..20 {
        assert!(pool.contains(&user_agent::random()));
    }
}

#[test]
fn test_browser_config_defaults() {
    let config = BrowserConfig::default();
    assert!(config.headless);
    assert_eq!(config.width, 1920);
    assert_eq!(config.height, 1080);
    assert!(!config.sandbox);
    assert_eq!(config.timeout_ms, 20000);
    assert!(config.user_agent.is_none());
    assert!(config.extra_args.contains(&"--disable-dev-shm-usage".to_string()));
}

#[test]
fn test_browser_config_builder() {
    let config = BrowserConfig::builder()
        .headless(false)
        .viewport(1280, 720)
        .user_agent("TestBot/1.0")
        .timeout_ms(60000)
        .arg("--disable-gpu")
        .build();

    assert!(!config.headless);
    assert_eq!(config.width, 1280);
    assert_eq!(config.user_agent.as_deref(), Some("TestBot/1.0"));
    assert_eq!(config.timeout_ms, 60000);
    assert!(config.extra_args.contains(&"--disable-gpu".to_string()));
}

#[test]
fn test_render_options_profiles() {
    let article = RenderOptions::article(Duration::from_secs(20));
    assert_eq!(article.scroll_cycles, 0);
    assert_eq!(article.settle, Duration::ZERO);

    let listing = RenderOptions::listing();
    assert_eq!(listing.timeout, Duration::from_secs(60));
    assert_eq!(listing.settle, Duration::from_secs(10));
    assert_eq!(listing.scroll_cycles, 3);
    assert_eq!(listing.with_settle(Duration::from_secs(5)).settle, Duration::from_secs(5));
}
