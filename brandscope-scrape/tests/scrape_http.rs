mod common;

use std::sync::Arc;
use std::time::Duration;

use brandscope_scrape::{HttpFetcher, MetadataExtractor, DEFAULT_DESCRIPTION};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn extractor_with_timeout(timeout: Duration) -> MetadataExtractor {
    common::init_test_tracing();
    let fetcher = HttpFetcher::new("Mozilla/5.0", timeout).expect("build fetcher");
    MetadataExtractor::new(Arc::new(fetcher))
}

fn extractor() -> MetadataExtractor {
    extractor_with_timeout(Duration::from_secs(5))
}

fn html_response(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8")
}

#[tokio::test]
async fn extracts_meta_pair_from_live_page() {
    let server = MockServer::start().await;
    let page = r#"
        <html><head>
          <meta property="og:site_name" content="Acme">
          <meta name="description" content="We make widgets">
        </head><body><p>Filler.</p></body></html>
    "#;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_response(page))
        .mount(&server)
        .await;

    let got = extractor().extract(&server.uri()).await;
    assert_eq!(got.brand_name, "Acme");
    assert_eq!(got.description, "We make widgets");
}

#[tokio::test]
async fn falls_back_to_title_and_paragraph() {
    let server = MockServer::start().await;
    let page = r#"
        <html><head><title>Acme Co</title></head>
        <body><p>  </p><p>Real content here</p></body></html>
    "#;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_response(page))
        .mount(&server)
        .await;

    let got = extractor().extract(&server.uri()).await;
    assert_eq!(got.brand_name, "Acme Co");
    assert_eq!(got.description, "Real content here");
}

#[tokio::test]
async fn bare_page_gets_host_and_default_description() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_response("<html><body></body></html>"))
        .mount(&server)
        .await;

    let got = extractor().extract(&server.uri()).await;
    assert_eq!(got.brand_name, "127.0.0.1");
    assert_eq!(got.description, DEFAULT_DESCRIPTION);
}

#[tokio::test]
async fn non_html_content_type_yields_sentinel() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/pdf")
                .set_body_string("%PDF-1.4 not a web page"),
        )
        .mount(&server)
        .await;

    let got = extractor().extract(&server.uri()).await;
    assert!(got.is_sentinel());
}

#[tokio::test]
async fn upstream_error_statuses_yield_sentinel() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let ex = extractor();
    assert!(ex.extract(&format!("{}/missing", server.uri())).await.is_sentinel());
    assert!(ex.extract(&format!("{}/broken", server.uri())).await.is_sentinel());
}

#[tokio::test]
async fn slow_upstream_times_out_to_sentinel() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            html_response("<html><head><title>Too Slow</title></head></html>")
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let got = extractor_with_timeout(Duration::from_millis(100))
        .extract(&server.uri())
        .await;
    assert!(got.is_sentinel());
}

#[tokio::test]
async fn unreachable_host_yields_sentinel() {
    // Port 1 is essentially never listening; connect is refused immediately.
    let got = extractor_with_timeout(Duration::from_secs(1))
        .extract("http://127.0.0.1:1/")
        .await;
    assert!(got.is_sentinel());
}

#[tokio::test]
async fn invalid_url_yields_sentinel_without_any_request() {
    let got = extractor().extract("not a url").await;
    assert!(got.is_sentinel());
}

#[tokio::test]
async fn redirects_are_followed_to_the_final_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/start"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("location", format!("{}/final", server.uri()).as_str()),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/final"))
        .respond_with(html_response(
            r#"<html><head><meta property="og:site_name" content="Landed"></head></html>"#,
        ))
        .mount(&server)
        .await;

    let got = extractor().extract(&format!("{}/start", server.uri())).await;
    assert_eq!(got.brand_name, "Landed");
}
