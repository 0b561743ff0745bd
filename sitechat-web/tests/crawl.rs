mod common;

use sitechat_web::{CrawlResult, PageFetcher, SiteCrawler};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn crawler(timeout: Duration) -> SiteCrawler {
    SiteCrawler::new(PageFetcher::new(timeout).expect("fetcher builds"))
}

async fn serve_html(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html; charset=utf-8")
                .set_body_string(body.to_string()),
        )
        .mount(server)
        .await;
}

fn seed_of(server: &MockServer) -> String {
    format!("{}/inventory.html", server.uri())
}

#[tokio::test]
async fn seed_without_anchors_fetches_nothing_else() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    serve_html(&server, "/inventory.html", "<h1>Products</h1><p>No links here.</p>").await;

    let text = crawler(Duration::from_secs(5)).crawl_site(&seed_of(&server)).await;

    assert_eq!(text, "");
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url.path(), "/inventory.html");
}

#[tokio::test]
async fn failing_links_degrade_to_empty_text() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    // Nothing listens on the discard port.
    serve_html(
        &server,
        "/inventory.html",
        r#"<a href="http://127.0.0.1:9/one.html">1</a><a href="http://127.0.0.1:9/two.html">2</a>"#,
    )
    .await;

    let result = crawler(Duration::from_secs(5)).crawl(&seed_of(&server)).await;

    assert_eq!(result.joined(), "");
    assert_eq!(result.links_found, 2);
    assert_eq!(result.dropped, 2);
    assert!(result.pages.is_empty());
}

#[tokio::test]
async fn failed_page_is_dropped_and_order_is_kept() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    serve_html(
        &server,
        "/inventory.html",
        r#"<ul>
             <li><a href="/a.html">A</a></li>
             <li><a href="/b.html">B</a></li>
             <li><a href="c.html">C</a></li>
           </ul>"#,
    )
    .await;
    serve_html(&server, "/a.html", "<html><body><p>a</p></body></html>").await;
    Mock::given(method("GET"))
        .and(path("/b.html"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<p>b</p>")
                .set_delay(Duration::from_secs(3)),
        )
        .expect(1)
        .mount(&server)
        .await;
    serve_html(&server, "/c.html", "<p>c</p><script>ignored()</script>").await;

    let result = crawler(Duration::from_millis(500)).crawl(&seed_of(&server)).await;

    assert_eq!(result.joined(), "a c");
    let paths: Vec<&str> = result.pages.iter().map(|p| p.url.path()).collect();
    assert_eq!(paths, ["/a.html", "/c.html"]);
    assert_eq!(result.dropped, 1);
}

#[tokio::test]
async fn error_status_pages_still_contribute_text() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    serve_html(
        &server,
        "/inventory.html",
        r#"<a href="/a.html">A</a><a href="/gone.html">gone</a>"#,
    )
    .await;
    serve_html(&server, "/a.html", "<p>a</p>").await;
    Mock::given(method("GET"))
        .and(path("/gone.html"))
        .respond_with(ResponseTemplate::new(404).set_body_string("<h1>Not Found</h1>"))
        .expect(1)
        .mount(&server)
        .await;

    let text = crawler(Duration::from_secs(5)).crawl_site(&seed_of(&server)).await;
    assert_eq!(text, "a Not Found");
}

#[tokio::test]
async fn error_status_seed_is_still_parsed_for_links() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/inventory.html"))
        .respond_with(
            ResponseTemplate::new(500).set_body_string(r#"<a href="/status.html">status</a>"#),
        )
        .mount(&server)
        .await;
    serve_html(&server, "/status.html", "<p>degraded</p>").await;

    let text = crawler(Duration::from_secs(5)).crawl_site(&seed_of(&server)).await;
    assert_eq!(text, "degraded");
}

#[tokio::test]
async fn seed_failure_yields_empty_text() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/inventory.html"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"<a href="/a.html">A</a>"#)
                .set_delay(Duration::from_secs(3)),
        )
        .expect(1)
        .mount(&server)
        .await;
    serve_html(&server, "/a.html", "<p>a</p>").await;

    let result = crawler(Duration::from_millis(300)).crawl(&seed_of(&server)).await;
    assert_eq!(result, CrawlResult::default());
}

#[tokio::test]
async fn invalid_seed_yields_empty_text() {
    let text = crawler(Duration::from_secs(1)).crawl_site("not a url").await;
    assert_eq!(text, "");
}

#[tokio::test]
async fn slow_pages_time_out_and_are_dropped() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    serve_html(
        &server,
        "/inventory.html",
        r#"<a href="/slow.html">slow</a><a href="/fast.html">fast</a>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/slow.html"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<p>slow</p>")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;
    serve_html(&server, "/fast.html", "<p>fast</p>").await;

    let text = crawler(Duration::from_millis(300)).crawl_site(&seed_of(&server)).await;
    assert_eq!(text, "fast");
}

#[tokio::test]
async fn non_http_anchors_are_not_fetched() {
    let server = MockServer::start().await;
    serve_html(
        &server,
        "/inventory.html",
        r#"<a href="mailto:shop@example.com">mail</a><a href="/about.html">about</a>"#,
    )
    .await;
    serve_html(&server, "/about.html", "<p>About   us</p>").await;

    let result = crawler(Duration::from_secs(5)).crawl(&seed_of(&server)).await;
    assert_eq!(result.joined(), "About us");
    assert_eq!(result.links_found, 2);
    assert_eq!(result.dropped, 1);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}
