use reqwest::StatusCode;
use reqwest::header::{HeaderName, HeaderValue};
use serde_json::{Value, json};
use sitechat_http::{HttpClient, HttpError, RequestOpts};
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn get_text_returns_body_for_absolute_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>hello</p>"))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::unanchored().unwrap();
    let body = client
        .get_text(&format!("{}/page.html", server.uri()), RequestOpts::default())
        .await
        .unwrap();

    assert_eq!(body, "<p>hello</p>");
}

#[tokio::test]
async fn non_success_status_is_an_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(404)
                .insert_header("x-request-id", "abc-1")
                .set_body_json(json!({"message": "no such page"})),
        )
        .mount(&server)
        .await;

    let client = HttpClient::new(&server.uri()).unwrap();
    let err = client
        .get_text("/missing", RequestOpts::default())
        .await
        .unwrap_err();

    match err {
        HttpError::Api {
            status,
            message,
            request_id,
        } => {
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(message, "no such page");
            assert_eq!(request_id, "abc-1");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn slow_responses_time_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let client = HttpClient::unanchored()
        .unwrap()
        .with_timeout(Duration::from_millis(100));
    let err = client
        .get_text(&server.uri(), RequestOpts::default())
        .await
        .unwrap_err();

    assert!(err.is_timeout(), "got {err:?}");
}

#[tokio::test]
async fn failed_requests_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::unanchored().unwrap();
    let result = client.get_text(&server.uri(), RequestOpts::default()).await;

    assert!(result.is_err());
    // MockServer verifies `.expect(1)` on drop.
}

#[tokio::test]
async fn post_json_sends_header_auth_and_decodes_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/m:generateContent"))
        .and(header("x-goog-api-key", "secret-key"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"hello": "world"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::new(&format!("{}/v1beta/", server.uri())).unwrap();
    let opts = RequestOpts::default().secret_header(
        HeaderName::from_static("x-goog-api-key"),
        HeaderValue::from_static("secret-key"),
    );
    let got: Value = client
        .post_json("models/m:generateContent", &json!({"hello": "world"}), opts)
        .await
        .unwrap();

    assert_eq!(got, json!({"ok": true}));
}

#[tokio::test]
async fn per_request_timeout_overrides_the_default() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let client = HttpClient::unanchored()
        .unwrap()
        .with_timeout(Duration::from_millis(50));
    let opts = RequestOpts::default().timeout(Duration::from_secs(5));
    let body = client.get_text(&server.uri(), opts).await.unwrap();
    assert_eq!(body, "");
}

#[tokio::test]
async fn invalid_utf8_is_replaced() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![b'o', b'k', 0xff]))
        .mount(&server)
        .await;

    let client = HttpClient::unanchored().unwrap();
    let body = client
        .get_text(&server.uri(), RequestOpts::default())
        .await
        .unwrap();
    assert_eq!(body, "ok\u{fffd}");
}

#[tokio::test]
async fn undecodable_json_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = HttpClient::new(&server.uri()).unwrap();
    let err = client
        .post_json::<_, Value>("/x", &json!({}), RequestOpts::default())
        .await
        .unwrap_err();

    match err {
        HttpError::Decode(_, snippet) => assert_eq!(snippet, "not json"),
        other => panic!("expected Decode error, got {other:?}"),
    }
}

#[tokio::test]
async fn get_page_keeps_error_bodies() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("<h1>Not Found</h1>"))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::unanchored().unwrap();
    let page = client
        .get_page(&server.uri(), RequestOpts::default())
        .await
        .unwrap();

    assert_eq!(page.status, StatusCode::NOT_FOUND);
    assert_eq!(page.body, "<h1>Not Found</h1>");
    assert!(!page.truncated);
}

#[tokio::test]
async fn bodies_past_the_cap_are_cut() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(4096)))
        .mount(&server)
        .await;

    let client = HttpClient::unanchored().unwrap().with_max_body(100);
    let page = client
        .get_page(&server.uri(), RequestOpts::default())
        .await
        .unwrap();
    assert_eq!(page.body.len(), 100);
    assert!(page.truncated);

    let text = client
        .get_text(&server.uri(), RequestOpts::default())
        .await
        .unwrap();
    assert_eq!(text.len(), 100);
}
