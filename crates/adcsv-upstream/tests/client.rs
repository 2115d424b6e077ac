//! Integration tests for `UpstreamClient` pagination using wiremock HTTP mocks.

use adcsv_upstream::{fetch_all, UpstreamClient};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> UpstreamClient {
    UpstreamClient::new(base_url, "test-token", 5, "adcsv-test", 50)
        .expect("client construction should not fail")
}

fn insights_page(ids: &[i64], current: u64, total: u64) -> serde_json::Value {
    let insights: Vec<_> = ids.iter().map(|id| json!({ "id": id, "clicks": 1 })).collect();
    json!({
        "insights": insights,
        "pagination": { "current": current, "total": total }
    })
}

#[tokio::test]
async fn fetch_all_requests_exactly_the_declared_pages() {
    let server = MockServer::start().await;

    for page in 1..=3u64 {
        let ids = [i64::try_from(page).expect("page")];
        Mock::given(method("GET"))
            .and(path("/insights"))
            .and(query_param("page", page.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(insights_page(&ids, page, 3)))
            .expect(1)
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/insights"))
        .and(query_param("page", "4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(insights_page(&[4], 4, 3)))
        .expect(0)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let items = fetch_all(&client, "insights", &[("platform", "meta_ads")]).await;

    let ids: Vec<_> = items.iter().map(|i| i["id"].as_i64()).collect();
    assert_eq!(ids, vec![Some(1), Some(2), Some(3)]);
}

#[tokio::test]
async fn fetch_all_sends_bearer_token_and_params() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/accounts"))
        .and(header("authorization", "Bearer test-token"))
        .and(query_param("platform", "ga4"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accounts": [{ "id": "1", "name": "Acme", "token": "abc" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let items = fetch_all(&client, "accounts", &[("platform", "ga4")]).await;

    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "Acme");
}

#[tokio::test]
async fn fetch_all_returns_first_page_when_second_fails() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/insights"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(insights_page(&[1, 2], 1, 3)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/insights"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/insights"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(insights_page(&[3], 3, 3)))
        .expect(0)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let items = fetch_all(&client, "insights", &[]).await;

    let ids: Vec<_> = items.iter().map(|i| i["id"].as_i64()).collect();
    assert_eq!(ids, vec![Some(1), Some(2)]);
}

#[tokio::test]
async fn fetch_all_treats_invalid_json_as_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/fields"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let items = fetch_all(&client, "fields", &[]).await;

    assert!(items.is_empty());
}

#[tokio::test]
async fn fetch_all_absorbs_unreachable_upstream() {
    // Nothing listens on port 9 on loopback; the connect fails immediately.
    let client = test_client("http://127.0.0.1:9");
    let items = fetch_all(&client, "platforms", &[]).await;

    assert!(items.is_empty());
}
