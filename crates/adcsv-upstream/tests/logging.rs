//! What `fetch_all` writes to the log when the upstream misbehaves.

use std::io;
use std::sync::{Arc, Mutex};

use adcsv_upstream::{fetch_all, UpstreamClient};
use serde_json::json;
use tracing::Level;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Clone, Default)]
struct CapturedLog(Arc<Mutex<Vec<u8>>>);

impl CapturedLog {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().expect("lock").clone()).expect("utf-8 log")
    }
}

impl io::Write for CapturedLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("lock").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Runs one `fetch_all` of `/accounts` with an INFO-level subscriber installed
/// for the current thread and returns everything it logged.
async fn log_of_accounts_fetch(server: &MockServer) -> String {
    let log = CapturedLog::default();
    let writer = log.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_ansi(false)
        .without_time()
        .with_writer(move || writer.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let client = UpstreamClient::new(&server.uri(), "test-token", 5, "adcsv-test", 50)
        .expect("client construction should not fail");
    let items = fetch_all(&client, "accounts", &[("platform", "meta_ads")]).await;
    assert!(items.is_empty());

    log.text()
}

#[tokio::test]
async fn unknown_shape_logs_keys_but_not_account_tokens() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accounts": { "id": 1, "name": "Acme", "token": "tok-acme-secret" }
        })))
        .mount(&server)
        .await;

    let log = log_of_accounts_fetch(&server).await;

    assert!(log.contains("unexpected upstream response shape"), "log: {log}");
    assert!(log.contains("accounts"), "log: {log}");
    assert!(!log.contains("tok-acme-secret"), "log: {log}");
}

#[tokio::test]
async fn failed_status_is_logged_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/accounts"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let log = log_of_accounts_fetch(&server).await;

    assert_eq!(log.matches("returning partial result").count(), 1, "log: {log}");
    assert!(!log.contains("non-success status"), "log: {log}");
    assert!(log.contains("502"), "log: {log}");
}
