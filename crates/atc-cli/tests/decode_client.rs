use atc_cli::{
    BufferedOutput, DecodeClient, Outcome, Tone, EMPTY_INPUT_ADVISORY, PENDING_MESSAGE,
};
use atc_core::{DECODE_ROUTE, NO_EXPLANATION_FALLBACK};
use axum::{extract::State, http::StatusCode, routing::post, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

/// Proxy double that answers every request with one canned status and body.
struct FakeProxy {
    status: StatusCode,
    body: String,
    received: Mutex<Vec<Value>>,
}

impl FakeProxy {
    fn requests(&self) -> Vec<Value> {
        self.received.lock().unwrap().clone()
    }
}

async fn decode(State(proxy): State<Arc<FakeProxy>>, body: String) -> (StatusCode, String) {
    let parsed = serde_json::from_str(&body).unwrap_or(Value::Null);
    proxy.received.lock().unwrap().push(parsed);
    (proxy.status, proxy.body.clone())
}

async fn spawn_proxy(status: StatusCode, body: impl Into<String>) -> (Arc<FakeProxy>, SocketAddr) {
    let proxy = Arc::new(FakeProxy {
        status,
        body: body.into(),
        received: Mutex::new(Vec::new()),
    });
    let app = Router::new()
        .route(DECODE_ROUTE, post(decode))
        .with_state(proxy.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (proxy, addr)
}

fn client_for(addr: SocketAddr) -> DecodeClient {
    DecodeClient::for_base_url(&format!("http://{}", addr)).unwrap()
}

#[tokio::test]
async fn blank_input_shows_advisory_and_sends_nothing() {
    let (proxy, addr) = spawn_proxy(StatusCode::OK, "{}").await;
    let client = client_for(addr);

    for input in ["", "   ", "\t\n"] {
        let mut out = BufferedOutput::default();
        let outcome = client.decode(input, &mut out).await;
        assert_eq!(outcome, Outcome::Skipped);
        assert_eq!(out.history.len(), 1);
        assert_eq!(out.current().unwrap().tone, Tone::Advisory);
        assert_eq!(out.current().unwrap().text, EMPTY_INPUT_ADVISORY);
    }
    assert!(proxy.requests().is_empty());
}

#[tokio::test]
async fn trimmed_phrase_is_posted_once_and_explanation_rendered() {
    let (proxy, addr) = spawn_proxy(
        StatusCode::OK,
        json!({ "explanation": "Taxi to the holding point and stop." }).to_string(),
    )
    .await;
    let client = client_for(addr);
    let mut out = BufferedOutput::default();

    let outcome = client
        .decode("  taxi to holding point runway two seven  ", &mut out)
        .await;

    assert_eq!(
        outcome,
        Outcome::Explained("Taxi to the holding point and stop.".into())
    );
    assert_eq!(
        proxy.requests(),
        vec![json!({ "phrase": "taxi to holding point runway two seven" })]
    );
    assert_eq!(out.history[0].tone, Tone::Pending);
    assert_eq!(out.history[0].text, PENDING_MESSAGE);
    let current = out.current().unwrap();
    assert_eq!(current.tone, Tone::Explanation);
    assert_eq!(current.text, "Taxi to the holding point and stop.");
}

#[tokio::test]
async fn missing_explanation_renders_fallback() {
    let (_proxy, addr) = spawn_proxy(StatusCode::OK, "{}").await;
    let client = client_for(addr);
    let mut out = BufferedOutput::default();

    let outcome = client.decode("roger", &mut out).await;

    assert_eq!(outcome, Outcome::Explained(NO_EXPLANATION_FALLBACK.into()));
    assert_eq!(out.current().unwrap().text, NO_EXPLANATION_FALLBACK);
}

#[tokio::test]
async fn server_error_text_is_rendered_instead_of_explanation() {
    let (_proxy, addr) = spawn_proxy(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "error": "Failed to get explanation from AI: timeout" }).to_string(),
    )
    .await;
    let client = client_for(addr);
    let mut out = BufferedOutput::default();

    let outcome = client.decode("go around", &mut out).await;

    assert_eq!(
        outcome,
        Outcome::Failed("Failed to get explanation from AI: timeout".into())
    );
    let current = out.current().unwrap();
    assert_eq!(current.tone, Tone::Error);
    assert_eq!(
        current.text,
        "Error: Failed to get explanation from AI: timeout. Could not get an explanation."
    );
    assert!(out.history.iter().all(|r| r.tone != Tone::Explanation));
}

#[tokio::test]
async fn non_json_error_uses_generic_status_message() {
    let (_proxy, addr) = spawn_proxy(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>").await;
    let client = client_for(addr);
    let mut out = BufferedOutput::default();

    let outcome = client.decode("roger", &mut out).await;

    assert_eq!(outcome, Outcome::Failed("HTTP error! Status: 502".into()));
    assert_eq!(out.current().unwrap().tone, Tone::Error);
}

#[tokio::test]
async fn unparseable_success_body_is_an_error() {
    let (_proxy, addr) = spawn_proxy(StatusCode::OK, "not json").await;
    let client = client_for(addr);
    let mut out = BufferedOutput::default();

    let outcome = client.decode("roger", &mut out).await;

    assert!(matches!(outcome, Outcome::Failed(_)));
    assert_eq!(out.current().unwrap().tone, Tone::Error);
}

#[tokio::test]
async fn unreachable_proxy_never_leaves_pending() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let client = client_for(addr);
    let mut out = BufferedOutput::default();

    let outcome = client.decode("cleared to land", &mut out).await;

    assert!(matches!(outcome, Outcome::Failed(_)));
    assert_eq!(out.history.len(), 2);
    assert_eq!(out.current().unwrap().tone, Tone::Error);
    assert!(out
        .current()
        .unwrap()
        .text
        .ends_with("Could not get an explanation."));
}

#[tokio::test]
async fn each_submission_makes_its_own_request() {
    let (proxy, addr) = spawn_proxy(
        StatusCode::OK,
        json!({ "explanation": "Acknowledged." }).to_string(),
    )
    .await;
    let client = client_for(addr);

    for _ in 0..2 {
        let mut out = BufferedOutput::default();
        client.decode("wilco", &mut out).await;
    }
    assert_eq!(proxy.requests().len(), 2);
}
