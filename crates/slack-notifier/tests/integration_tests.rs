//! Integration tests for slack-notifier.
//!
//! Each test starts a throwaway HTTP server on 127.0.0.1 that stands in for
//! the Slack Web API and records what it receives.

use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use slack_notifier::{AlertLevel, Notifier, SlackClient, SlackConfig, SlackError, SlackMessage};

#[derive(Clone, Default)]
struct Recorded {
    requests: Arc<Mutex<Vec<(Option<String>, Value)>>>,
}

/// Start a fake Slack API answering every post with `reply`.
async fn fake_slack(reply: Value) -> (String, Recorded) {
    let recorded = Recorded::default();

    let app = Router::new()
        .route(
            "/api/chat.postMessage",
            post(
                |State(state): State<Recorded>, headers: HeaderMap, Json(body): Json<Value>| async move {
                    let auth = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string);
                    state.requests.lock().unwrap().push((auth, body));
                    Json(reply)
                },
            ),
        )
        .with_state(recorded.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/api", addr), recorded)
}

fn configured(api_base: &str) -> SlackConfig {
    SlackConfig::new(Some("xoxb-test".into()), Some("C0123".into())).with_api_base(api_base)
}

#[tokio::test]
async fn test_post_message_sends_channel_text_and_token() {
    let (base, recorded) = fake_slack(json!({"ok": true})).await;
    let client = SlackClient::new(configured(&base)).unwrap();

    client.post_message("hello team").await.unwrap();

    let requests = recorded.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let (auth, body) = &requests[0];
    assert_eq!(auth.as_deref(), Some("Bearer xoxb-test"));
    assert_eq!(body, &json!({"channel": "C0123", "text": "hello team"}));
}

#[tokio::test]
async fn test_api_error_is_surfaced() {
    let (base, _) = fake_slack(json!({"ok": false, "error": "channel_not_found"})).await;
    let client = SlackClient::new(configured(&base)).unwrap();

    let err = client.post_message("hello").await.unwrap_err();
    assert!(matches!(err, SlackError::Api(ref code) if code == "channel_not_found"));
}

#[tokio::test]
async fn test_notifier_trigger_reports_outcome() {
    let (base, recorded) = fake_slack(json!({"ok": true})).await;
    let notifier = Notifier::new(configured(&base)).unwrap();

    let sent = notifier
        .trigger(&SlackMessage::Alert {
            alert_level: AlertLevel::MidLevelAlert,
            business_name: "Corner Cafe".into(),
            reason: "TC down 30%".into(),
            summary: "Weekend sales halved".into(),
        })
        .await;
    assert!(sent);

    let requests = recorded.requests.lock().unwrap();
    let text = requests[0].1["text"].as_str().unwrap();
    assert!(text.starts_with(":large_orange_circle: *Mid level alert*"));
    assert!(text.contains("*Business:* Corner Cafe"));
}

#[tokio::test]
async fn test_notifier_without_credentials_returns_false() {
    let (base, recorded) = fake_slack(json!({"ok": true})).await;
    let notifier = Notifier::new(SlackConfig::new(Some("xoxb-test".into()), None).with_api_base(&base)).unwrap();

    let sent = notifier
        .trigger(&SlackMessage::Plain {
            message: "hello".into(),
        })
        .await;

    assert!(!sent);
    assert!(recorded.requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_notifier_unreachable_returns_false() {
    let notifier = Notifier::new(configured("http://127.0.0.1:1/api")).unwrap();

    let sent = notifier
        .trigger(&SlackMessage::Plain {
            message: "hello".into(),
        })
        .await;

    assert!(!sent);
}
