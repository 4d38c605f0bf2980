//! Integration tests for the session synchronizer
//!
//! These drive a full client over the in-process transport, playing the
//! backend by hand. They cover:
//! - Turn lifecycle across tool calls, streaming and commit
//! - Malformed and unknown frames arriving mid-turn
//! - Quick-action loading and replacement
//! - Profile changes racing with a turn
//! - Configuration feeding the transport and report client

use std::io::Write;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tempfile::NamedTempFile;
use tokio::sync::mpsc;

use chat_core::config::{load_config_with_env, ConfigOverrides, ConfigSource};
use chat_core::{
    Activity, Author, ChatClient, ChatEntry, ChatId, ChatSession, InProcessTransport, LinkState,
    Profile, ReportsClient, SessionUpdate, TransportEvent,
};

// =============================================================================
// Harness
// =============================================================================

struct Backend {
    frames: mpsc::Receiver<String>,
    events: mpsc::Sender<TransportEvent>,
}

impl Backend {
    async fn expect(&mut self) -> Value {
        let frame = tokio::time::timeout(Duration::from_secs(1), self.frames.recv())
            .await
            .expect("client sent nothing")
            .expect("client dropped");
        serde_json::from_str(&frame).unwrap()
    }

    async fn push(&self, frame: Value) {
        self.push_raw(frame.to_string()).await;
    }

    async fn push_raw(&self, raw: impl Into<String>) {
        self.events
            .send(TransportEvent::Frame(raw.into()))
            .await
            .unwrap();
    }
}

async fn connected(profile: Profile) -> (ChatClient<InProcessTransport>, Backend) {
    let (transport, frames, events) = InProcessTransport::new_pair();
    let session = ChatSession::new(ChatId::from(42), profile, Some("Credit risk"));
    let mut client = ChatClient::new(transport, session);
    let mut backend = Backend { frames, events };

    client.reports_loaded().await.unwrap();
    client.open().await.unwrap();
    assert_eq!(
        backend.expect().await,
        json!({"type": "initChat", "chatId": 42, "user_profile": profile.wire_name()})
    );

    (client, backend)
}

async fn drain(client: &mut ChatClient<InProcessTransport>, count: usize) -> Vec<SessionUpdate> {
    let mut updates = Vec::new();
    for _ in 0..count {
        updates.extend(client.next_update().await.unwrap());
    }
    updates
}

fn messages(session: &ChatSession) -> Vec<(Author, String)> {
    session
        .timeline()
        .iter()
        .filter_map(ChatEntry::as_message)
        .map(|m| (m.author, m.content.clone()))
        .collect()
}

// =============================================================================
// Turn Lifecycle
// =============================================================================

#[tokio::test]
async fn test_tool_call_then_stream_then_commit() {
    let (mut client, mut backend) = connected(Profile::NonTechnical).await;

    client.send_message("Why is recall low?").await.unwrap();
    assert_eq!(backend.expect().await["message"], "Why is recall low?");

    backend
        .push(json!({"type": "tool_call", "name": "get_confusion_matrix", "args": "{}"}))
        .await;
    drain(&mut client, 1).await;
    assert_eq!(
        client.session().activity(),
        Activity::ToolCall("get_confusion_matrix")
    );

    backend
        .push(json!({"type": "message", "message": "The model", "isFinished": false}))
        .await;
    backend
        .push(json!({"type": "message", "message": "The model misses positives.", "isFinished": false}))
        .await;
    drain(&mut client, 2).await;
    assert_eq!(
        client.session().activity(),
        Activity::Streaming("The model misses positives.")
    );
    assert!(client.session().tool_call().is_none());

    backend
        .push(json!({"type": "message", "message": null, "isFinished": true}))
        .await;
    drain(&mut client, 1).await;

    assert_eq!(client.session().activity(), Activity::Idle);
    assert_eq!(
        messages(client.session())[1..].to_vec(),
        vec![
            (Author::User, "Why is recall low?".to_string()),
            (Author::System, "The model misses positives.".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_noise_mid_turn_is_ignored() {
    let (mut client, mut backend) = connected(Profile::Business).await;

    client.send_message("Summarize").await.unwrap();
    backend.expect().await;

    backend
        .push(json!({"type": "message", "message": "Rev", "isFinished": false}))
        .await;
    backend.push_raw("not json at all").await;
    backend.push(json!({"message": "no discriminator"})).await;
    backend.push(json!({"type": "heartbeat"})).await;
    backend.push(json!({"type": "tool_call"})).await;

    let updates = drain(&mut client, 5).await;
    assert_eq!(updates, vec![SessionUpdate::ActivityChanged]);
    assert_eq!(client.session().activity(), Activity::Streaming("Rev"));
    assert_eq!(client.session().timeline().len(), 2);
}

#[tokio::test]
async fn test_second_turn_after_commit() {
    let (mut client, mut backend) = connected(Profile::Expert).await;

    for (question, answer) in [("first?", "one"), ("second?", "two")] {
        client.send_message(question).await.unwrap();
        backend.expect().await;
        backend
            .push(json!({"type": "message", "message": answer, "isFinished": true}))
            .await;
        drain(&mut client, 1).await;
    }

    let contents: Vec<String> = messages(client.session())
        .into_iter()
        .skip(1)
        .map(|(_, content)| content)
        .collect();
    assert_eq!(contents, vec!["first?", "one", "second?", "two"]);
}

// =============================================================================
// Quick Actions
// =============================================================================

#[tokio::test]
async fn test_quick_actions_loading_then_replaced() {
    let (mut client, backend) = connected(Profile::NonTechnical).await;
    assert_eq!(client.session().quick_actions().actions().len(), 2);

    backend.push(json!({"type": "quick_actions", "loading": true})).await;
    drain(&mut client, 1).await;
    assert!(client.session().quick_actions().is_loading());
    assert!(client.session().quick_actions().actions().is_empty());

    backend
        .push(json!({
            "type": "quick_actions",
            "actions": [{"label": "Bias", "prompt": "Is the model biased?"}]
        }))
        .await;
    let updates = drain(&mut client, 1).await;
    assert_eq!(updates, vec![SessionUpdate::QuickActionsChanged]);
    assert!(!client.session().quick_actions().is_loading());
    assert_eq!(
        client.session().quick_actions().prompt(0),
        Some("Is the model biased?")
    );
}

// =============================================================================
// Profile
// =============================================================================

#[tokio::test]
async fn test_profile_confirmation_during_turn() {
    let (mut client, mut backend) = connected(Profile::NonTechnical).await;

    client.send_message("Explain AUC").await.unwrap();
    backend.expect().await;
    client
        .request_profile_change(Profile::Technical)
        .await
        .unwrap();
    assert_eq!(backend.expect().await["type"], "update_user_profile");

    backend
        .push(json!({"type": "message", "message": "AUC is", "isFinished": false}))
        .await;
    backend
        .push(json!({"type": "user_profile_updated", "user_profile": "technical"}))
        .await;
    backend
        .push(json!({"type": "message", "message": "AUC is 0.87.", "isFinished": true}))
        .await;
    drain(&mut client, 3).await;

    let entries = client.session().timeline().entries();
    assert_eq!(
        entries[2].as_event().map(|e| e.text.as_str()),
        Some("Profile changed to technical")
    );
    assert_eq!(
        entries[3].as_message().map(|m| m.content.as_str()),
        Some("AUC is 0.87.")
    );
    assert_eq!(client.session().profile().active(), Profile::Technical);
}

// =============================================================================
// Connection Loss
// =============================================================================

#[tokio::test]
async fn test_connection_error_mid_stream() {
    let (mut client, mut backend) = connected(Profile::NonTechnical).await;

    client.send_message("Hello").await.unwrap();
    backend.expect().await;
    backend
        .push(json!({"type": "message", "message": "Hi th", "isFinished": false}))
        .await;
    backend
        .events
        .send(TransportEvent::Error("connection reset".to_string()))
        .await
        .unwrap();

    let updates = drain(&mut client, 2).await;
    assert_eq!(
        updates.last(),
        Some(&SessionUpdate::LinkChanged(LinkState::Closed))
    );
    assert_eq!(client.session().close_reason(), Some("connection reset"));
    assert!(client.next_update().await.is_none());
    // Partial text is never committed.
    assert_eq!(client.session().timeline().len(), 2);
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn test_config_file_drives_clients() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(
        br#"
[server]
base_url = "https://reports.internal:8443"
request_timeout_secs = 10

[session]
default_profile = "business"
"#,
    )
    .unwrap();

    let mut config = load_config_with_env(Some(file.path().to_path_buf()), |_| None).unwrap();
    assert_eq!(config.source(), ConfigSource::File);
    assert_eq!(config.websocket_url(), "wss://reports.internal:8443/ws");
    assert_eq!(config.session.default_profile, Profile::Business);

    let reports = ReportsClient::from_config(&config).unwrap();
    assert_eq!(
        reports.export_url("Q3 churn").unwrap().as_str(),
        "https://reports.internal:8443/report/Q3%20churn"
    );

    ConfigOverrides::new()
        .with_base_url("http://127.0.0.1:8000")
        .apply(&mut config);
    assert_eq!(config.source(), ConfigSource::Cli);
    assert_eq!(config.websocket_url(), "ws://127.0.0.1:8000/ws");
}
