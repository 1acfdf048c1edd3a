use futures::{SinkExt, StreamExt};
use panel_application::RemoteSession;
use panel_core::PanelError;
use panel_core::config::InterviewConfig;
use panel_core::event::{AgentRole, EventCategory};
use panel_core::wire::{ClientMessage, ServerFrame};
use panel_interaction::{ApiClient, ReconnectPolicy};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

/// Pushes two agent messages and echoes the first client action back.
async fn spawn_service() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();

        for (sender, kind, content) in [
            ("BehavioralAgent", "question", "Tell me about a time..."),
            ("RecruiterBot", "system", "from an agent this client does not know"),
        ] {
            let frame = serde_json::json!({
                "sender": sender,
                "type": kind,
                "content": content,
                "timestamp": "2024-05-01T10:00:00Z"
            });
            ws.send(Message::Text(frame.to_string())).await.unwrap();
        }

        while let Some(Ok(Message::Text(text))) = ws.next().await {
            let request: ClientMessage = serde_json::from_str(&text).unwrap();
            let reply = serde_json::json!({
                "sender": "CoordinatorAgent",
                "type": "system",
                "content": format!("{}:{}", request.agent, request.action),
                "timestamp": request.timestamp
            });
            ws.send(Message::Text(reply.to_string())).await.unwrap();
            ws.close(None).await.unwrap();
            break;
        }
    });

    format!("ws://{addr}")
}

fn api(ws_url: &str) -> ApiClient {
    ApiClient::new("http://127.0.0.1:9", ws_url, Duration::from_secs(2)).unwrap()
}

#[tokio::test]
async fn test_attached_session_mirrors_known_agents() {
    let ws_url = spawn_service().await;
    let mut session = RemoteSession::attach(api(&ws_url), "session_1", ReconnectPolicy::default(), 100)
        .await
        .unwrap();
    assert!(session.is_connected());

    session.next_frame().await.unwrap().unwrap();
    let unknown = session.next_frame().await.unwrap().unwrap();
    assert!(matches!(unknown, ServerFrame::Message(m) if m.sender == "RecruiterBot"));

    session
        .send(AgentRole::Feedback, "generate_feedback", serde_json::json!({}))
        .await
        .unwrap();
    let Some(ServerFrame::Message(reply)) = session.next_frame().await.unwrap() else {
        panic!("expected a reply");
    };
    assert_eq!(reply.content, "feedback:generate_feedback");

    assert!(session.next_frame().await.unwrap().is_none());
    assert!(!session.is_connected());

    let events: Vec<_> = session.events().iter().collect();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].sender, AgentRole::Behavioral);
    assert_eq!(events[0].category, EventCategory::Question);
    assert_eq!(events[0].timestamp.to_rfc3339(), "2024-05-01T10:00:00+00:00");
    assert_eq!(events[1].sender, AgentRole::Coordinator);

    let err = session
        .send(AgentRole::Coding, "execute_code", serde_json::json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, PanelError::NotConnected(_)));
}

#[tokio::test]
async fn test_start_fails_when_service_is_unreachable() {
    let result = RemoteSession::start(
        api("ws://127.0.0.1:9"),
        &InterviewConfig::default(),
        ReconnectPolicy::default(),
        100,
    )
    .await;

    assert!(matches!(result, Err(e) if e.is_retryable()));
}
