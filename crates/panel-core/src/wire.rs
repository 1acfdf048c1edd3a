//! Wire types exchanged with the interview orchestration service.
//!
//! REST bodies use snake_case field names. WebSocket frames carry either an
//! agent message (`{sender, type, content, timestamp}`) or an error
//! (`{error}`); client frames are `{agent, action, payload, timestamp}` with
//! the timestamp in epoch milliseconds.

use crate::config::InterviewConfig;
use crate::event::{AgentMessage, AgentRole, EventCategory};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

/// Body of `POST /api/interview/start`.
pub type StartRequest = InterviewConfig;

/// Response of `POST /api/interview/start`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartResponse {
    pub session_id: String,
    #[serde(default)]
    pub status: Option<String>,
    /// The coordinator's initialization message, when the service sends one.
    #[serde(default)]
    pub message: Option<ServerMessage>,
}

/// Scores as reported by the service. `overall` is taken as sent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteScores {
    pub culture: u32,
    pub communication: u32,
    pub problem_solving: u32,
    pub technical: u32,
    pub overall: u32,
}

/// Response of `GET /api/interview/{id}/status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusReport {
    pub session_id: String,
    pub status: String,
    /// Phase name as sent; unknown names are kept verbatim.
    #[serde(default)]
    pub current_phase: Option<String>,
    #[serde(default)]
    pub message_count: usize,
    #[serde(default)]
    pub scores: RemoteScores,
}

/// Response of `POST /api/interview/{id}/end`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndResponse {
    pub session_id: String,
    pub status: String,
    /// Final report in whatever shape the service produced.
    #[serde(default)]
    pub report: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
    Unreachable,
}

/// Result of `GET /api/health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub services: Option<Value>,
}

impl HealthReport {
    pub fn unhealthy() -> Self {
        Self {
            status: HealthStatus::Unhealthy,
            services: None,
        }
    }

    pub fn unreachable() -> Self {
        Self {
            status: HealthStatus::Unreachable,
            services: None,
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}

/// An agent message pushed by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerMessage {
    pub sender: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
    #[serde(with = "flexible_timestamp", default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl ServerMessage {
    /// Converts to a domain message when both sender and category are known.
    pub fn to_agent_message(&self) -> Option<AgentMessage> {
        let sender = AgentRole::from_str(&self.sender).ok()?;
        let category = EventCategory::from_str(&self.kind).ok()?;
        Some(AgentMessage::new(sender, category, self.content.clone()))
    }
}

/// Any frame the service may push over the channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServerFrame {
    Error { error: String },
    Message(ServerMessage),
}

/// A request from the client to one of the session's agents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientMessage {
    pub agent: String,
    pub action: String,
    #[serde(default)]
    pub payload: Value,
    /// Epoch milliseconds.
    pub timestamp: i64,
}

impl ClientMessage {
    pub fn new(agent: impl Into<String>, action: impl Into<String>, payload: Value) -> Self {
        Self {
            agent: agent.into(),
            action: action.into(),
            payload,
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    /// Addresses `role` by its routing key.
    pub fn to_agent(role: AgentRole, action: impl Into<String>, payload: Value) -> Self {
        Self::new(role.agent_key(), action, payload)
    }
}

/// Accepts epoch milliseconds, RFC 3339, or a naive ISO timestamp (taken as UTC).
/// Always writes epoch milliseconds.
mod flexible_timestamp {
    use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Millis(i64),
        Float(f64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(value.timestamp_millis())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let millis = match Raw::deserialize(deserializer)? {
            Raw::Millis(ms) => ms,
            Raw::Float(ms) => ms as i64,
            Raw::Text(text) => {
                if let Ok(parsed) = DateTime::parse_from_rfc3339(&text) {
                    return Ok(parsed.with_timezone(&Utc));
                }
                let naive = NaiveDateTime::parse_from_str(&text, "%Y-%m-%dT%H:%M:%S%.f")
                    .map_err(|e| D::Error::custom(format!("invalid timestamp '{text}': {e}")))?;
                return Ok(Utc.from_utc_datetime(&naive));
            }
        };
        Utc.timestamp_millis_opt(millis)
            .single()
            .ok_or_else(|| D::Error::custom(format!("timestamp out of range: {millis}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_server_message_with_millis() {
        let frame: ServerFrame = serde_json::from_value(json!({
            "sender": "CodingAgent",
            "type": "result",
            "content": "3/3 tests passed",
            "timestamp": 1_700_000_000_000i64
        }))
        .unwrap();

        let ServerFrame::Message(message) = frame else {
            panic!("expected a message frame");
        };
        assert_eq!(message.timestamp.timestamp_millis(), 1_700_000_000_000);
        let domain = message.to_agent_message().unwrap();
        assert_eq!(domain.sender, AgentRole::Coding);
        assert_eq!(domain.category, EventCategory::Result);
    }

    #[test]
    fn test_server_message_with_iso_timestamps() {
        let rfc: ServerMessage = serde_json::from_value(json!({
            "sender": "BehavioralAgent",
            "type": "question",
            "content": "Tell me...",
            "timestamp": "2024-05-01T10:00:00Z"
        }))
        .unwrap();
        let naive: ServerMessage = serde_json::from_value(json!({
            "sender": "BehavioralAgent",
            "type": "question",
            "content": "Tell me...",
            "timestamp": "2024-05-01T10:00:00.250000"
        }))
        .unwrap();

        assert_eq!(rfc.timestamp.to_rfc3339(), "2024-05-01T10:00:00+00:00");
        assert_eq!(naive.timestamp.timestamp_millis(), rfc.timestamp.timestamp_millis() + 250);
    }

    #[test]
    fn test_error_frame() {
        let frame: ServerFrame = serde_json::from_str(r#"{"error":"Session not found"}"#).unwrap();
        assert_eq!(
            frame,
            ServerFrame::Error {
                error: "Session not found".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_sender_is_not_converted() {
        let message: ServerMessage = serde_json::from_value(json!({
            "sender": "VectorAgent",
            "type": "system",
            "content": "hello"
        }))
        .unwrap();
        assert!(message.to_agent_message().is_none());
    }

    #[test]
    fn test_client_message_shape() {
        let message = ClientMessage::to_agent(
            AgentRole::Coding,
            "execute_code",
            json!({ "language": "python" }),
        );
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["agent"], "coding");
        assert_eq!(value["action"], "execute_code");
        assert!(value["timestamp"].as_i64().unwrap() > 0);
    }

    #[test]
    fn test_status_report_defaults() {
        let status: StatusReport = serde_json::from_value(json!({
            "session_id": "session_1",
            "status": "active",
            "current_phase": "coding",
            "scores": { "technical": 80 }
        }))
        .unwrap();
        assert_eq!(status.message_count, 0);
        assert_eq!(status.scores.technical, 80);
        assert_eq!(status.scores.overall, 0);
    }
}
