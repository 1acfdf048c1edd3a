//! Agent events and the append-only event log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use strum::{Display, EnumString};

/// Default number of events retained by an [`EventLog`].
pub const DEFAULT_EVENT_CAPACITY: usize = 10_000;

/// The agent (or person) an event originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
pub enum AgentRole {
    #[serde(rename = "CoordinatorAgent")]
    #[strum(serialize = "CoordinatorAgent")]
    Coordinator,
    #[serde(rename = "BehavioralAgent")]
    #[strum(serialize = "BehavioralAgent")]
    Behavioral,
    #[serde(rename = "CodingAgent")]
    #[strum(serialize = "CodingAgent")]
    Coding,
    #[serde(rename = "AnalysisAgent")]
    #[strum(serialize = "AnalysisAgent")]
    Analysis,
    #[serde(rename = "FeedbackAgent")]
    #[strum(serialize = "FeedbackAgent")]
    Feedback,
    #[serde(rename = "AvatarAgent")]
    #[strum(serialize = "AvatarAgent")]
    Avatar,
    Candidate,
}

impl AgentRole {
    /// Short routing key used in client → server messages ("coding", "feedback", ...).
    pub fn agent_key(self) -> &'static str {
        match self {
            AgentRole::Coordinator => "coordinator",
            AgentRole::Behavioral => "behavioral",
            AgentRole::Coding => "coding",
            AgentRole::Analysis => "analysis",
            AgentRole::Feedback => "feedback",
            AgentRole::Avatar => "avatar",
            AgentRole::Candidate => "candidate",
        }
    }
}

/// Category tag attached to every event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EventCategory {
    System,
    Question,
    Response,
    Analysis,
    Result,
    Feedback,
    Speech,
}

/// An event before it has been recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentMessage {
    pub sender: AgentRole,
    pub category: EventCategory,
    pub content: String,
}

impl AgentMessage {
    pub fn new(sender: AgentRole, category: EventCategory, content: impl Into<String>) -> Self {
        Self {
            sender,
            category,
            content: content.into(),
        }
    }

    pub fn system(sender: AgentRole, content: impl Into<String>) -> Self {
        Self::new(sender, EventCategory::System, content)
    }
}

/// A recorded, immutable event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentEvent {
    /// Position in the log, starting at 1. Keeps counting across evictions.
    pub seq: u64,
    pub sender: AgentRole,
    pub category: EventCategory,
    pub content: String,
    /// Capture time, assigned when the event was recorded.
    pub timestamp: DateTime<Utc>,
}

/// Append-only log of agent events in insertion order.
///
/// The log retains at most `capacity` events. Once full, the oldest retained
/// event is evicted for each new one; `total_recorded` still counts every
/// event ever appended, and sequence numbers never repeat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog {
    events: VecDeque<AgentEvent>,
    capacity: usize,
    total_recorded: u64,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLog {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_EVENT_CAPACITY)
    }

    /// Creates a log retaining at most `capacity` events (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: VecDeque::with_capacity(capacity.min(256)),
            capacity,
            total_recorded: 0,
        }
    }

    /// Records a message, stamping it with the current time.
    pub fn record(&mut self, message: AgentMessage) -> &AgentEvent {
        self.record_at(message, Utc::now())
    }

    /// Records a message with an explicit capture time.
    pub fn record_at(&mut self, message: AgentMessage, timestamp: DateTime<Utc>) -> &AgentEvent {
        if self.events.len() == self.capacity {
            self.events.pop_front();
        }

        self.total_recorded += 1;
        self.events.push_back(AgentEvent {
            seq: self.total_recorded,
            sender: message.sender,
            category: message.category,
            content: message.content,
            timestamp,
        });

        // Just pushed, so the deque is non-empty
        &self.events[self.events.len() - 1]
    }

    /// The last `n` retained events, oldest first.
    pub fn tail(&self, n: usize) -> Vec<&AgentEvent> {
        let skip = self.events.len().saturating_sub(n);
        self.events.iter().skip(skip).collect()
    }

    /// Iterates retained events in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &AgentEvent> {
        self.events.iter()
    }

    /// Number of retained events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Every event ever appended, including evicted ones.
    pub fn total_recorded(&self) -> u64 {
        self.total_recorded
    }

    /// Number of retained events sent by `sender`.
    pub fn count_from(&self, sender: AgentRole) -> usize {
        self.events.iter().filter(|e| e.sender == sender).count()
    }

    pub fn last(&self) -> Option<&AgentEvent> {
        self.events.back()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn numbered(n: usize) -> AgentMessage {
        AgentMessage::system(AgentRole::Coordinator, format!("event {n}"))
    }

    #[test]
    fn test_tail_returns_last_events_in_order() {
        let mut log = EventLog::new();
        for n in 1..=12 {
            log.record(numbered(n));
        }

        let tail: Vec<&str> = log.tail(5).iter().map(|e| e.content.as_str()).collect();
        assert_eq!(
            tail,
            vec!["event 8", "event 9", "event 10", "event 11", "event 12"]
        );
    }

    #[test]
    fn test_tail_larger_than_log() {
        let mut log = EventLog::new();
        log.record(numbered(1));
        log.record(numbered(2));

        assert_eq!(log.tail(10).len(), 2);
        assert!(log.tail(0).is_empty());
    }

    #[test]
    fn test_sequence_numbers_follow_insertion() {
        let mut log = EventLog::new();
        for n in 1..=4 {
            let event = log.record(numbered(n));
            assert_eq!(event.seq, n as u64);
        }
        let seqs: Vec<u64> = log.iter().map(|e| e.seq).collect();
        assert_eq!(seqs, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut log = EventLog::with_capacity(3);
        for n in 1..=5 {
            log.record(numbered(n));
        }

        assert_eq!(log.len(), 3);
        assert_eq!(log.total_recorded(), 5);
        let retained: Vec<u64> = log.iter().map(|e| e.seq).collect();
        assert_eq!(retained, vec![3, 4, 5]);
    }

    #[test]
    fn test_count_from_sender() {
        let mut log = EventLog::new();
        log.record(AgentMessage::new(
            AgentRole::Behavioral,
            EventCategory::Question,
            "Tell me about a time...",
        ));
        log.record(AgentMessage::new(
            AgentRole::Coding,
            EventCategory::Result,
            "3/3 tests passed",
        ));
        log.record(AgentMessage::new(
            AgentRole::Behavioral,
            EventCategory::Analysis,
            "Response analyzed",
        ));

        assert_eq!(log.count_from(AgentRole::Behavioral), 2);
        assert_eq!(log.count_from(AgentRole::Coding), 1);
        assert_eq!(log.count_from(AgentRole::Feedback), 0);
    }

    #[test]
    fn test_role_wire_names() {
        assert_eq!(AgentRole::Coding.to_string(), "CodingAgent");
        assert_eq!(
            AgentRole::from_str("FeedbackAgent").unwrap(),
            AgentRole::Feedback
        );
        let json = serde_json::to_string(&AgentRole::Behavioral).unwrap();
        assert_eq!(json, "\"BehavioralAgent\"");
        assert_eq!(EventCategory::Result.to_string(), "result");
    }
}
