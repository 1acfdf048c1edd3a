//! Session domain model.
//!
//! A `Session` is an immutable value. Every transition borrows the current
//! value and returns the next one, so a rejected transition leaves the
//! caller's session exactly as it was.

use crate::config::InterviewConfig;
use crate::error::{PanelError, Result};
use crate::event::{AgentEvent, AgentMessage, AgentRole, EventLog};
use crate::phase::{Phase, PhaseController};
use crate::score::{ScoreRecord, ScoreUpdate};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strum::Display;
use uuid::Uuid;

/// Lifecycle status of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SessionStatus {
    /// Phases are running and the clock is ticking.
    Active,
    /// The feedback phase completed.
    Completed,
    /// The user ended the interview before feedback completed.
    Ended,
}

/// One interview run, from start to its terminal state.
///
/// The event log is shared between successive values until one of them
/// records, so clock ticks and snapshots do not copy it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    id: String,
    config: InterviewConfig,
    created_at: DateTime<Utc>,
    status: SessionStatus,
    phases: PhaseController,
    elapsed_secs: u64,
    events: Arc<EventLog>,
    scores: ScoreRecord,
}

impl Session {
    /// Starts a session with a fresh UUID.
    ///
    /// # Errors
    ///
    /// Returns `PanelError::Validation` if the configuration is invalid.
    pub fn start(config: InterviewConfig) -> Result<Self> {
        Self::start_with(Uuid::new_v4().to_string(), config, EventLog::new())
    }

    /// Starts a session with an explicit id and event log (e.g. a custom capacity).
    ///
    /// The coordinator's initialization event is recorded immediately.
    pub fn start_with(id: impl Into<String>, config: InterviewConfig, events: EventLog) -> Result<Self> {
        config.validate()?;

        let mut session = Self {
            id: id.into(),
            created_at: Utc::now(),
            status: SessionStatus::Active,
            phases: PhaseController::new(),
            elapsed_secs: 0,
            events: Arc::new(events),
            scores: ScoreRecord::default(),
            config,
        };
        Arc::make_mut(&mut session.events).record(AgentMessage::system(
            AgentRole::Coordinator,
            format!(
                "Interview session initialized for {} position",
                session.config.role
            ),
        ));

        tracing::info!(session_id = %session.id, role = %session.config.role, "Session started");
        Ok(session)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn config(&self) -> &InterviewConfig {
        &self.config
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// The active phase, or `None` once the session is terminal.
    pub fn current_phase(&self) -> Option<Phase> {
        match self.status {
            SessionStatus::Active => self.phases.current(),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status != SessionStatus::Active
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn events(&self) -> &EventLog {
        self.events.as_ref()
    }

    pub fn scores(&self) -> ScoreRecord {
        self.scores
    }

    /// The last `n` events, oldest first.
    pub fn tail(&self, n: usize) -> Vec<&AgentEvent> {
        self.events.tail(n)
    }

    fn ensure_active(&self) -> Result<()> {
        if self.is_terminal() {
            return Err(PanelError::SessionTerminal);
        }
        Ok(())
    }

    /// Completion signal from the owner of `from`.
    ///
    /// Completing the feedback phase marks the session `Completed`.
    ///
    /// # Errors
    ///
    /// - `PanelError::SessionTerminal` if the session is completed or ended
    /// - `PanelError::InvalidTransition` if `from` is not the current phase
    pub fn advance(&self, from: Phase) -> Result<Self> {
        self.ensure_active()?;

        let mut next = self.clone();
        match next.phases.advance(from)? {
            Some(phase) => {
                tracing::info!(session_id = %next.id, from = %from, to = %phase, "Phase transition");
            }
            None => {
                next.status = SessionStatus::Completed;
                tracing::info!(session_id = %next.id, elapsed_secs = next.elapsed_secs, "Session completed");
            }
        }
        Ok(next)
    }

    /// Appends an event stamped with the current time.
    pub fn record(&self, message: AgentMessage) -> Self {
        let mut next = self.clone();
        Arc::make_mut(&mut next.events).record(message);
        next
    }

    /// Appends several events in order.
    pub fn record_all(&self, messages: impl IntoIterator<Item = AgentMessage>) -> Self {
        let mut next = self.clone();
        for message in messages {
            Arc::make_mut(&mut next.events).record(message);
        }
        next
    }

    /// Merges a partial score update.
    ///
    /// # Errors
    ///
    /// Returns `PanelError::SessionTerminal` once the session is terminal.
    pub fn update_scores(&self, update: &ScoreUpdate) -> Result<Self> {
        self.ensure_active()?;

        let mut next = self.clone();
        next.scores = next.scores.merged(update);
        Ok(next)
    }

    /// One second of elapsed time. Terminal sessions do not tick.
    pub fn tick(&self) -> Self {
        let mut next = self.clone();
        if next.status == SessionStatus::Active {
            next.elapsed_secs += 1;
        }
        next
    }

    /// Ends the session early. Already-terminal sessions are returned unchanged.
    pub fn end(&self) -> Self {
        let mut next = self.clone();
        if next.status == SessionStatus::Active {
            next.status = SessionStatus::Ended;
            tracing::info!(session_id = %next.id, phase = ?self.phases.current(), "Session ended early");
        }
        next
    }

    /// Elapsed time as a share of the planned duration, capped at 100.
    pub fn progress_percent(&self) -> f64 {
        let planned = self.config.planned_secs();
        if planned == 0 {
            return 100.0;
        }
        (self.elapsed_secs as f64 / planned as f64 * 100.0).min(100.0)
    }

    /// Elapsed time as `m:ss`.
    pub fn elapsed_display(&self) -> String {
        format!("{}:{:02}", self.elapsed_secs / 60, self.elapsed_secs % 60)
    }
}
