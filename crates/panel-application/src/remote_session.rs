//! Remote session use case.
//!
//! Drives an interview hosted by the orchestration service: the REST API
//! starts, inspects and ends it, while the session channel carries agent
//! messages both ways. Messages from known agents are mirrored into a local
//! event log.

use panel_core::config::InterviewConfig;
use panel_core::event::{AgentRole, EventLog};
use panel_core::wire::{ClientMessage, EndResponse, ServerFrame, StatusReport};
use panel_core::Result;
use panel_interaction::{ApiClient, ReconnectPolicy, SessionChannel};
use serde_json::Value;

pub struct RemoteSession {
    api: ApiClient,
    session_id: String,
    channel: SessionChannel,
    events: EventLog,
}

impl RemoteSession {
    /// Starts a new interview on the service and opens its channel.
    ///
    /// A channel that cannot be opened is not fatal: the session stays
    /// usable over REST and `reconnect` may be tried later.
    pub async fn start(
        api: ApiClient,
        config: &InterviewConfig,
        policy: ReconnectPolicy,
        event_capacity: usize,
    ) -> Result<Self> {
        let started = api.start_interview(config).await?;
        let mut session = Self::detached(api, started.session_id, policy, event_capacity);
        if let Some(message) = started.message.as_ref().and_then(|m| m.to_agent_message()) {
            session.events.record(message);
        }
        if let Err(e) = session.channel.connect().await {
            tracing::warn!(session_id = %session.session_id, error = %e, "Session channel unavailable");
        }
        Ok(session)
    }

    /// Attaches to an existing interview's channel.
    pub async fn attach(
        api: ApiClient,
        session_id: impl Into<String>,
        policy: ReconnectPolicy,
        event_capacity: usize,
    ) -> Result<Self> {
        let mut session = Self::detached(api, session_id.into(), policy, event_capacity);
        session.channel.connect().await?;
        Ok(session)
    }

    fn detached(
        api: ApiClient,
        session_id: String,
        policy: ReconnectPolicy,
        event_capacity: usize,
    ) -> Self {
        let channel = SessionChannel::new(api.session_ws_url(&session_id), policy);
        Self {
            api,
            session_id,
            channel,
            events: EventLog::with_capacity(event_capacity),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Messages received so far from known agents.
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn is_connected(&self) -> bool {
        self.channel.is_connected()
    }

    pub async fn status(&self) -> Result<StatusReport> {
        self.api.interview_status(&self.session_id).await
    }

    /// Sends an action to one of the session's agents.
    ///
    /// # Errors
    ///
    /// `PanelError::NotConnected` while the channel is down.
    pub async fn send(&mut self, agent: AgentRole, action: &str, payload: Value) -> Result<()> {
        self.channel
            .send(&ClientMessage::to_agent(agent, action, payload))
            .await
    }

    /// Waits for the next frame, recording agent messages.
    ///
    /// Returns `Ok(None)` once the service closes the channel.
    pub async fn next_frame(&mut self) -> Result<Option<ServerFrame>> {
        let frame = self.channel.next_frame().await?;
        match &frame {
            Some(ServerFrame::Message(message)) => match message.to_agent_message() {
                Some(agent_message) => {
                    self.events.record_at(agent_message, message.timestamp);
                }
                None => {
                    tracing::debug!(sender = %message.sender, kind = %message.kind, "Unrecognized agent message");
                }
            },
            Some(ServerFrame::Error { error }) => {
                tracing::warn!(session_id = %self.session_id, error = %error, "Service reported an error");
            }
            None => {}
        }
        Ok(frame)
    }

    /// Re-opens the channel with backoff.
    pub async fn reconnect(&mut self) -> Result<()> {
        self.channel.reconnect().await
    }

    /// Closes the channel and ends the interview on the service.
    pub async fn end(mut self) -> Result<EndResponse> {
        self.channel.close().await;
        let ended = self.api.end_interview(&self.session_id).await?;
        tracing::info!(session_id = %self.session_id, status = %ended.status, "Remote interview ended");
        Ok(ended)
    }
}
