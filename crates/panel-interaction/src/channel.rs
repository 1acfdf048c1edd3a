//! WebSocket channel to a remote interview session.
//!
//! Outbound messages are only sent while connected. A dropped connection is
//! re-established with exponential backoff by [`SessionChannel::reconnect`].

use futures::{SinkExt, StreamExt};
use panel_core::settings::ReconnectSettings;
use panel_core::wire::{ClientMessage, ServerFrame};
use panel_core::{PanelError, Result};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Backoff schedule for reconnect attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub initial_delay: Duration,
    pub multiplier: u32,
    pub max_delay: Duration,
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::from(&ReconnectSettings::default())
    }
}

impl From<&ReconnectSettings> for ReconnectPolicy {
    fn from(settings: &ReconnectSettings) -> Self {
        Self {
            initial_delay: Duration::from_millis(settings.initial_delay_ms),
            multiplier: settings.multiplier.max(1),
            max_delay: Duration::from_millis(settings.max_delay_ms),
            max_attempts: settings.max_attempts,
        }
    }
}

impl ReconnectPolicy {
    /// Delay before the given 1-based attempt, or `None` once attempts are exhausted.
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || attempt > self.max_attempts {
            return None;
        }
        let factor = self.multiplier.saturating_pow(attempt - 1);
        Some(self.initial_delay.saturating_mul(factor).min(self.max_delay))
    }
}

/// A session's bidirectional message channel.
pub struct SessionChannel {
    url: String,
    policy: ReconnectPolicy,
    stream: Option<WsStream>,
}

impl SessionChannel {
    pub fn new(url: impl Into<String>, policy: ReconnectPolicy) -> Self {
        Self {
            url: url.into(),
            policy,
            stream: None,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Opens the connection once, without retrying.
    pub async fn connect(&mut self) -> Result<()> {
        let (stream, _response) = connect_async(self.url.as_str())
            .await
            .map_err(|e| PanelError::transport(format!("connect {}: {e}", self.url)))?;
        self.stream = Some(stream);
        tracing::info!(url = %self.url, "Session channel connected");
        Ok(())
    }

    /// Reconnects with exponential backoff.
    ///
    /// # Errors
    ///
    /// Returns the last connection error once every attempt has failed.
    pub async fn reconnect(&mut self) -> Result<()> {
        self.stream = None;
        let mut attempt = 1;
        let mut last_error = PanelError::NotConnected(self.url.clone());

        while let Some(delay) = self.policy.delay_for(attempt) {
            tokio::time::sleep(delay).await;
            match self.connect().await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::warn!(attempt, delay_ms = delay.as_millis() as u64, error = %e, "Reconnect attempt failed");
                    last_error = e;
                }
            }
            attempt += 1;
        }

        Err(last_error)
    }

    /// Sends one message.
    ///
    /// # Errors
    ///
    /// `PanelError::NotConnected` when there is no open connection; a send
    /// failure drops the connection and returns `PanelError::Transport`.
    pub async fn send(&mut self, message: &ClientMessage) -> Result<()> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| PanelError::NotConnected(self.url.clone()))?;

        let text = serde_json::to_string(message)?;
        tracing::debug!(agent = %message.agent, action = %message.action, "Sending client message");

        if let Err(e) = stream.send(Message::Text(text)).await {
            self.stream = None;
            return Err(PanelError::transport(format!("send: {e}")));
        }
        Ok(())
    }

    /// Waits for the next server frame.
    ///
    /// Returns `Ok(None)` when the server closes the connection. Control
    /// frames are handled transparently and frames that are not valid JSON
    /// are skipped.
    pub async fn next_frame(&mut self) -> Result<Option<ServerFrame>> {
        loop {
            let stream = self
                .stream
                .as_mut()
                .ok_or_else(|| PanelError::NotConnected(self.url.clone()))?;

            let message = match stream.next().await {
                None => {
                    self.stream = None;
                    return Ok(None);
                }
                Some(Err(e)) => {
                    self.stream = None;
                    return Err(PanelError::transport(format!("receive: {e}")));
                }
                Some(Ok(message)) => message,
            };

            match message {
                Message::Text(text) => match serde_json::from_str::<ServerFrame>(&text) {
                    Ok(frame) => {
                        tracing::debug!(bytes = text.len(), "Received server frame");
                        return Ok(Some(frame));
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Skipping malformed server frame");
                    }
                },
                Message::Close(_) => {
                    self.stream = None;
                    tracing::info!(url = %self.url, "Session channel closed by server");
                    return Ok(None);
                }
                _ => {}
            }
        }
    }

    /// Sends a message and waits for the reply frame.
    pub async fn request(&mut self, message: &ClientMessage) -> Result<Option<ServerFrame>> {
        self.send(message).await?;
        self.next_frame().await
    }

    /// Closes the connection if open. Close errors are ignored.
    pub async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            let _ = stream.close(None).await;
            tracing::info!(url = %self.url, "Session channel closed");
        }
    }
}
