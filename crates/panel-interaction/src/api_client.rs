//! REST client for the interview orchestration service.

use crate::http::{decode_json, ensure_success, join_url, transport_error};
use panel_core::config::InterviewConfig;
use panel_core::settings::ApiSettings;
use panel_core::wire::{EndResponse, HealthReport, HealthStatus, StartResponse, StatusReport};
use panel_core::{PanelError, Result};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;

/// Thin client over the orchestration service's REST endpoints.
///
/// Every request is bounded by the configured timeout.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    ws_url: String,
    timeout: Duration,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        ws_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PanelError::config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            ws_url: ws_url.into(),
            timeout,
        })
    }

    pub fn from_settings(settings: &ApiSettings) -> Result<Self> {
        Self::new(
            settings.base_url.clone(),
            settings.ws_url.clone(),
            settings.request_timeout(),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// WebSocket endpoint for a session: `{ws_url}/ws/{session_id}`.
    pub fn session_ws_url(&self, session_id: &str) -> String {
        join_url(&self.ws_url, &format!("ws/{session_id}"))
    }

    /// `POST /api/interview/start`.
    ///
    /// The configuration is validated locally before anything is sent.
    pub async fn start_interview(&self, config: &InterviewConfig) -> Result<StartResponse> {
        const OP: &str = "start interview";
        config.validate()?;

        let response = self
            .client
            .post(join_url(&self.base_url, "api/interview/start"))
            .json(config)
            .send()
            .await
            .map_err(|e| transport_error(OP, self.timeout, e))?;
        let response = ensure_success(OP, response).await?;
        let started: StartResponse = decode_json(OP, response).await?;

        tracing::info!(session_id = %started.session_id, role = %config.role, "Remote interview started");
        Ok(started)
    }

    /// `GET /api/interview/{id}/status`.
    pub async fn interview_status(&self, session_id: &str) -> Result<StatusReport> {
        const OP: &str = "get interview status";

        let response = self
            .client
            .get(join_url(
                &self.base_url,
                &format!("api/interview/{session_id}/status"),
            ))
            .send()
            .await
            .map_err(|e| transport_error(OP, self.timeout, e))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(PanelError::not_found("session", session_id));
        }
        let response = ensure_success(OP, response).await?;
        decode_json(OP, response).await
    }

    /// `POST /api/interview/{id}/end`.
    pub async fn end_interview(&self, session_id: &str) -> Result<EndResponse> {
        const OP: &str = "end interview";

        let response = self
            .client
            .post(join_url(
                &self.base_url,
                &format!("api/interview/{session_id}/end"),
            ))
            .send()
            .await
            .map_err(|e| transport_error(OP, self.timeout, e))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(PanelError::not_found("session", session_id));
        }
        let response = ensure_success(OP, response).await?;
        let ended: EndResponse = decode_json(OP, response).await?;

        tracing::info!(session_id = %ended.session_id, status = %ended.status, "Remote interview ended");
        Ok(ended)
    }

    /// `GET /api/health`. Never fails: non-2xx is `unhealthy`, anything
    /// that prevents reading a response is `unreachable`.
    pub async fn health_check(&self) -> HealthReport {
        let response = match self
            .client
            .get(join_url(&self.base_url, "api/health"))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "Health check could not reach the service");
                return HealthReport::unreachable();
            }
        };

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "Health check returned an error status");
            return HealthReport::unhealthy();
        }

        match response.json::<Value>().await {
            Ok(body) => {
                let status = match body.get("status").and_then(Value::as_str) {
                    Some("healthy") => HealthStatus::Healthy,
                    _ => HealthStatus::Unhealthy,
                };
                HealthReport {
                    status,
                    services: body.get("services").cloned(),
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Health check body was not JSON");
                HealthReport::unhealthy()
            }
        }
    }
}
