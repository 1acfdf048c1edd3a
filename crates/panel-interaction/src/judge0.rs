//! Judge0 sandbox executor.
//!
//! Each test case becomes one submission. Payloads travel base64-encoded;
//! results are polled until Judge0 leaves the "In Queue" (1) and
//! "Processing" (2) states.

use crate::http::{decode_json, join_url, transport_error};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use panel_core::assessment::{CodeExecutor, CodeSubmission, CodingResult, TestOutcome};
use panel_core::problem::TestCase;
use panel_core::settings::Judge0Settings;
use panel_core::{PanelError, Result};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const SERVICE: &str = "judge0";
const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Judge0 language id for a language name (case-insensitive).
pub fn language_id(language: &str) -> Option<u32> {
    match language.to_ascii_lowercase().as_str() {
        "python" => Some(71),
        "java" => Some(62),
        "cpp" => Some(54),
        "javascript" => Some(63),
        "c" => Some(50),
        _ => None,
    }
}

#[derive(Debug, Serialize)]
struct SubmissionRequest {
    source_code: String,
    language_id: u32,
    stdin: String,
    expected_output: String,
    cpu_time_limit: u32,
    memory_limit: u32,
}

#[derive(Debug, Deserialize)]
struct SubmissionToken {
    token: String,
}

#[derive(Debug, Default, Deserialize)]
struct SubmissionStatus {
    id: u32,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Default, Deserialize)]
struct SubmissionResult {
    #[serde(default)]
    status: SubmissionStatus,
    #[serde(default)]
    stdout: Option<String>,
    #[serde(default)]
    stderr: Option<String>,
    #[serde(default)]
    compile_output: Option<String>,
    /// Seconds, as a decimal string.
    #[serde(default)]
    time: Option<String>,
    #[serde(default)]
    memory: Option<u64>,
}

impl SubmissionResult {
    fn is_pending(&self) -> bool {
        matches!(self.status.id, 1 | 2)
    }
}

/// Executes submissions on a Judge0 instance.
#[derive(Debug, Clone)]
pub struct Judge0Executor {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    host: String,
    poll_interval: Duration,
    max_polls: u32,
}

impl Judge0Executor {
    pub fn new(settings: &Judge0Settings) -> Self {
        Self {
            client: Client::new(),
            base_url: settings.base_url.clone(),
            api_key: settings.api_key.clone(),
            host: settings.host.clone(),
            poll_interval: Duration::from_millis(settings.poll_interval_ms),
            max_polls: settings.max_polls,
        }
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request
                .header("X-RapidAPI-Key", key)
                .header("X-RapidAPI-Host", &self.host),
            None => request,
        }
    }

    async fn submit(&self, request: &SubmissionRequest) -> Result<std::result::Result<String, String>> {
        const OP: &str = "judge0 submit";
        let response = self
            .authorized(
                self.client
                    .post(join_url(&self.base_url, "submissions"))
                    .query(&[("base64_encoded", "true"), ("wait", "false")])
                    .json(request)
                    .timeout(REQUEST_TIMEOUT),
            )
            .send()
            .await
            .map_err(|e| transport_error(OP, REQUEST_TIMEOUT, e))?;

        let status = response.status();
        if !status.is_success() {
            return Ok(Err(format!("Submission failed: {}", status.as_u16())));
        }
        let token: SubmissionToken = decode_json(OP, response).await?;
        Ok(Ok(token.token))
    }

    async fn poll(&self, token: &str) -> Result<Option<SubmissionResult>> {
        const OP: &str = "judge0 poll";
        for poll in 0..self.max_polls {
            if poll > 0 {
                tokio::time::sleep(self.poll_interval).await;
            }

            let response = self
                .authorized(
                    self.client
                        .get(join_url(&self.base_url, &format!("submissions/{token}")))
                        .query(&[("base64_encoded", "true")])
                        .timeout(REQUEST_TIMEOUT),
                )
                .send()
                .await
                .map_err(|e| transport_error(OP, REQUEST_TIMEOUT, e))?;

            if !response.status().is_success() {
                tracing::warn!(token, status = %response.status(), "Polling submission failed");
                continue;
            }

            let result: SubmissionResult = decode_json(OP, response).await?;
            if !result.is_pending() {
                return Ok(Some(result));
            }
        }
        Ok(None)
    }

    async fn run_case(
        &self,
        index: usize,
        language_id: u32,
        submission: &CodeSubmission,
        case: &TestCase,
    ) -> Result<TestOutcome> {
        let test_case = index + 1;
        let request = SubmissionRequest {
            source_code: BASE64_STANDARD.encode(&submission.source_code),
            language_id,
            stdin: BASE64_STANDARD.encode(&case.input),
            expected_output: BASE64_STANDARD.encode(&case.expected),
            cpu_time_limit: submission.cpu_time_limit_secs,
            memory_limit: submission.memory_limit_kb,
        };

        let token = match self.submit(&request).await? {
            Ok(token) => token,
            Err(message) => return Ok(failed_outcome(test_case, "error", message)),
        };

        let Some(result) = self.poll(&token).await? else {
            return Ok(failed_outcome(test_case, "Timeout", "Execution timeout".to_string()));
        };

        let output = decode_field(result.stdout.as_deref());
        let error = match decode_field(result.stderr.as_deref()) {
            e if e.is_empty() => decode_field(result.compile_output.as_deref()),
            e => e,
        };
        let time_ms = result
            .time
            .as_deref()
            .and_then(|t| t.parse::<f64>().ok())
            .map(|secs| secs * 1000.0)
            .unwrap_or(0.0);

        Ok(TestOutcome {
            test_case,
            status: result.status.description.clone(),
            passed: output.trim() == case.expected.trim(),
            output,
            error,
            time_ms,
            memory_kb: result.memory.unwrap_or(0),
        })
    }
}

fn failed_outcome(test_case: usize, status: &str, error: String) -> TestOutcome {
    TestOutcome {
        test_case,
        status: status.to_string(),
        passed: false,
        output: String::new(),
        error,
        time_ms: 0.0,
        memory_kb: 0,
    }
}

/// Decodes a base64 field, falling back to the raw text if it is not base64.
fn decode_field(value: Option<&str>) -> String {
    let Some(raw) = value else {
        return String::new();
    };
    // Judge0 wraps long base64 output across lines
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    BASE64_STANDARD
        .decode(compact.as_bytes())
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .unwrap_or_else(|| raw.to_string())
}

#[async_trait]
impl CodeExecutor for Judge0Executor {
    fn name(&self) -> &str {
        SERVICE
    }

    async fn execute(&self, submission: &CodeSubmission) -> Result<CodingResult> {
        let language_id = language_id(&submission.language).ok_or_else(|| {
            PanelError::validation(format!("Unsupported language: {}", submission.language))
        })?;

        let mut outcomes = Vec::with_capacity(submission.test_cases.len());
        for (index, case) in submission.test_cases.iter().enumerate() {
            outcomes.push(self.run_case(index, language_id, submission, case).await?);
        }

        let result = CodingResult::from_outcomes(outcomes, submission.test_cases.len());
        tracing::info!(
            language = %submission.language,
            passed = result.passed,
            total = result.total,
            "Code execution finished"
        );
        Ok(result)
    }

    async fn health_check(&self) -> bool {
        let request = self.authorized(
            self.client
                .get(join_url(&self.base_url, "system_info"))
                .timeout(HEALTH_TIMEOUT),
        );
        match request.send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::warn!(error = %e, "Judge0 health check failed");
                false
            }
        }
    }
}
