//! LLM-backed response analysis and scoring.
//!
//! Talks to any OpenAI-compatible Chat Completions endpoint. Prompts are
//! minijinja templates and the model is asked to answer with a single JSON
//! object.

use crate::http::{decode_json, ensure_success, join_url, transport_error};
use async_trait::async_trait;
use minijinja::{Environment, context};
use once_cell::sync::Lazy;
use panel_core::assessment::{
    CompetencyStrength, ResponseAnalysis, ResponseAnalyzer, ScoringContext, ScoringEngine,
};
use panel_core::event::AgentRole;
use panel_core::question::BehavioralQuestion;
use panel_core::score::ScoreUpdate;
use panel_core::settings::LlmSettings;
use panel_core::{PanelError, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const SERVICE: &str = "llm";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

const ANALYSIS_TEMPLATE: &str = r#"Analyze this behavioral interview response for a {{ category }} question.

Question: {{ question }}
Response: {{ response }}

Evaluate on:
1. Sentiment of the response - score -1 to 1
2. STAR method completeness (Situation, Task, Action, Result) - score 0-1
3. Competency demonstration for: {{ competencies | join(", ") }}
4. Specific insights and strengths
5. Areas for improvement

Respond in JSON format:
{
    "sentiment": 0.4,
    "star_completeness": 0.8,
    "competency_demonstration": "strong|moderate|weak",
    "insights": ["insight1", "insight2"],
    "improvement_areas": ["area1", "area2"]
}"#;

const SCORING_TEMPLATE: &str = r#"You are scoring a {{ difficulty }} interview for the role of {{ role }}.

{% if behavioral -%}
Behavioral assessment ({{ behavioral.responses_count }} answers):
- average sentiment: {{ behavioral.average_sentiment }}
- STAR completeness: {{ behavioral.star_completeness }}
- competencies shown: {{ behavioral.unique_competencies | join(", ") }}
- behavioral score: {{ behavioral.overall_score }}/100
{% else -%}
No behavioral answers were collected.
{% endif %}
{% if coding -%}
Coding challenge: {{ coding.passed }}/{{ coding.total }} tests passed, average {{ coding.exec_time_ms }} ms.
{% if coding.stderr %}First failure: {{ coding.stderr }}{% endif %}
{% else -%}
No code was executed.
{% endif %}
Interactions: {{ behavioral_interactions }} behavioral, {{ coding_interactions }} coding.

Score each competency from 0 to 100 and respond in JSON format:
{
    "culture": 80,
    "communication": 75,
    "problem_solving": 70,
    "technical": 85
}"#;

static PROMPTS: Lazy<Environment<'static>> = Lazy::new(|| {
    let mut env = Environment::new();
    // Both templates are compile-time constants
    env.add_template("analysis", ANALYSIS_TEMPLATE)
        .expect("analysis template is valid");
    env.add_template("scoring", SCORING_TEMPLATE)
        .expect("scoring template is valid");
    env
});

fn render(name: &str, ctx: minijinja::Value) -> Result<String> {
    PROMPTS
        .get_template(name)
        .and_then(|template| template.render(ctx))
        .map_err(|e| PanelError::internal(format!("Failed to render {name} prompt: {e}")))
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct AnalysisPayload {
    #[serde(default)]
    sentiment: f64,
    #[serde(default = "default_star")]
    star_completeness: f64,
    #[serde(default)]
    competency_demonstration: CompetencyStrength,
    #[serde(default)]
    insights: Vec<String>,
    #[serde(default)]
    improvement_areas: Vec<String>,
}

fn default_star() -> f64 {
    0.5
}

/// Scores as the model writes them: any JSON number, possibly fractional or
/// out of range.
#[derive(Debug, Default, Deserialize)]
struct ScoresPayload {
    #[serde(default)]
    culture: Option<f64>,
    #[serde(default)]
    communication: Option<f64>,
    #[serde(default)]
    problem_solving: Option<f64>,
    #[serde(default)]
    technical: Option<f64>,
}

impl ScoresPayload {
    /// Rounds each score and clamps it to 0..=100. Non-finite values are dropped.
    fn into_update(self) -> ScoreUpdate {
        let score = |value: Option<f64>| {
            value
                .filter(|v| v.is_finite())
                .map(|v| v.round().clamp(0.0, 100.0) as u32)
        };
        ScoreUpdate {
            culture: score(self.culture),
            communication: score(self.communication),
            problem_solving: score(self.problem_solving),
            technical: score(self.technical),
        }
    }
}

/// Parses the model's reply, tolerating a surrounding Markdown code fence.
fn parse_reply<T: DeserializeOwned>(content: &str) -> Result<T> {
    let trimmed = content.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed);

    serde_json::from_str(body.trim())
        .map_err(|e| PanelError::service(SERVICE, format!("Model reply is not the expected JSON: {e}")))
}

/// Analysis used when the model cannot be reached or answers nonsense.
pub fn fallback_analysis(response: &str) -> ResponseAnalysis {
    let mut analysis = ResponseAnalysis::from_scores(response, 0.0, default_star());
    analysis.insights = vec!["Response provided with reasonable detail".to_string()];
    analysis.improvement_areas = vec!["Could provide more specific examples".to_string()];
    analysis
}

/// Response analyzer and scoring engine over a chat completions API.
#[derive(Debug, Clone)]
pub struct LlmAssessor {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl LlmAssessor {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            temperature: LlmSettings::default().temperature,
        }
    }

    /// Builds an assessor from settings.
    ///
    /// # Errors
    ///
    /// `PanelError::Config` when no API key is configured.
    pub fn from_settings(settings: &LlmSettings) -> Result<Self> {
        let api_key = settings.api_key.clone().ok_or_else(|| {
            PanelError::config("OPENAI_API_KEY not found in config.toml or environment variables")
        })?;
        Ok(Self::new(settings.base_url.clone(), api_key, settings.model.clone())
            .with_temperature(settings.temperature))
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: String) -> Result<String> {
        const OP: &str = "chat completion";
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt,
            }],
            temperature: self.temperature,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let response = self
            .client
            .post(join_url(&self.base_url, "chat/completions"))
            .bearer_auth(&self.api_key)
            .json(&request)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| transport_error(OP, REQUEST_TIMEOUT, e))?;
        let response = ensure_success(OP, response).await?;
        let body: ChatResponse = decode_json(OP, response).await?;

        body.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| PanelError::service(SERVICE, "Model returned no choices"))
    }

    async fn try_analyze(&self, question: &BehavioralQuestion, response: &str) -> Result<ResponseAnalysis> {
        let prompt = render(
            "analysis",
            context! {
                category => &question.category,
                question => &question.prompt,
                response => response,
                competencies => &question.competencies,
            },
        )?;
        let payload: AnalysisPayload = parse_reply(&self.complete(prompt).await?)?;

        let mut analysis =
            ResponseAnalysis::from_scores(response, payload.sentiment, payload.star_completeness);
        analysis.competency = payload.competency_demonstration;
        analysis.insights = payload.insights;
        analysis.improvement_areas = payload.improvement_areas;
        Ok(analysis)
    }
}

#[async_trait]
impl ResponseAnalyzer for LlmAssessor {
    fn name(&self) -> &str {
        SERVICE
    }

    /// Never fails on model errors: a neutral fallback analysis is returned
    /// instead, with keywords still extracted locally.
    async fn analyze(&self, question: &BehavioralQuestion, response: &str) -> Result<ResponseAnalysis> {
        match self.try_analyze(question, response).await {
            Ok(analysis) => Ok(analysis),
            Err(e) => {
                tracing::warn!(question_id = question.id, error = %e, "AI analysis failed, using fallback");
                Ok(fallback_analysis(response))
            }
        }
    }
}

#[async_trait]
impl ScoringEngine for LlmAssessor {
    fn name(&self) -> &str {
        SERVICE
    }

    async fn score(&self, scoring: &ScoringContext) -> Result<ScoreUpdate> {
        let count = |role: AgentRole| scoring.events.iter().filter(|e| e.sender == role).count();
        let prompt = render(
            "scoring",
            context! {
                role => &scoring.config.role,
                difficulty => scoring.config.difficulty.to_string(),
                behavioral => &scoring.behavioral,
                coding => &scoring.coding,
                behavioral_interactions => count(AgentRole::Behavioral),
                coding_interactions => count(AgentRole::Coding),
            },
        )?;

        let update = parse_reply::<ScoresPayload>(&self.complete(prompt).await?)?.into_update();
        if update.is_empty() {
            return Err(PanelError::service(SERVICE, "Model returned no scores"));
        }
        tracing::info!(session_id = %scoring.session_id, ?update, "Scores received");
        Ok(update)
    }
}
