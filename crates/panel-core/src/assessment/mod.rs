//! Assessment service interfaces.
//!
//! Behavioral analysis, code execution and final scoring are performed by
//! external services. This module defines the contracts those services
//! implement plus the deterministic bookkeeping done locally around them
//! (keyword extraction, polarity bands, behavioral summaries, pass-rate
//! summaries).
//!
//! # Module Structure
//!
//! - `behavioral`: response analysis types, keyword extraction, `BehavioralSummary`
//! - `coding`: code submissions and `CodingResult` summaries

mod behavioral;
mod coding;

pub use behavioral::{
    BehavioralSummary, COMPETENCY_KEYWORDS, CollectedResponse, CompetencyStrength, Polarity,
    ResponseAnalysis, extract_keywords, word_count,
};
pub use coding::{CodeSubmission, CodingResult, TestOutcome};

use crate::config::InterviewConfig;
use crate::error::Result;
use crate::event::AgentEvent;
use crate::question::BehavioralQuestion;
use crate::score::ScoreUpdate;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Evaluates a candidate's answer to a behavioral question.
#[async_trait]
pub trait ResponseAnalyzer: Send + Sync {
    /// Short name used in logs and error messages.
    fn name(&self) -> &str;

    /// Analyzes `response` given the question it answers.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing service fails or returns an unusable payload.
    async fn analyze(
        &self,
        question: &BehavioralQuestion,
        response: &str,
    ) -> Result<ResponseAnalysis>;
}

/// Runs candidate code against test cases in a sandbox.
#[async_trait]
pub trait CodeExecutor: Send + Sync {
    fn name(&self) -> &str;

    /// Executes the submission and summarizes per-test outcomes.
    async fn execute(&self, submission: &CodeSubmission) -> Result<CodingResult>;

    /// Whether the sandbox is reachable. Never errors.
    async fn health_check(&self) -> bool {
        true
    }
}

/// Produces competency scores for a finished session.
#[async_trait]
pub trait ScoringEngine: Send + Sync {
    fn name(&self) -> &str;

    /// Scores the session described by `context`.
    ///
    /// Only the returned fields are merged into the session's score record.
    async fn score(&self, context: &ScoringContext) -> Result<ScoreUpdate>;
}

/// Everything a scoring engine may look at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringContext {
    pub session_id: String,
    pub config: InterviewConfig,
    pub events: Vec<AgentEvent>,
    pub behavioral: Option<BehavioralSummary>,
    pub coding: Option<CodingResult>,
}
