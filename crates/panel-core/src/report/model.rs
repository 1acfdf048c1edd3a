use crate::assessment::{BehavioralSummary, CodingResult};
use crate::config::Difficulty;
use crate::event::AgentRole;
use crate::score::{HireRecommendation, ScoreBand, ScoreRecord};
use crate::session::{Session, SessionStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const MAX_HIGHLIGHTS: usize = 5;

/// One sub-score with its display band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionBand {
    pub dimension: String,
    pub score: u8,
    pub band: ScoreBand,
}

/// Summary of a finished interview.
///
/// Plain values come first and tables last so the report serializes to TOML
/// without reordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewReport {
    pub session_id: String,
    pub role: String,
    pub difficulty: Difficulty,
    pub planned_minutes: u32,
    pub elapsed_secs: u64,
    pub status: SessionStatus,
    pub overall_score: u8,
    pub recommendation: HireRecommendation,
    pub recommendation_detail: String,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub behavioral_interactions: usize,
    pub coding_interactions: usize,
    /// Every event appended during the session, including evicted ones.
    pub event_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coding_summary: Option<String>,
    pub generated_at: DateTime<Utc>,
    pub scores: ScoreRecord,
    pub bands: Vec<DimensionBand>,
}

impl InterviewReport {
    /// Builds the report for `session` from whatever assessments ran.
    pub fn build(
        session: &Session,
        behavioral: Option<&BehavioralSummary>,
        coding: Option<&CodingResult>,
    ) -> Self {
        let scores = session.scores();
        let recommendation = scores.recommendation();
        let bands = scores
            .dimensions()
            .iter()
            .map(|(dimension, score)| DimensionBand {
                dimension: dimension.to_string(),
                score: *score,
                band: ScoreBand::from_score(*score),
            })
            .collect::<Vec<_>>();

        let mut strengths = Vec::new();
        let mut improvements = Vec::new();
        if let Some(summary) = behavioral {
            strengths.extend(summary.strengths.iter().cloned());
            improvements.extend(summary.improvement_areas.iter().cloned());
        }
        if let Some(result) = coding {
            if result.all_passed() {
                strengths.push("Working solution that passes every test case".to_string());
            } else if result.pass_rate < 50.0 {
                improvements.push("Strengthen algorithmic problem solving and edge case handling".to_string());
            }
        }
        for band in &bands {
            match band.band {
                ScoreBand::Strong => strengths.push(format!("Strong {}", band.dimension.to_lowercase())),
                ScoreBand::NeedsImprovement => {
                    improvements.push(format!("Develop {}", band.dimension.to_lowercase()))
                }
                ScoreBand::Developing => {}
            }
        }
        strengths.truncate(MAX_HIGHLIGHTS);
        improvements.truncate(MAX_HIGHLIGHTS);

        let events = session.events();
        Self {
            session_id: session.id().to_string(),
            role: session.config().role.clone(),
            difficulty: session.config().difficulty,
            planned_minutes: session.config().duration_minutes,
            elapsed_secs: session.elapsed_secs(),
            status: session.status(),
            overall_score: scores.overall(),
            recommendation,
            recommendation_detail: recommendation.description().to_string(),
            strengths,
            improvements,
            behavioral_interactions: events.count_from(AgentRole::Behavioral),
            coding_interactions: events.count_from(AgentRole::Coding),
            event_count: events.total_recorded(),
            coding_summary: coding.map(CodingResult::headline),
            generated_at: Utc::now(),
            scores,
            bands,
        }
    }
}
