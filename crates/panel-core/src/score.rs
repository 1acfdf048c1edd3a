//! Competency scores, partial updates, and hiring classification.

use serde::{Deserialize, Serialize};
use strum::Display;

/// Highest value any score can take.
pub const MAX_SCORE: u8 = 100;

/// The four competency sub-scores and their derived overall score.
///
/// `overall` is always `floor(mean)` of the four sub-scores; there is no way
/// to set it directly. A stored `overall` is ignored on load and recomputed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredScores")]
pub struct ScoreRecord {
    culture: u8,
    communication: u8,
    problem_solving: u8,
    technical: u8,
    overall: u8,
}

#[derive(Deserialize)]
struct StoredScores {
    #[serde(default)]
    culture: u32,
    #[serde(default)]
    communication: u32,
    #[serde(default)]
    problem_solving: u32,
    #[serde(default)]
    technical: u32,
}

impl From<StoredScores> for ScoreRecord {
    fn from(stored: StoredScores) -> Self {
        ScoreRecord::default().merged(&ScoreUpdate {
            culture: Some(stored.culture),
            communication: Some(stored.communication),
            problem_solving: Some(stored.problem_solving),
            technical: Some(stored.technical),
        })
    }
}

/// A partial score update; only `Some` fields overwrite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub culture: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub communication: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub problem_solving: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technical: Option<u32>,
}

impl ScoreUpdate {
    pub fn culture(mut self, value: u32) -> Self {
        self.culture = Some(value);
        self
    }

    pub fn communication(mut self, value: u32) -> Self {
        self.communication = Some(value);
        self
    }

    pub fn problem_solving(mut self, value: u32) -> Self {
        self.problem_solving = Some(value);
        self
    }

    pub fn technical(mut self, value: u32) -> Self {
        self.technical = Some(value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.culture.is_none()
            && self.communication.is_none()
            && self.problem_solving.is_none()
            && self.technical.is_none()
    }
}

fn clamp(value: u32) -> u8 {
    value.min(MAX_SCORE as u32) as u8
}

impl ScoreRecord {
    /// Merges `update` into a copy of this record and recomputes `overall`.
    ///
    /// Values above 100 are clamped.
    pub fn merged(self, update: &ScoreUpdate) -> Self {
        let mut next = self;
        if let Some(v) = update.culture {
            next.culture = clamp(v);
        }
        if let Some(v) = update.communication {
            next.communication = clamp(v);
        }
        if let Some(v) = update.problem_solving {
            next.problem_solving = clamp(v);
        }
        if let Some(v) = update.technical {
            next.technical = clamp(v);
        }
        next.overall = next.mean();
        next
    }

    fn mean(&self) -> u8 {
        let sum = self.culture as u32
            + self.communication as u32
            + self.problem_solving as u32
            + self.technical as u32;
        (sum / 4) as u8
    }

    pub fn culture(&self) -> u8 {
        self.culture
    }

    pub fn communication(&self) -> u8 {
        self.communication
    }

    pub fn problem_solving(&self) -> u8 {
        self.problem_solving
    }

    pub fn technical(&self) -> u8 {
        self.technical
    }

    pub fn overall(&self) -> u8 {
        self.overall
    }

    /// Sub-scores with their display labels, in dashboard order.
    pub fn dimensions(&self) -> [(&'static str, u8); 4] {
        [
            ("Culture Fit", self.culture),
            ("Communication", self.communication),
            ("Problem Solving", self.problem_solving),
            ("Technical Skills", self.technical),
        ]
    }

    pub fn recommendation(&self) -> HireRecommendation {
        HireRecommendation::from_overall(self.overall)
    }
}

/// Accepts partial updates and keeps the derived overall score current.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreAggregator {
    record: ScoreRecord,
}

impl ScoreAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, update: &ScoreUpdate) -> ScoreRecord {
        self.record = self.record.merged(update);
        self.record
    }

    pub fn record(&self) -> ScoreRecord {
        self.record
    }
}

/// Final hiring call derived from the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum HireRecommendation {
    #[strum(serialize = "Strong Hire")]
    StrongHire,
    #[strum(serialize = "Hire")]
    Hire,
    #[strum(serialize = "Lean No")]
    LeanNo,
    #[strum(serialize = "No Hire")]
    NoHire,
}

impl HireRecommendation {
    pub fn from_overall(overall: u8) -> Self {
        match overall {
            85.. => Self::StrongHire,
            70..=84 => Self::Hire,
            55..=69 => Self::LeanNo,
            _ => Self::NoHire,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::StrongHire => "Exceptional candidate with strong alignment to role requirements",
            Self::Hire => "Solid candidate who meets most requirements with growth potential",
            Self::LeanNo => "Mixed performance with significant areas for development",
            Self::NoHire => "Does not meet current role requirements",
        }
    }

    pub fn is_hire(self) -> bool {
        matches!(self, Self::StrongHire | Self::Hire)
    }
}

/// Per-dimension band shown next to each sub-score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Strong,
    Developing,
    #[strum(serialize = "Needs Improvement")]
    NeedsImprovement,
}

impl ScoreBand {
    pub fn from_score(score: u8) -> Self {
        match score {
            80.. => Self::Strong,
            60..=79 => Self::Developing,
            _ => Self::NeedsImprovement,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_updates_merge_and_recompute() {
        let mut aggregator = ScoreAggregator::new();

        let first = aggregator.update(&ScoreUpdate::default().technical(80));
        assert_eq!(first.technical(), 80);
        assert_eq!(first.culture(), 0);
        assert_eq!(first.overall(), 20);

        let second = aggregator.update(&ScoreUpdate::default().culture(90));
        assert_eq!(second.technical(), 80);
        assert_eq!(second.culture(), 90);
        assert_eq!(second.communication(), 0);
        assert_eq!(second.problem_solving(), 0);
        // floor((90 + 0 + 0 + 80) / 4) = floor(42.5)
        assert_eq!(second.overall(), 42);
    }

    #[test]
    fn test_overall_is_floored_mean() {
        let record = ScoreRecord::default().merged(
            &ScoreUpdate::default()
                .culture(71)
                .communication(80)
                .problem_solving(66)
                .technical(90),
        );
        // 307 / 4 = 76.75
        assert_eq!(record.overall(), 76);
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let record = ScoreRecord::default().merged(&ScoreUpdate::default().culture(250));
        assert_eq!(record.culture(), 100);
        assert_eq!(record.overall(), 25);
    }

    #[test]
    fn test_empty_update_keeps_values() {
        let record = ScoreRecord::default().merged(&ScoreUpdate::default().technical(60));
        let same = record.merged(&ScoreUpdate::default());
        assert_eq!(record, same);
        assert!(ScoreUpdate::default().is_empty());
    }

    #[test]
    fn test_recommendation_thresholds() {
        assert_eq!(HireRecommendation::from_overall(85), HireRecommendation::StrongHire);
        assert_eq!(HireRecommendation::from_overall(84), HireRecommendation::Hire);
        assert_eq!(HireRecommendation::from_overall(70), HireRecommendation::Hire);
        assert_eq!(HireRecommendation::from_overall(69), HireRecommendation::LeanNo);
        assert_eq!(HireRecommendation::from_overall(55), HireRecommendation::LeanNo);
        assert_eq!(HireRecommendation::from_overall(54), HireRecommendation::NoHire);
        assert_eq!(HireRecommendation::StrongHire.to_string(), "Strong Hire");
        assert!(!HireRecommendation::LeanNo.is_hire());
    }

    #[test]
    fn test_score_bands() {
        assert_eq!(ScoreBand::from_score(80), ScoreBand::Strong);
        assert_eq!(ScoreBand::from_score(79), ScoreBand::Developing);
        assert_eq!(ScoreBand::from_score(60), ScoreBand::Developing);
        assert_eq!(ScoreBand::from_score(59), ScoreBand::NeedsImprovement);
    }

    #[test]
    fn test_update_deserializes_partial_json() {
        let update: ScoreUpdate = serde_json::from_str(r#"{"problem_solving": 77}"#).unwrap();
        assert_eq!(update.problem_solving, Some(77));
        assert!(update.culture.is_none());
    }

    #[test]
    fn test_loaded_record_recomputes_overall() {
        let record: ScoreRecord = serde_json::from_str(
            r#"{"culture": 80, "communication": 60, "problem_solving": 70, "technical": 90, "overall": 12}"#,
        )
        .unwrap();
        assert_eq!(record.overall(), 75);

        let text = toml::to_string(&record).unwrap();
        let reloaded: ScoreRecord = toml::from_str(&text).unwrap();
        assert_eq!(reloaded, record);
    }
}
