use crate::question::BehavioralQuestion;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use strum::Display;

/// Competency vocabulary searched for in behavioral answers.
pub const COMPETENCY_KEYWORDS: &[&str] = &[
    "team",
    "collaboration",
    "leadership",
    "problem",
    "solution",
    "challenge",
    "success",
    "failure",
    "learn",
    "improve",
    "communicate",
    "manage",
    "deliver",
    "quality",
    "deadline",
    "customer",
    "user",
    "technical",
    "decision",
    "responsibility",
    "initiative",
    "conflict",
    "resolution",
    "code",
    "debug",
    "optimize",
    "scale",
    "performance",
];

static KEYWORD_PATTERN: Lazy<Regex> = Lazy::new(|| {
    let alternatives = COMPETENCY_KEYWORDS.join("|");
    // The vocabulary is a fixed list of ASCII words
    Regex::new(&format!(r"(?i)\b({alternatives})\b")).expect("keyword pattern is valid")
});

/// Competency keywords found in `text`, lowercased, unique, in first-seen order.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for m in KEYWORD_PATTERN.find_iter(text) {
        let word = m.as_str().to_lowercase();
        if !seen.contains(&word) {
            seen.push(word);
        }
    }
    seen
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Sentiment band of a polarity score in [-1, 1].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Polarity {
    Positive,
    Neutral,
    Negative,
}

impl Polarity {
    pub fn from_score(score: f64) -> Self {
        if score > 0.1 {
            Polarity::Positive
        } else if score < -0.1 {
            Polarity::Negative
        } else {
            Polarity::Neutral
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CompetencyStrength {
    Strong,
    #[default]
    Moderate,
    Weak,
}

/// Result of analyzing one behavioral answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseAnalysis {
    /// Sentiment polarity in [-1, 1].
    pub sentiment: f64,
    pub polarity: Polarity,
    pub keywords: Vec<String>,
    pub word_count: usize,
    /// How completely the answer covers Situation, Task, Action, Result, in [0, 1].
    pub star_completeness: f64,
    #[serde(default)]
    pub competency: CompetencyStrength,
    #[serde(default)]
    pub insights: Vec<String>,
    #[serde(default)]
    pub improvement_areas: Vec<String>,
}

impl ResponseAnalysis {
    /// Builds an analysis from a sentiment score and STAR completeness,
    /// filling keywords and word count from the answer text.
    ///
    /// Both scores are clamped into their valid ranges.
    pub fn from_scores(response: &str, sentiment: f64, star_completeness: f64) -> Self {
        let sentiment = sentiment.clamp(-1.0, 1.0);
        Self {
            sentiment,
            polarity: Polarity::from_score(sentiment),
            keywords: extract_keywords(response),
            word_count: word_count(response),
            star_completeness: star_completeness.clamp(0.0, 1.0),
            competency: CompetencyStrength::default(),
            insights: Vec::new(),
            improvement_areas: Vec::new(),
        }
    }
}

/// One answered question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectedResponse {
    pub question: BehavioralQuestion,
    pub answer: String,
    pub analysis: ResponseAnalysis,
}

/// Aggregate view over every behavioral answer in a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehavioralSummary {
    pub responses_count: usize,
    pub average_sentiment: f64,
    pub sentiment_category: Polarity,
    pub total_keywords: usize,
    /// Sorted, de-duplicated keywords across all answers.
    pub unique_competencies: Vec<String>,
    pub star_completeness: f64,
    pub overall_score: u32,
    pub strengths: Vec<String>,
    pub improvement_areas: Vec<String>,
}

impl BehavioralSummary {
    /// Summarizes collected responses. Returns `None` when there are none.
    pub fn from_responses(responses: &[CollectedResponse]) -> Option<Self> {
        if responses.is_empty() {
            return None;
        }
        let n = responses.len() as f64;

        let average_sentiment = responses.iter().map(|r| r.analysis.sentiment).sum::<f64>() / n;
        let star_completeness = responses
            .iter()
            .map(|r| r.analysis.star_completeness)
            .sum::<f64>()
            / n;
        let total_keywords = responses.iter().map(|r| r.analysis.keywords.len()).sum();
        let unique: BTreeSet<&str> = responses
            .iter()
            .flat_map(|r| r.analysis.keywords.iter().map(String::as_str))
            .collect();

        let coverage = (unique.len() as f64 * 5.0).min(30.0);
        let raw = (average_sentiment + 1.0) * 30.0 + star_completeness * 40.0 + coverage;
        let overall_score = (raw.max(0.0).floor() as u32).min(100);

        Some(Self {
            responses_count: responses.len(),
            average_sentiment,
            sentiment_category: Polarity::from_score(average_sentiment),
            total_keywords,
            unique_competencies: unique.iter().map(|s| s.to_string()).collect(),
            star_completeness,
            overall_score,
            strengths: strengths(responses),
            improvement_areas: improvements(responses, star_completeness, unique.len()),
        })
    }
}

fn strengths(responses: &[CollectedResponse]) -> Vec<String> {
    let mut strengths = Vec::new();

    let confident = responses
        .iter()
        .filter(|r| r.analysis.sentiment > 0.3)
        .count();
    if confident >= 2 {
        strengths.push("Demonstrates positive attitude and confidence".to_string());
    }

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for response in responses {
        for keyword in &response.analysis.keywords {
            *counts.entry(keyword.as_str()).or_default() += 1;
        }
    }
    let frequent = |k: &str| counts.get(k).copied().unwrap_or(0) >= 2;

    if frequent("leadership") {
        strengths.push("Shows consistent leadership experience".to_string());
    }
    if frequent("problem") && frequent("solution") {
        strengths.push("Strong problem-solving orientation".to_string());
    }
    if frequent("team") || frequent("collaboration") {
        strengths.push("Excellent teamwork and collaboration skills".to_string());
    }

    strengths.truncate(3);
    strengths
}

fn improvements(responses: &[CollectedResponse], avg_star: f64, unique: usize) -> Vec<String> {
    let mut improvements = Vec::new();

    if avg_star < 0.6 {
        improvements.push("Practice using the STAR method more completely in responses".to_string());
    }

    let avg_words = responses
        .iter()
        .map(|r| r.analysis.word_count as f64)
        .sum::<f64>()
        / responses.len() as f64;
    if avg_words < 50.0 {
        improvements.push("Provide more detailed examples and context in responses".to_string());
    } else if avg_words > 200.0 {
        improvements.push("Focus on being more concise while maintaining key details".to_string());
    }

    if unique < 5 {
        improvements.push("Demonstrate a broader range of competencies and skills".to_string());
    }

    improvements.truncate(3);
    improvements
}
