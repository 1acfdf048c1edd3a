//! In-process assessment services with scripted answers.

#![allow(dead_code)]

use async_trait::async_trait;
use panel_application::{InterviewRunner, InterviewServices, RunnerOptions};
use panel_core::{PanelError, Result};
use panel_core::assessment::{
    CodeExecutor, CodeSubmission, CodingResult, ResponseAnalysis, ResponseAnalyzer,
    ScoringContext, ScoringEngine, TestOutcome,
};
use panel_core::config::InterviewConfig;
use panel_core::question::BehavioralQuestion;
use panel_core::score::ScoreUpdate;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Answers every response with the same scores after `delay`.
pub struct ScriptedAnalyzer {
    pub delay: Duration,
    pub calls: AtomicUsize,
}

impl ScriptedAnalyzer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ResponseAnalyzer for ScriptedAnalyzer {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn analyze(&self, _question: &BehavioralQuestion, response: &str) -> Result<ResponseAnalysis> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        Ok(ResponseAnalysis::from_scores(response, 0.5, 0.8))
    }
}

/// Passes the first `passing` test cases of every submission after `delay`.
pub struct ScriptedExecutor {
    pub passing: usize,
    pub delay: Duration,
    pub submissions: Mutex<Vec<CodeSubmission>>,
}

impl ScriptedExecutor {
    pub fn new(passing: usize) -> Self {
        Self {
            passing,
            delay: Duration::ZERO,
            submissions: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl CodeExecutor for ScriptedExecutor {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn execute(&self, submission: &CodeSubmission) -> Result<CodingResult> {
        self.submissions.lock().unwrap().push(submission.clone());
        tokio::time::sleep(self.delay).await;
        let outcomes = submission
            .test_cases
            .iter()
            .enumerate()
            .map(|(i, case)| {
                let passed = i < self.passing;
                TestOutcome {
                    test_case: i + 1,
                    status: if passed { "Accepted" } else { "Wrong Answer" }.to_string(),
                    passed,
                    output: if passed { case.expected.clone() } else { String::new() },
                    error: String::new(),
                    time_ms: 12.0,
                    memory_kb: 2048,
                }
            })
            .collect();
        Ok(CodingResult::from_outcomes(outcomes, submission.test_cases.len()))
    }
}

/// Returns a fixed update and remembers what it was asked to score.
///
/// The first `failures` calls fail with a service error.
pub struct FixedScorer {
    pub update: ScoreUpdate,
    pub failures: AtomicUsize,
    pub seen: Mutex<Option<ScoringContext>>,
}

impl FixedScorer {
    pub fn new(update: ScoreUpdate) -> Self {
        Self {
            update,
            failures: AtomicUsize::new(0),
            seen: Mutex::new(None),
        }
    }

    pub fn failing_first(self, failures: usize) -> Self {
        self.failures.store(failures, Ordering::SeqCst);
        self
    }
}

#[async_trait]
impl ScoringEngine for FixedScorer {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn score(&self, context: &ScoringContext) -> Result<ScoreUpdate> {
        *self.seen.lock().unwrap() = Some(context.clone());
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return Err(PanelError::service("fixed", "scorer unavailable"));
        }
        Ok(self.update)
    }
}

pub struct Harness {
    pub analyzer: Arc<ScriptedAnalyzer>,
    pub executor: Arc<ScriptedExecutor>,
    pub scorer: Arc<FixedScorer>,
}

impl Harness {
    pub fn new(analysis_delay: Duration) -> Self {
        Self {
            analyzer: Arc::new(ScriptedAnalyzer::new(analysis_delay)),
            executor: Arc::new(ScriptedExecutor::new(3)),
            scorer: Arc::new(FixedScorer::new(default_scores())),
        }
    }

    pub fn services(&self) -> InterviewServices {
        InterviewServices {
            analyzer: self.analyzer.clone(),
            executor: self.executor.clone(),
            scorer: self.scorer.clone(),
        }
    }

    pub fn start(&self, options: RunnerOptions) -> InterviewRunner {
        InterviewRunner::start(InterviewConfig::default(), self.services(), options).unwrap()
    }
}

pub fn default_scores() -> ScoreUpdate {
    ScoreUpdate::default()
        .culture(80)
        .communication(75)
        .problem_solving(70)
        .technical(68)
}

pub const ANSWER: &str =
    "Our team hit a deadline problem, so I organized pairing and we delivered with quality.";

/// Drives a fresh runner to the coding phase.
pub async fn through_behavioral(runner: &InterviewRunner) {
    runner.begin().await.unwrap();
    for _ in 0..3 {
        runner.submit_response(ANSWER).await.unwrap();
    }
}
