//! Local interview runner.
//!
//! `InterviewRunner` drives one session through its five phases, calling the
//! assessment services at the points where the interview needs an outside
//! judgement. It owns:
//!
//! - the session clock, a 1 s interval task stopped through a
//!   `CancellationToken` on `end`, `finish` and drop
//! - a single in-flight slot: a second external call while one is pending
//!   fails with `PanelError::Busy`
//! - per-service timeouts, each raced against the session's cancellation
//!
//! The `Session` itself is an immutable value; every operation computes the
//! next value and only then swaps it in, so a failed operation leaves the
//! session exactly as it was.

use panel_core::assessment::{
    BehavioralSummary, CodeExecutor, CodeSubmission, CodingResult, CollectedResponse,
    ResponseAnalysis, ResponseAnalyzer, ScoringContext, ScoringEngine,
};
use panel_core::config::InterviewConfig;
use panel_core::event::{AgentEvent, AgentMessage, AgentRole, EventCategory, EventLog};
use panel_core::phase::Phase;
use panel_core::problem::CodingProblem;
use panel_core::question::{BehavioralQuestion, session_questions};
use panel_core::report::{InterviewReport, ReportRepository};
use panel_core::score::ScoreRecord;
use panel_core::session::Session;
use panel_core::settings::{AppConfig, TimeoutSettings};
use panel_core::{PanelError, Result};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

const TICK: Duration = Duration::from_secs(1);

const ANALYSIS_STEPS: [&str; 5] = [
    "Analyzing behavioral responses...",
    "Evaluating technical performance...",
    "Processing sentiment data...",
    "Calculating competency scores...",
    "Generating final assessment...",
];

fn analysis_steps() -> impl Iterator<Item = AgentMessage> {
    ANALYSIS_STEPS
        .iter()
        .map(|step| AgentMessage::system(AgentRole::Analysis, *step))
}

/// The three external assessment services a runner talks to.
#[derive(Clone)]
pub struct InterviewServices {
    pub analyzer: Arc<dyn ResponseAnalyzer>,
    pub executor: Arc<dyn CodeExecutor>,
    pub scorer: Arc<dyn ScoringEngine>,
}

/// Tunables for a runner.
#[derive(Clone)]
pub struct RunnerOptions {
    pub timeouts: TimeoutSettings,
    /// Events retained by the session's log.
    pub event_capacity: usize,
    /// Where completed reports are archived, if anywhere.
    pub reports: Option<Arc<dyn ReportRepository>>,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            timeouts: TimeoutSettings::default(),
            event_capacity: AppConfig::default().event_log.capacity,
            reports: None,
        }
    }
}

impl RunnerOptions {
    pub fn from_settings(settings: &AppConfig) -> Self {
        Self {
            timeouts: settings.timeouts,
            event_capacity: settings.event_log.capacity,
            reports: None,
        }
    }

    pub fn with_reports(mut self, reports: Arc<dyn ReportRepository>) -> Self {
        self.reports = Some(reports);
        self
    }
}

/// What happened to one behavioral answer.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseOutcome {
    pub analysis: ResponseAnalysis,
    /// The next question, or `None` once the behavioral phase is over.
    pub next_question: Option<BehavioralQuestion>,
}

/// Mutable state behind the runner's lock.
struct RunnerState {
    session: Session,
    responses: Vec<CollectedResponse>,
    last_result: Option<CodingResult>,
    behavioral: Option<BehavioralSummary>,
    report: Option<InterviewReport>,
}

/// Releases the in-flight slot when dropped.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Runs one interview session locally.
pub struct InterviewRunner {
    state: Arc<RwLock<RunnerState>>,
    services: InterviewServices,
    timeouts: TimeoutSettings,
    reports: Option<Arc<dyn ReportRepository>>,
    questions: Vec<BehavioralQuestion>,
    problem: CodingProblem,
    in_flight: AtomicBool,
    cancel: CancellationToken,
    clock: JoinHandle<()>,
}

impl InterviewRunner {
    /// Starts a session and its clock.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `PanelError::Validation` if `config` is invalid.
    pub fn start(
        config: InterviewConfig,
        services: InterviewServices,
        options: RunnerOptions,
    ) -> Result<Self> {
        let problem = CodingProblem::for_difficulty(config.difficulty);
        let session = Session::start_with(
            Uuid::new_v4().to_string(),
            config,
            EventLog::with_capacity(options.event_capacity),
        )?;

        let state = Arc::new(RwLock::new(RunnerState {
            session,
            responses: Vec::new(),
            last_result: None,
            behavioral: None,
            report: None,
        }));
        let cancel = CancellationToken::new();
        let clock = spawn_clock(state.clone(), cancel.clone());

        Ok(Self {
            state,
            services,
            timeouts: options.timeouts,
            reports: options.reports,
            questions: session_questions(),
            problem,
            in_flight: AtomicBool::new(false),
            cancel,
            clock,
        })
    }

    /// The coding problem for this session's difficulty.
    pub fn challenge(&self) -> &CodingProblem {
        &self.problem
    }

    /// A copy of the current session value.
    pub async fn snapshot(&self) -> Session {
        self.state.read().await.session.clone()
    }

    /// The last `n` events, oldest first.
    pub async fn tail(&self, n: usize) -> Vec<AgentEvent> {
        let state = self.state.read().await;
        state.session.tail(n).into_iter().cloned().collect()
    }

    pub async fn last_result(&self) -> Option<CodingResult> {
        self.state.read().await.last_result.clone()
    }

    /// The report, once `finish` has produced it.
    pub async fn report(&self) -> Option<InterviewReport> {
        self.state.read().await.report.clone()
    }

    /// Whether the session clock task is still running.
    pub fn is_clock_running(&self) -> bool {
        !self.clock.is_finished()
    }

    /// Completes the introduction and asks the first behavioral question.
    pub async fn begin(&self) -> Result<BehavioralQuestion> {
        let first = self
            .questions
            .first()
            .cloned()
            .ok_or_else(|| PanelError::internal("question bank is empty"))?;

        let mut state = self.state.write().await;
        let next = state
            .session
            .record(AgentMessage::system(
                AgentRole::Coordinator,
                "Transitioning to behavioral assessment phase",
            ))
            .advance(Phase::Introduction)?
            .record(question_event(&first));
        state.session = next;
        Ok(first)
    }

    /// The question awaiting an answer, if the behavioral phase is active.
    pub async fn current_question(&self) -> Option<BehavioralQuestion> {
        let state = self.state.read().await;
        if state.session.current_phase() != Some(Phase::Behavioral) {
            return None;
        }
        self.questions.get(state.responses.len()).cloned()
    }

    /// Analyzes an answer to the current question.
    ///
    /// After the last question the session advances to the coding phase and
    /// the challenge is announced.
    pub async fn submit_response(&self, answer: &str) -> Result<ResponseOutcome> {
        let answer = answer.trim();
        if answer.is_empty() {
            return Err(PanelError::validation("Response must not be empty"));
        }

        let question = {
            let state = self.state.read().await;
            ensure_phase(&state.session, Phase::Behavioral)?;
            self.questions
                .get(state.responses.len())
                .cloned()
                .ok_or_else(|| PanelError::internal("no behavioral question pending"))?
        };

        let _slot = self.acquire("analyze response")?;
        let analysis = self
            .call(
                "analyze response",
                self.timeouts.analysis(),
                self.services.analyzer.analyze(&question, answer),
            )
            .await?;

        let mut state = self.state.write().await;
        ensure_phase(&state.session, Phase::Behavioral)?;

        let mut next = state.session.record_all([
            AgentMessage::new(AgentRole::Candidate, EventCategory::Response, answer),
            AgentMessage::new(
                AgentRole::Behavioral,
                EventCategory::Analysis,
                format!(
                    "Response analyzed: Sentiment {:.0}%, Keywords: {}",
                    analysis.sentiment * 100.0,
                    analysis.keywords.join(", ")
                ),
            ),
        ]);

        let answered = state.responses.len() + 1;
        let next_question = self.questions.get(answered).cloned();
        next = match &next_question {
            Some(q) => next.record(question_event(q)),
            None => next
                .record(AgentMessage::system(
                    AgentRole::Behavioral,
                    "Behavioral assessment completed. Transitioning to coding phase.",
                ))
                .advance(Phase::Behavioral)?
                .record(AgentMessage::new(
                    AgentRole::Coding,
                    EventCategory::Question,
                    format!("Coding challenge: {}", self.problem.title),
                )),
        };

        state.session = next;
        state.responses.push(CollectedResponse {
            question,
            answer: answer.to_string(),
            analysis: analysis.clone(),
        });
        if next_question.is_none() {
            state.behavioral = BehavioralSummary::from_responses(&state.responses);
        }

        Ok(ResponseOutcome {
            analysis,
            next_question,
        })
    }

    /// Runs `code` against the challenge's test cases.
    pub async fn run_tests(&self, language: &str, code: &str) -> Result<CodingResult> {
        {
            let state = self.state.read().await;
            ensure_phase(&state.session, Phase::Coding)?;
            if !state.session.config().allows_language(language) {
                return Err(PanelError::validation(format!(
                    "Language '{language}' is not allowed for this interview"
                )));
            }
        }
        if code.trim().is_empty() {
            return Err(PanelError::validation("Code must not be empty"));
        }

        let _slot = self.acquire("execute code")?;

        let submission = CodeSubmission::for_problem(&self.problem, language, code);
        let result = self
            .call(
                "execute code",
                self.timeouts.execution(),
                self.services.executor.execute(&submission),
            )
            .await?;

        let mut state = self.state.write().await;
        ensure_phase(&state.session, Phase::Coding)?;
        state.session = state.session.record_all([
            AgentMessage::system(
                AgentRole::Coding,
                format!("Executing code in {} sandbox...", self.services.executor.name()),
            ),
            AgentMessage::new(
                AgentRole::Coding,
                EventCategory::Result,
                format!(
                    "Code execution completed: {}/{} tests passed ({:.1}%)",
                    result.passed, result.total, result.pass_rate
                ),
            ),
        ]);
        state.last_result = Some(result.clone());
        Ok(result)
    }

    /// Submits the last test run and moves on to analysis.
    ///
    /// Fails with `Busy` while a test run is still pending.
    pub async fn submit_solution(&self) -> Result<CodingResult> {
        let _slot = self.acquire("submit solution")?;
        let mut state = self.state.write().await;
        ensure_phase(&state.session, Phase::Coding)?;
        let result = state.last_result.clone().ok_or_else(|| {
            PanelError::validation("Run the tests at least once before submitting")
        })?;

        state.session = state
            .session
            .record(AgentMessage::system(
                AgentRole::Coding,
                "Coding assessment completed. Proceeding to analysis phase.",
            ))
            .advance(Phase::Coding)?;
        Ok(result)
    }

    /// Scores the session and moves on to feedback.
    pub async fn analyze(&self) -> Result<ScoreRecord> {
        let _slot = self.acquire("score session")?;

        let context = {
            let mut state = self.state.write().await;
            ensure_phase(&state.session, Phase::Analysis)?;
            if state.behavioral.is_none() {
                state.behavioral = BehavioralSummary::from_responses(&state.responses);
            }
            // The scorer sees the log as it will read once the steps commit.
            let stepped = state.session.record_all(analysis_steps());
            ScoringContext {
                session_id: stepped.id().to_string(),
                config: stepped.config().clone(),
                events: stepped.events().iter().cloned().collect(),
                behavioral: state.behavioral.clone(),
                coding: state.last_result.clone(),
            }
        };

        let update = self
            .call(
                "score session",
                self.timeouts.scoring(),
                self.services.scorer.score(&context),
            )
            .await?;

        let mut state = self.state.write().await;
        ensure_phase(&state.session, Phase::Analysis)?;
        let scored = state
            .session
            .record_all(analysis_steps())
            .update_scores(&update)?;
        let overall = scored.scores().overall();
        state.session = scored
            .record(AgentMessage::new(
                AgentRole::Analysis,
                EventCategory::Result,
                format!("Analysis complete. Overall score: {overall}/100"),
            ))
            .advance(Phase::Analysis)?;
        Ok(state.session.scores())
    }

    /// Completes the feedback phase and produces the report.
    ///
    /// The session becomes terminal and its clock stops. A configured report
    /// archive failing to save is logged, not returned.
    pub async fn finish(&self) -> Result<InterviewReport> {
        let report = {
            let mut state = self.state.write().await;
            ensure_phase(&state.session, Phase::Feedback)?;
            let completed = state
                .session
                .record_all([
                    AgentMessage::system(
                        AgentRole::Feedback,
                        "Generating personalized feedback and recommendations...",
                    ),
                    AgentMessage::new(
                        AgentRole::Feedback,
                        EventCategory::Feedback,
                        "Comprehensive feedback report generated",
                    ),
                ])
                .advance(Phase::Feedback)?;

            let report = InterviewReport::build(
                &completed,
                state.behavioral.as_ref(),
                state.last_result.as_ref(),
            );
            state.session = completed;
            state.report = Some(report.clone());
            report
        };
        self.cancel.cancel();

        if let Some(reports) = &self.reports {
            if let Err(e) = reports.save(&report).await {
                tracing::warn!(session_id = %report.session_id, error = %e, "Failed to archive report");
            }
        }
        Ok(report)
    }

    /// Ends the interview early and stops the clock.
    ///
    /// Pending external calls resolve with `PanelError::Cancelled`. Ending an
    /// already terminal session changes nothing.
    pub async fn end(&self) -> Session {
        self.cancel.cancel();
        let mut state = self.state.write().await;
        state.session = state.session.end();
        state.session.clone()
    }

    fn acquire(&self, operation: &str) -> Result<InFlight<'_>> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return Err(PanelError::Busy(operation.to_string()));
        }
        Ok(InFlight(&self.in_flight))
    }

    /// Bounds `call` by `limit` and by the session's cancellation.
    async fn call<T>(
        &self,
        operation: &str,
        limit: Duration,
        call: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(PanelError::Cancelled(operation.to_string())),
            outcome = tokio::time::timeout(limit, call) => match outcome {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!(operation, limit_secs = limit.as_secs(), "External call timed out");
                    Err(PanelError::timeout(operation, limit))
                }
            },
        }
    }
}

impl Drop for InterviewRunner {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

fn question_event(question: &BehavioralQuestion) -> AgentMessage {
    AgentMessage::new(AgentRole::Behavioral, EventCategory::Question, question.prompt.clone())
}

fn ensure_phase(session: &Session, phase: Phase) -> Result<()> {
    match session.current_phase() {
        None => Err(PanelError::SessionTerminal),
        Some(current) if current == phase => Ok(()),
        Some(current) => Err(PanelError::invalid_transition(current, phase)),
    }
}

fn spawn_clock(state: Arc<RwLock<RunnerState>>, cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(TICK);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    let mut state = state.write().await;
                    if state.session.is_terminal() {
                        break;
                    }
                    state.session = state.session.tick();
                }
            }
        }
        tracing::debug!("Session clock stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_phase() {
        let session = Session::start(InterviewConfig::default()).unwrap();
        assert!(ensure_phase(&session, Phase::Introduction).is_ok());

        let err = ensure_phase(&session, Phase::Coding).unwrap_err();
        assert_eq!(
            err,
            PanelError::invalid_transition("introduction", "coding")
        );

        assert_eq!(
            ensure_phase(&session.end(), Phase::Introduction).unwrap_err(),
            PanelError::SessionTerminal
        );
    }

    #[test]
    fn test_in_flight_slot_is_released_on_drop() {
        let flag = AtomicBool::new(true);
        drop(InFlight(&flag));
        assert!(!flag.load(Ordering::SeqCst));
    }
}
