//! Local interview in the terminal.
//!
//! Drives an `InterviewRunner` from a rustyline prompt. Agent events are
//! echoed as they are recorded, so the transcript reads the same way the
//! remote `watch` command shows it.

use std::borrow::Cow::{self, Borrowed, Owned};
use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use panel_application::{InterviewRunner, InterviewServices, RunnerOptions};
use panel_core::PanelError;
use panel_core::assessment::{CodingResult, ResponseAnalysis};
use panel_core::config::InterviewConfig;
use panel_core::problem::CodingProblem;
use panel_core::question::BehavioralQuestion;
use panel_core::score::ScoreRecord;
use panel_core::settings::AppConfig;
use panel_infrastructure::TomlReportRepository;
use panel_interaction::{Judge0Executor, LlmAssessor};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

use super::reports;
use super::remote::sender_label;

const COMMANDS: [&str; 5] = ["/run", "/submit", "/status", "/end", "/help"];

/// Line that terminates a multi-line code block.
const CODE_TERMINATOR: &str = ".";

/// Completion, highlighting and hints for slash commands.
#[derive(Clone)]
struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    fn new() -> Self {
        Self {
            commands: COMMANDS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];
        if !line.starts_with('/') {
            return Ok((0, vec![]));
        }

        let candidates = self
            .commands
            .iter()
            .filter(|cmd| cmd.starts_with(line))
            .map(|cmd| Pair {
                display: cmd.clone(),
                replacement: cmd.clone(),
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];
        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}

type Prompt = Editor<CliHelper, DefaultHistory>;

/// Prints events recorded since the last call.
struct Transcript {
    last_seq: u64,
}

impl Transcript {
    async fn flush(&mut self, runner: &InterviewRunner) {
        let session = runner.snapshot().await;
        let last_seq = self.last_seq;
        for event in session.events().iter().filter(|e| e.seq > last_seq) {
            println!(
                "{} {}",
                sender_label(&event.sender.to_string()),
                event.content
            );
            self.last_seq = event.seq;
        }
    }
}

pub async fn run(settings: &AppConfig, interview: InterviewConfig) -> Result<()> {
    let assessor = Arc::new(LlmAssessor::from_settings(&settings.llm)?);
    let services = InterviewServices {
        analyzer: assessor.clone(),
        executor: Arc::new(Judge0Executor::new(&settings.judge0)),
        scorer: assessor,
    };
    let options = RunnerOptions::from_settings(settings)
        .with_reports(Arc::new(TomlReportRepository::default_location()?));
    let languages = interview.languages_allowed.clone();
    let runner = InterviewRunner::start(interview, services, options)?;

    let mut rl = Prompt::new()?;
    rl.set_helper(Some(CliHelper::new()));
    let mut transcript = Transcript { last_seq: 0 };

    println!("{}", "=== PANEL interview ===".bright_magenta().bold());
    println!("{}", "Type /help for commands, Ctrl-D to leave.".bright_black());

    runner.begin().await?;
    transcript.flush(&runner).await;

    if !behavioral(&runner, &mut rl, &mut transcript).await? {
        return abandon(&runner).await;
    }
    print_challenge(runner.challenge(), &languages);
    if !coding(&runner, &mut rl, &mut transcript, &languages).await? {
        return abandon(&runner).await;
    }

    let Some(scores) = score(&runner, &mut rl).await? else {
        return abandon(&runner).await;
    };
    transcript.flush(&runner).await;
    println!();
    for (dimension, score) in scores.dimensions() {
        println!("  {dimension:<16} {score:>3}");
    }

    let report = runner.finish().await?;
    transcript.flush(&runner).await;
    println!();
    reports::print_report(&report);
    Ok(())
}

/// Collects answers until the question list runs out. Returns `false` when
/// the candidate leaves.
async fn behavioral(
    runner: &InterviewRunner,
    rl: &mut Prompt,
    transcript: &mut Transcript,
) -> Result<bool> {
    while let Some(question) = runner.current_question().await {
        print_competencies(&question);
        let Some(line) = read_line(rl, "answer> ")? else {
            return Ok(false);
        };

        match line.trim() {
            "" => continue,
            "/end" => return Ok(false),
            "/help" => print_help(),
            "/status" => print_status(runner).await,
            "/run" | "/submit" => {
                println!("{}", "The coding challenge comes after the questions.".yellow())
            }
            answer => match runner.submit_response(answer).await {
                Ok(outcome) => {
                    transcript.flush(runner).await;
                    print_analysis(&outcome.analysis);
                }
                Err(e) if recoverable(&e) => eprintln!("{}", e.to_string().red()),
                Err(e) => return Err(e.into()),
            },
        }
    }
    Ok(true)
}

/// Runs tests until the candidate submits. Returns `false` when the
/// candidate leaves.
async fn coding(
    runner: &InterviewRunner,
    rl: &mut Prompt,
    transcript: &mut Transcript,
    languages: &[String],
) -> Result<bool> {
    loop {
        let Some(line) = read_line(rl, "code> ")? else {
            return Ok(false);
        };
        let mut words = line.split_whitespace();

        match words.next() {
            None => continue,
            Some("/end") => return Ok(false),
            Some("/help") => print_help(),
            Some("/status") => print_status(runner).await,
            Some("/run") => {
                let language = words
                    .next()
                    .or_else(|| languages.first().map(String::as_str))
                    .unwrap_or("python")
                    .to_string();
                println!(
                    "{}",
                    format!("Enter {language} code, end with a line containing '{CODE_TERMINATOR}'")
                        .bright_black()
                );
                let Some(code) = read_code(rl)? else {
                    return Ok(false);
                };

                match runner.run_tests(&language, &code).await {
                    Ok(result) => {
                        transcript.flush(runner).await;
                        print_result(&result);
                    }
                    Err(e) if recoverable(&e) => eprintln!("{}", e.to_string().red()),
                    Err(e) => return Err(e.into()),
                }
            }
            Some("/submit") => match runner.submit_solution().await {
                Ok(result) => {
                    transcript.flush(runner).await;
                    println!("Submitted: {}", result.headline().bold());
                    return Ok(true);
                }
                Err(e) if recoverable(&e) => eprintln!("{}", e.to_string().red()),
                Err(e) => return Err(e.into()),
            },
            Some(_) => println!(
                "{}",
                "Use /run [language] to test your code, /submit when done.".yellow()
            ),
        }
    }
}

/// Scores the session, offering a retry while the scorer fails in a way
/// that may clear up. `None` when the candidate gives up.
async fn score(runner: &InterviewRunner, rl: &mut Prompt) -> Result<Option<ScoreRecord>> {
    loop {
        match runner.analyze().await {
            Ok(scores) => return Ok(Some(scores)),
            Err(e) if recoverable(&e) => {
                eprintln!("{}", format!("Scoring failed: {e}").red());
                let Some(line) = read_line(rl, "retry scoring? [Y/n] ")? else {
                    return Ok(None);
                };
                if !retry_confirmed(&line) {
                    return Ok(None);
                }
            }
            Err(e) => return Err(e.into()),
        }
    }
}

fn retry_confirmed(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "" | "y" | "yes")
}

async fn abandon(runner: &InterviewRunner) -> Result<()> {
    let session = runner.end().await;
    println!(
        "{}",
        format!(
            "Interview ended after {} ({} events).",
            reports::format_elapsed(session.elapsed_secs()),
            session.events().total_recorded()
        )
        .bright_black()
    );
    Ok(())
}

/// Errors the candidate can fix by trying again.
fn recoverable(error: &PanelError) -> bool {
    error.is_validation()
        || error.is_timeout()
        || error.is_retryable()
        || matches!(error, PanelError::Service { .. })
}

/// Reads one line. `None` means Ctrl-C or Ctrl-D.
fn read_line(rl: &mut Prompt, prompt: &str) -> Result<Option<String>> {
    match rl.readline(&prompt.bright_green().to_string()) {
        Ok(line) => {
            if !line.trim().is_empty() {
                rl.add_history_entry(line.as_str())?;
            }
            Ok(Some(line))
        }
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn read_code(rl: &mut Prompt) -> Result<Option<String>> {
    let mut code = String::new();
    loop {
        match rl.readline("... ") {
            Ok(line) if line.trim_end() == CODE_TERMINATOR => return Ok(Some(code)),
            Ok(line) => {
                code.push_str(&line);
                code.push('\n');
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => return Ok(None),
            Err(e) => return Err(e.into()),
        }
    }
}

fn print_help() {
    println!("{}", "Commands".bold());
    println!("  /run [language]  test code against the challenge's cases");
    println!("  /submit          submit the last tested solution");
    println!("  /status          phase, elapsed time and scores");
    println!("  /end             leave the interview");
}

async fn print_status(runner: &InterviewRunner) {
    let session = runner.snapshot().await;
    let phase = session
        .current_phase()
        .map(|phase| phase.title().to_string())
        .unwrap_or_else(|| session.status().to_string());
    println!(
        "{} {}  {} / {} min ({:.0}%)",
        "Phase".bold(),
        phase,
        session.elapsed_display(),
        session.config().duration_minutes,
        session.progress_percent()
    );
    let scores = session.scores();
    println!(
        "{}",
        format!(
            "culture {} / communication {} / problem solving {} / technical {} / overall {}",
            scores.culture(),
            scores.communication(),
            scores.problem_solving(),
            scores.technical(),
            scores.overall()
        )
        .bright_black()
    );
}

fn print_competencies(question: &BehavioralQuestion) {
    println!(
        "{}",
        format!("({}: {})", question.category, question.competencies.join(", ")).bright_black()
    );
}

fn print_analysis(analysis: &ResponseAnalysis) {
    println!(
        "{}",
        format!(
            "  {} words, STAR {:.0}%, {} competency",
            analysis.word_count,
            analysis.star_completeness * 100.0,
            analysis.competency
        )
        .bright_black()
    );
    for insight in &analysis.insights {
        println!("  {} {insight}", "+".green());
    }
    for area in &analysis.improvement_areas {
        println!("  {} {area}", "-".yellow());
    }
}

fn print_challenge(problem: &CodingProblem, languages: &[String]) {
    println!();
    println!("{}", problem.title.bold());
    println!("{}", problem.description);
    println!();
    println!("{}", problem.example.bright_black());
    println!(
        "{}",
        format!(
            "Languages: {}. {} test cases.",
            languages.join(", "),
            problem.test_cases.len()
        )
        .bright_black()
    );
}

fn print_result(result: &CodingResult) {
    for outcome in &result.results {
        let mark = if outcome.passed {
            "PASS".green()
        } else {
            "FAIL".red()
        };
        println!(
            "  {} case {} {} ({:.0} ms, {} KB)",
            mark, outcome.test_case, outcome.status, outcome.time_ms, outcome.memory_kb
        );
        if !outcome.passed && !outcome.output.is_empty() {
            println!("{}", format!("      got: {}", outcome.output.trim()).bright_black());
        }
    }
    if !result.stderr.is_empty() {
        eprintln!("{}", result.stderr.trim_end().red());
    }
}
