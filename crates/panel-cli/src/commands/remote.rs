//! Commands against the orchestration service.

use anyhow::{Context, Result};
use colored::{ColoredString, Colorize};
use panel_application::RemoteSession;
use panel_core::assessment::CodeExecutor;
use panel_core::config::InterviewConfig;
use panel_core::settings::AppConfig;
use panel_core::wire::{HealthStatus, ServerFrame, ServerMessage};
use panel_interaction::{ApiClient, Judge0Executor, ReconnectPolicy};

pub async fn health(settings: &AppConfig) -> Result<()> {
    let api = ApiClient::from_settings(&settings.api)?;
    let report = api.health_check().await;
    let status = match report.status {
        HealthStatus::Healthy => "healthy".green(),
        HealthStatus::Unhealthy => "unhealthy".yellow(),
        HealthStatus::Unreachable => "unreachable".red(),
    };
    println!("{:<14} {} ({})", "API", status, api.base_url());
    if let Some(services) = &report.services {
        println!("{}", serde_json::to_string_pretty(services)?.bright_black());
    }

    let sandbox = Judge0Executor::new(&settings.judge0);
    let sandbox_status = if sandbox.health_check().await {
        "reachable".green()
    } else {
        "unreachable".red()
    };
    println!("{:<14} {} ({})", "Judge0", sandbox_status, settings.judge0.base_url);
    Ok(())
}

pub async fn start(settings: &AppConfig, interview: &InterviewConfig) -> Result<()> {
    let api = ApiClient::from_settings(&settings.api)?;
    let session = RemoteSession::start(
        api,
        interview,
        ReconnectPolicy::from(&settings.reconnect),
        settings.event_log.capacity,
    )
    .await
    .context("Failed to start interview")?;

    println!("{} {}", "Session".bold(), session.session_id());
    for event in session.events().iter() {
        println!("{} {}", sender_label(&event.sender.to_string()), event.content);
    }
    if session.is_connected() {
        println!(
            "{}",
            format!("Follow it with: panel watch {}", session.session_id()).bright_black()
        );
    } else {
        println!("{}", "Session channel unavailable; REST commands still work.".yellow());
    }
    Ok(())
}

pub async fn status(settings: &AppConfig, session_id: &str) -> Result<()> {
    let api = ApiClient::from_settings(&settings.api)?;
    let status = api.interview_status(session_id).await?;

    println!("{} {}", "Session".bold(), status.session_id);
    println!("  status    {}", status.status);
    println!(
        "  phase     {}",
        status.current_phase.as_deref().unwrap_or("-")
    );
    println!("  messages  {}", status.message_count);
    let scores = &status.scores;
    println!(
        "  scores    culture {} / communication {} / problem solving {} / technical {} / overall {}",
        scores.culture, scores.communication, scores.problem_solving, scores.technical, scores.overall
    );
    Ok(())
}

pub async fn end(settings: &AppConfig, session_id: &str) -> Result<()> {
    let api = ApiClient::from_settings(&settings.api)?;
    let ended = api.end_interview(session_id).await?;

    println!("{} {} {}", "Session".bold(), ended.session_id, ended.status);
    println!("{}", serde_json::to_string_pretty(&ended.report)?);
    Ok(())
}

/// Prints agent messages until the service closes the channel or Ctrl-C.
pub async fn watch(settings: &AppConfig, session_id: &str) -> Result<()> {
    let api = ApiClient::from_settings(&settings.api)?;
    let mut session = RemoteSession::attach(
        api,
        session_id,
        ReconnectPolicy::from(&settings.reconnect),
        settings.event_log.capacity,
    )
    .await
    .with_context(|| format!("Failed to attach to session {session_id}"))?;
    println!("{}", format!("Watching {session_id} (Ctrl-C to stop)").bright_black());

    loop {
        let frame = tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            frame = session.next_frame() => frame,
        };

        match frame {
            Ok(Some(ServerFrame::Message(message))) => print_message(&message),
            Ok(Some(ServerFrame::Error { error })) => eprintln!("{}", error.red()),
            Ok(None) => {
                println!("{}", "Session channel closed.".bright_black());
                break;
            }
            Err(e) if e.is_retryable() => {
                tracing::warn!(error = %e, "Session channel dropped, reconnecting");
                session.reconnect().await?;
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

fn print_message(message: &ServerMessage) {
    println!(
        "{} {} {}",
        message.timestamp.format("%H:%M:%S").to_string().bright_black(),
        sender_label(&message.sender),
        message.content
    );
}

pub(super) fn sender_label(sender: &str) -> ColoredString {
    let label = format!("[{sender}]");
    match sender {
        "CoordinatorAgent" => label.bright_magenta(),
        "BehavioralAgent" => label.bright_blue(),
        "CodingAgent" => label.bright_cyan(),
        "AnalysisAgent" => label.bright_yellow(),
        "FeedbackAgent" => label.bright_green(),
        _ => label.normal(),
    }
}
