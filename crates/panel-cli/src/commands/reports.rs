use anyhow::{Result, bail};
use colored::Colorize;
use panel_core::report::{InterviewReport, ReportRepository};
use panel_core::score::{HireRecommendation, ScoreBand};
use panel_infrastructure::TomlReportRepository;

pub async fn list() -> Result<()> {
    let repository = TomlReportRepository::default_location()?;
    let reports = repository.list_all().await?;
    if reports.is_empty() {
        println!("{}", "No archived reports.".bright_black());
        return Ok(());
    }

    for report in reports {
        println!(
            "{}  {}  {:<28} {:>3}/100  {}",
            report.generated_at.format("%Y-%m-%d %H:%M"),
            report.session_id.bright_black(),
            report.role,
            report.overall_score,
            recommendation(report.recommendation)
        );
    }
    Ok(())
}

pub async fn show(session_id: &str) -> Result<()> {
    let repository = TomlReportRepository::default_location()?;
    match repository.find_by_id(session_id).await? {
        Some(report) => {
            print_report(&report);
            Ok(())
        }
        None => bail!("No report archived for session {session_id}"),
    }
}

pub fn print_report(report: &InterviewReport) {
    println!("{}", "=== Interview Report ===".bright_magenta().bold());
    println!(
        "{} ({}, {} of {} min planned)",
        report.role.bold(),
        report.difficulty,
        format_elapsed(report.elapsed_secs),
        report.planned_minutes
    );
    println!(
        "Overall: {}/100  {}",
        report.overall_score.to_string().bold(),
        recommendation(report.recommendation)
    );
    println!("{}", report.recommendation_detail.bright_black());
    println!();

    for band in &report.bands {
        let label = band.band.to_string();
        let label = match band.band {
            ScoreBand::Strong => label.green(),
            ScoreBand::Developing => label.yellow(),
            ScoreBand::NeedsImprovement => label.red(),
        };
        println!("  {:<16} {:>3}  {}", band.dimension, band.score, label);
    }

    if let Some(summary) = &report.coding_summary {
        println!();
        println!("Coding: {summary}");
    }
    print_list("Strengths", &report.strengths);
    print_list("Areas for improvement", &report.improvements);

    println!();
    println!(
        "{}",
        format!(
            "{} behavioral / {} coding interactions, {} events",
            report.behavioral_interactions, report.coding_interactions, report.event_count
        )
        .bright_black()
    );
}

fn print_list(title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!();
    println!("{}", title.bold());
    for item in items {
        println!("  - {item}");
    }
}

fn recommendation(recommendation: HireRecommendation) -> colored::ColoredString {
    let text = recommendation.to_string();
    if recommendation.is_hire() {
        text.green().bold()
    } else {
        text.red().bold()
    }
}

pub fn format_elapsed(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}
