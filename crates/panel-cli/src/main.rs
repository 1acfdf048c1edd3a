use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use panel_core::config::{Difficulty, InterviewConfig};
use std::path::PathBuf;

mod commands;
mod logging;

#[derive(Parser)]
#[command(name = "panel")]
#[command(about = "PANEL - multi-agent technical interview sessions", long_about = None)]
struct Cli {
    /// Config file to use instead of ~/.config/panel/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Write logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the orchestration service and the code sandbox
    Health,
    /// Start an interview on the orchestration service
    Start(InterviewArgs),
    /// Show the status of a remote interview
    Status { session_id: String },
    /// End a remote interview and print its report
    End { session_id: String },
    /// Stream agent messages of a remote interview
    Watch { session_id: String },
    /// Run an interview locally in this terminal
    Interview(InterviewArgs),
    /// List the coding challenges
    Problems,
    /// Manage config.toml
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Browse archived interview reports
    Reports {
        #[command(subcommand)]
        action: ReportsAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a default config file if none exists
    Init,
    /// Print the effective configuration (secrets masked)
    Show,
    /// Print the config file location
    Path,
}

#[derive(Subcommand)]
enum ReportsAction {
    /// List archived reports, newest first
    List,
    /// Print one report
    Show { session_id: String },
}

/// Overrides for the `[interview]` defaults.
#[derive(Args)]
struct InterviewArgs {
    /// Role title, e.g. "Backend Software Engineer"
    #[arg(long)]
    role: Option<String>,
    /// easy, medium or hard
    #[arg(long)]
    difficulty: Option<Difficulty>,
    /// Comma-separated languages, e.g. python,java
    #[arg(long, value_delimiter = ',')]
    languages: Vec<String>,
    /// Planned duration in minutes
    #[arg(long)]
    minutes: Option<u32>,
    /// Enable realtime hints
    #[arg(long)]
    hints: bool,
}

impl InterviewArgs {
    fn apply(self, mut config: InterviewConfig) -> InterviewConfig {
        if let Some(role) = self.role {
            config.role = role;
        }
        if let Some(difficulty) = self.difficulty {
            config.difficulty = difficulty;
        }
        if !self.languages.is_empty() {
            config.languages_allowed = self.languages;
        }
        if let Some(minutes) = self.minutes {
            config.duration_minutes = minutes;
        }
        config.realtime_hints |= self.hints;
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.json_logs);

    let configs = commands::config_service(cli.config)?;

    match cli.command {
        Commands::Health => commands::remote::health(&configs.load()?).await?,
        Commands::Start(args) => {
            let settings = configs.load()?;
            let interview = args.apply(settings.interview.clone());
            commands::remote::start(&settings, &interview).await?
        }
        Commands::Status { session_id } => {
            commands::remote::status(&configs.load()?, &session_id).await?
        }
        Commands::End { session_id } => commands::remote::end(&configs.load()?, &session_id).await?,
        Commands::Watch { session_id } => {
            commands::remote::watch(&configs.load()?, &session_id).await?
        }
        Commands::Interview(args) => {
            let settings = configs.load()?;
            let interview = args.apply(settings.interview.clone());
            commands::interview::run(&settings, interview).await?
        }
        Commands::Problems => commands::problems::list(),
        Commands::Config { action } => match action {
            ConfigAction::Init => commands::config::init(&configs)?,
            ConfigAction::Show => commands::config::show(&configs)?,
            ConfigAction::Path => println!("{}", configs.path().display()),
        },
        Commands::Reports { action } => match action {
            ReportsAction::List => commands::reports::list().await?,
            ReportsAction::Show { session_id } => commands::reports::show(&session_id).await?,
        },
    }

    Ok(())
}
