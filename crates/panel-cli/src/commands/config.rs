use anyhow::Result;
use colored::Colorize;
use panel_core::settings::AppConfig;
use panel_infrastructure::ConfigService;

pub fn init(configs: &ConfigService) -> Result<()> {
    if configs.init()? {
        println!("{} {}", "Created".green(), configs.path().display());
    } else {
        println!("{} {}", "Already exists:".yellow(), configs.path().display());
    }
    Ok(())
}

pub fn show(configs: &ConfigService) -> Result<()> {
    let config = masked(configs.load()?);
    println!("{}", format!("# {}", configs.path().display()).bright_black());
    print!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

fn masked(mut config: AppConfig) -> AppConfig {
    config.judge0.api_key = config.judge0.api_key.as_deref().map(mask);
    config.llm.api_key = config.llm.api_key.as_deref().map(mask);
    config
}

/// Keeps the last four characters of a secret.
fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{tail}")
}
