pub mod config;
pub mod interview;
pub mod problems;
pub mod remote;
pub mod reports;

use anyhow::Result;
use panel_infrastructure::ConfigService;
use std::path::PathBuf;

/// The config service for `--config`, or the default location.
pub fn config_service(path: Option<PathBuf>) -> Result<ConfigService> {
    Ok(match path {
        Some(path) => ConfigService::with_path(path),
        None => ConfigService::new()?,
    })
}
