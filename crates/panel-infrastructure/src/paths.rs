//! Unified path management for panel configuration and data files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/panel/             # Config directory
//! └── config.toml              # Application configuration
//!
//! ~/.local/share/panel/        # Data directory
//! └── reports/                 # Archived interview reports
//!     └── <session_id>.toml
//! ```
//!
//! A base directory override replaces both roots, which keeps tests and
//! portable installs self-contained.

use panel_core::PanelError;
use std::path::PathBuf;
use thiserror::Error;

const APP_DIR: &str = "panel";

/// Errors that can occur during path resolution.
#[derive(Debug, Error)]
pub enum PathError {
    /// Platform directory could not be determined.
    #[error("Cannot find {0} directory")]
    DirNotFound(&'static str),
}

impl From<PathError> for PanelError {
    fn from(e: PathError) -> Self {
        PanelError::config(e.to_string())
    }
}

/// Resolves panel's files, optionally under a fixed base directory.
#[derive(Debug, Clone, Default)]
pub struct PanelPaths {
    base_dir: Option<PathBuf>,
}

impl PanelPaths {
    /// Creates a resolver. `None` uses the platform config and data directories.
    pub fn new(base_dir: Option<PathBuf>) -> Self {
        Self { base_dir }
    }

    /// Returns the panel configuration directory (e.g. `~/.config/panel/`).
    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base_dir {
            Some(base) => Ok(base.join("config")),
            None => dirs::config_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or(PathError::DirNotFound("config")),
        }
    }

    /// Returns the panel data directory (e.g. `~/.local/share/panel/`).
    pub fn data_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base_dir {
            Some(base) => Ok(base.join("data")),
            None => dirs::data_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or(PathError::DirNotFound("data")),
        }
    }

    /// Returns the path to `config.toml`.
    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    /// Returns the report archive directory.
    pub fn reports_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.data_dir()?.join("reports"))
    }
}
