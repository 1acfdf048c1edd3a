//! Configuration service.
//!
//! Loads `AppConfig` from `~/.config/panel/config.toml`, layers environment
//! overrides on top, and caches the result.

use crate::paths::PanelPaths;
use crate::storage::AtomicTomlFile;
use panel_core::settings::AppConfig;
use panel_core::{PanelError, Result};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Environment variables that override file settings.
pub const ENV_OVERRIDES: &[&str] = &[
    "PANEL_API_URL",
    "PANEL_WS_URL",
    "JUDGE0_API_URL",
    "JUDGE0_API_KEY",
    "OPENAI_API_KEY",
    "OPENAI_MODEL_NAME",
    "OPENAI_BASE_URL",
];

/// Loads and caches the application configuration.
///
/// The cache holds the effective configuration (file plus environment). Saving
/// writes exactly what it is given, so secrets that only exist in the
/// environment never land on disk unless the caller put them there.
#[derive(Debug, Clone)]
pub struct ConfigService {
    file: Arc<AtomicTomlFile<AppConfig>>,
    cache: Arc<RwLock<Option<AppConfig>>>,
    use_env: bool,
}

impl ConfigService {
    /// Uses the default location.
    pub fn new() -> Result<Self> {
        Ok(Self::with_path(PanelPaths::default().config_file()?))
    }

    /// Uses an explicit config file, with environment overrides enabled.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            file: Arc::new(AtomicTomlFile::new(path)),
            cache: Arc::new(RwLock::new(None)),
            use_env: true,
        }
    }

    /// Disables environment overrides (useful for `config show --file-only`).
    pub fn without_env(mut self) -> Self {
        self.use_env = false;
        self
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Returns the effective configuration, loading it on first access.
    ///
    /// # Errors
    ///
    /// Fails if the file exists but cannot be parsed, or if the
    /// `[interview]` defaults are invalid.
    pub fn load(&self) -> Result<AppConfig> {
        {
            let cached = self
                .cache
                .read()
                .map_err(|_| PanelError::internal("config cache lock poisoned"))?;
            if let Some(config) = cached.as_ref() {
                return Ok(config.clone());
            }
        }

        let mut config = self.file.load()?.unwrap_or_default();
        if self.use_env {
            apply_env_overrides(&mut config, |key| std::env::var(key).ok());
        }
        config.interview.validate()?;
        tracing::debug!(path = %self.path().display(), "Loaded configuration");

        let mut cache = self
            .cache
            .write()
            .map_err(|_| PanelError::internal("config cache lock poisoned"))?;
        *cache = Some(config.clone());
        Ok(config)
    }

    /// Writes `config` to the file and drops the cache.
    pub fn save(&self, config: &AppConfig) -> Result<()> {
        config.interview.validate()?;
        self.file.save(config)?;
        self.invalidate_cache();
        tracing::info!(path = %self.path().display(), "Configuration saved");
        Ok(())
    }

    /// Locked read-modify-write of the file contents (without environment overrides).
    pub fn update<F>(&self, f: F) -> Result<AppConfig>
    where
        F: FnOnce(&mut AppConfig),
    {
        let updated = self.file.update(AppConfig::default(), |config| {
            f(config);
            Ok(())
        })?;
        self.invalidate_cache();
        Ok(updated)
    }

    /// Writes a default config file if none exists. Returns whether one was created.
    pub fn init(&self) -> Result<bool> {
        if self.file.exists() {
            return Ok(false);
        }
        self.file.save(&AppConfig::default())?;
        tracing::info!(path = %self.path().display(), "Created default configuration");
        Ok(true)
    }

    /// Forces a reload on next access.
    pub fn invalidate_cache(&self) {
        if let Ok(mut cache) = self.cache.write() {
            *cache = None;
        }
    }
}

/// Applies environment overrides, reading variables through `lookup`.
///
/// Empty values are ignored.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(v) = get("PANEL_API_URL") {
        config.api.base_url = v;
    }
    if let Some(v) = get("PANEL_WS_URL") {
        config.api.ws_url = v;
    }
    if let Some(v) = get("JUDGE0_API_URL") {
        config.judge0.base_url = v;
    }
    if let Some(v) = get("JUDGE0_API_KEY") {
        config.judge0.api_key = Some(v);
    }
    if let Some(v) = get("OPENAI_API_KEY") {
        config.llm.api_key = Some(v);
    }
    if let Some(v) = get("OPENAI_MODEL_NAME") {
        config.llm.model = v;
    }
    if let Some(v) = get("OPENAI_BASE_URL") {
        config.llm.base_url = v;
    }
}
