//! TOML-based ReportRepository implementation

use crate::paths::PanelPaths;
use crate::storage::AtomicTomlFile;
use async_trait::async_trait;
use panel_core::report::{InterviewReport, ReportRepository};
use panel_core::{PanelError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Stores each report as `<session_id>.toml` in a single directory.
///
/// ```text
/// reports/
/// ├── 5f0c...e1.toml
/// └── 9a7b...42.toml
/// ```
#[derive(Debug, Clone)]
pub struct TomlReportRepository {
    reports_dir: PathBuf,
}

impl TomlReportRepository {
    /// Creates a repository rooted at `reports_dir`, creating it if needed.
    pub fn new(reports_dir: impl AsRef<Path>) -> Result<Self> {
        let reports_dir = reports_dir.as_ref().to_path_buf();
        fs::create_dir_all(&reports_dir)?;
        Ok(Self { reports_dir })
    }

    /// Creates a repository at the default data location.
    pub fn default_location() -> Result<Self> {
        Self::new(PanelPaths::default().reports_dir()?)
    }

    pub fn reports_dir(&self) -> &Path {
        &self.reports_dir
    }

    fn report_file(&self, session_id: &str) -> Result<AtomicTomlFile<InterviewReport>> {
        let valid = !session_id.is_empty()
            && session_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(PanelError::validation(format!(
                "invalid session id for report file: '{session_id}'"
            )));
        }
        Ok(AtomicTomlFile::new(
            self.reports_dir.join(format!("{session_id}.toml")),
        ))
    }
}

#[async_trait]
impl ReportRepository for TomlReportRepository {
    async fn find_by_id(&self, session_id: &str) -> Result<Option<InterviewReport>> {
        Ok(self.report_file(session_id)?.load()?)
    }

    async fn save(&self, report: &InterviewReport) -> Result<()> {
        self.report_file(&report.session_id)?.save(report)?;
        tracing::info!(session_id = %report.session_id, "Report archived");
        Ok(())
    }

    async fn delete(&self, session_id: &str) -> Result<()> {
        self.report_file(session_id)?.remove()?;
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<InterviewReport>> {
        let mut reports = Vec::new();

        for entry in fs::read_dir(&self.reports_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("toml") {
                continue;
            }

            match AtomicTomlFile::<InterviewReport>::new(&path).load() {
                Ok(Some(report)) => reports.push(report),
                Ok(None) => {}
                Err(e) => {
                    // One unreadable file should not hide the rest
                    tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable report");
                }
            }
        }

        reports.sort_by(|a, b| b.generated_at.cmp(&a.generated_at));
        Ok(reports)
    }
}
