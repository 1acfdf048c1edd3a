//! Report repository trait.

use super::model::InterviewReport;
use crate::error::Result;
use async_trait::async_trait;

/// An abstract archive of finished interview reports.
///
/// Decouples the runner from the storage mechanism (TOML files, remote API).
#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Finds a report by session ID.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(report))`: Report found
    /// - `Ok(None)`: No report for this session
    /// - `Err(_)`: Error occurred during retrieval
    async fn find_by_id(&self, session_id: &str) -> Result<Option<InterviewReport>>;

    /// Saves a report, replacing any previous report for the same session.
    async fn save(&self, report: &InterviewReport) -> Result<()>;

    /// Deletes a report. Deleting a missing report is not an error.
    async fn delete(&self, session_id: &str) -> Result<()>;

    /// Lists every archived report, newest first.
    async fn list_all(&self) -> Result<Vec<InterviewReport>>;
}
