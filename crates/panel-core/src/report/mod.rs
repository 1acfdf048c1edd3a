//! Interview reports.
//!
//! # Module Structure
//!
//! - `model`: `InterviewReport`, built from a finished session
//! - `repository`: repository trait for report persistence

mod model;
mod repository;

pub use model::{DimensionBand, InterviewReport};
pub use repository::ReportRepository;
