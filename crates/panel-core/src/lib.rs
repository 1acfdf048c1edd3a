//! Core domain of the PANEL interview engine.
//!
//! Everything here is pure: phases and their controller, the immutable
//! session value, the event log, score aggregation, the problem catalog and
//! question bank, assessment service contracts, and the wire protocol
//! spoken with the orchestration service.

pub mod assessment;
pub mod config;
pub mod error;
pub mod event;
pub mod phase;
pub mod problem;
pub mod question;
pub mod report;
pub mod score;
pub mod session;
pub mod settings;
pub mod wire;

// Re-export common error type
pub use error::{PanelError, Result};
