//! Application layer for PANEL.
//!
//! Use cases that coordinate the domain with the outbound adapters: the
//! local interview runner and the remote session hosted by the
//! orchestration service.

pub mod remote_session;
pub mod runner;

pub use remote_session::RemoteSession;
pub use runner::{InterviewRunner, InterviewServices, ResponseOutcome, RunnerOptions};
