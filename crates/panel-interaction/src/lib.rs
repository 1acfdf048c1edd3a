//! Outbound adapters: the orchestration service's REST API and session
//! channel, the Judge0 sandbox, and an LLM-backed assessor.

pub mod api_client;
pub mod channel;
mod http;
pub mod judge0;
pub mod llm_assessor;

pub use api_client::ApiClient;
pub use channel::{ReconnectPolicy, SessionChannel};
pub use judge0::Judge0Executor;
pub use llm_assessor::LlmAssessor;
