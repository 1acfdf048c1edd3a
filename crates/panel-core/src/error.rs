//! Error types for the Panel interview engine.

use thiserror::Error;

/// A shared error type for the entire Panel workspace.
///
/// Adapters (HTTP, WebSocket, storage) translate their native errors into
/// these variants through the constructor helpers below, so callers only ever
/// match on one enum.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PanelError {
    /// A phase owner tried to advance a phase that is not the current one.
    #[error("Invalid phase transition: current phase is '{expected}', signal came from '{actual}'")]
    InvalidTransition { expected: String, actual: String },

    /// The session already completed its feedback phase or was ended.
    #[error("Session is terminal; start a new session to interview again")]
    SessionTerminal,

    /// Input rejected before reaching any service
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Another external request is already in flight for this session
    #[error("Request already in flight: {0}")]
    Busy(String),

    /// External call exceeded its deadline
    #[error("Operation '{operation}' timed out after {after_ms} ms")]
    Timeout { operation: String, after_ms: u64 },

    /// The session was ended while an operation was pending
    #[error("Operation cancelled: {0}")]
    Cancelled(String),

    /// Streaming channel is not connected
    #[error("Channel not connected: {0}")]
    NotConnected(String),

    /// Non-success HTTP status from a remote service
    #[error("HTTP {status}: {message}")]
    Http {
        status: u16,
        message: String,
        retryable: bool,
    },

    /// Connection-level failure (DNS, refused, reset, TLS)
    #[error("Transport error: {0}")]
    Transport(String),

    /// A remote assessment service returned something unusable
    #[error("Service error: {service} - {message}")]
    Service { service: String, message: String },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PanelError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates an InvalidTransition error
    pub fn invalid_transition(expected: impl ToString, actual: impl ToString) -> Self {
        Self::InvalidTransition {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a Timeout error from the elapsed budget
    pub fn timeout(operation: impl Into<String>, after: std::time::Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            after_ms: after.as_millis() as u64,
        }
    }

    /// Creates an Http error, marking 429 and 5xx gateway statuses retryable
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
            retryable: matches!(status, 429 | 500 | 502 | 503 | 504),
        }
    }

    /// Creates a Transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Creates a Service error
    pub fn service(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Service {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a phase-ordering error
    pub fn is_invalid_transition(&self) -> bool {
        matches!(self, Self::InvalidTransition { .. })
    }

    /// Check if this is a timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Check if this is a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Whether retrying the same request could succeed.
    ///
    /// Returns true for transport failures, timeouts and retryable HTTP statuses.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout { .. } => true,
            Self::Http { retryable, .. } => *retryable,
            _ => false,
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for PanelError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for PanelError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for PanelError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for PanelError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// Conversion from anyhow::Error (for adapters that bubble up context chains)
impl From<anyhow::Error> for PanelError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, PanelError>`.
pub type Result<T> = std::result::Result<T, PanelError>;
