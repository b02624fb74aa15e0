//! Error types for Conductor.

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Completion provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Context error: {0}")]
    Context(#[from] ContextError),

    #[error("Task error: {0}")]
    Task(#[from] TaskError),

    #[error("Connector error: {0}")]
    Connector(#[from] ConnectorError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Completion provider errors.
///
/// Callers treat a transport failure and unusable output identically: both
/// trigger the documented fallbacks.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Provider {provider} returned HTTP {status}: {body}")]
    Status {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("Provider {provider} returned no content")]
    MissingContent { provider: String },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Context store errors.
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error("Importance {importance} out of range [0, 1] for context item {id}")]
    ImportanceOutOfRange { id: String, importance: f64 },
}

/// Task-level errors, recovered at task granularity by the dispatcher.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("No worker registered for capability {capability}")]
    UnknownCapability { capability: String },

    #[error("Task {task_id} execution failed: {reason}")]
    ExecutionFailed { task_id: String, reason: String },

    #[error("Task {id} cannot transition from {from} to {to}")]
    InvalidTransition { id: String, from: String, to: String },
}

/// Platform connector errors.
#[derive(Debug, thiserror::Error)]
pub enum ConnectorError {
    #[error("Connector {name} failed to connect: {reason}")]
    ConnectFailed { name: String, reason: String },

    #[error("Failed to send message via connector {name}: {reason}")]
    SendFailed { name: String, reason: String },

    #[error("Failed to fetch history from connector {name}: {reason}")]
    HistoryFailed { name: String, reason: String },
}

/// Result type alias for the orchestrator.
pub type Result<T> = std::result::Result<T, Error>;
