//! Error types for QuoteFlow.

use uuid::Uuid;

/// Top-level error type for the service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Navigation error: {0}")]
    Navigation(#[from] NavigationError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Submission error: {0}")]
    Submission(#[from] SubmissionError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Chatbot error: {0}")]
    Chatbot(#[from] ChatbotError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Question graph construction and lookup errors.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Unknown step id: {0}")]
    UnknownStep(String),

    #[error("Duplicate step id: {0}")]
    DuplicateStep(String),

    #[error("Step {from} references missing step {to}")]
    DanglingEdge { from: String, to: String },

    #[error("Cycle reachable from start, through step {0}")]
    CycleDetected(String),

    #[error("Graph has no {0} step")]
    MissingEntryPoint(String),
}

/// Step navigation errors. All of these are recoverable: the caller
/// surfaces a fallback rather than tearing the session down.
#[derive(Debug, thiserror::Error)]
pub enum NavigationError {
    #[error("Unknown step id: {0}")]
    UnknownStep(String),

    #[error("No route from step {step} for answer {answer:?}")]
    NoRoute { step: String, answer: String },

    #[error("Step {0} is terminal, cannot navigate forward")]
    TerminalStep(String),
}

/// Session lifecycle errors.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session {0} not found")]
    NotFound(Uuid),
}

/// Per-field answer validation errors. Navigation is blocked until
/// the step's answer validates.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Field {field}: {message}")]
    Field { field: String, message: String },

    #[error("Answer {value:?} is not one of the step's options")]
    UnknownOption { value: String },

    #[error("Value {value} outside slider range {min}..={max}")]
    OutOfRange { value: f64, min: f64, max: f64 },

    #[error("Answer kind does not match step kind {expected}")]
    KindMismatch { expected: String },

    #[error("Answer is required for this step")]
    Missing,
}

/// Submission dispatch errors. Logged, never surfaced to the user.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("Submission endpoint returned status {0}")]
    BadStatus(u16),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// LLM provider errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("Authentication failed for provider {provider}")]
    AuthFailed { provider: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Chatbot tool-dispatch errors.
#[derive(Debug, thiserror::Error)]
pub enum ChatbotError {
    #[error("Tool {name} not found in manifest")]
    ToolNotFound { name: String },

    #[error("Invalid parameters for tool {name}: {reason}")]
    InvalidParameters { name: String, reason: String },

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
}

/// Result type alias for the service.
pub type Result<T> = std::result::Result<T, Error>;
