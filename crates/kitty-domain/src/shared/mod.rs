use serde::{Deserialize, Serialize};

/// Error codes for structured error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Backend call boundary (1xxx)
    BackendUnavailable = 1001,
    BackendRejected = 1002,
    UnknownCommand = 1003,

    // Resource Not Found (2xxx)
    ProxyNotFound = 2001,
    RuleNotFound = 2002,
    SubscriptionNotFound = 2003,

    // Data & Persistence (4xxx)
    StorageError = 4001,
    SerializationError = 4004,

    // Infrastructure (5xxx)
    InfrastructureError = 5001,
    NetworkError = 5002,
    TimeoutError = 5003,

    // Validation (6xxx)
    ValidationError = 6001,
    InvalidInput = 6002,
}

impl ErrorCode {
    /// Get error code as integer
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Get error severity
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ErrorCode::BackendRejected | ErrorCode::NetworkError | ErrorCode::TimeoutError => {
                ErrorSeverity::Warning
            }

            ErrorCode::ProxyNotFound
            | ErrorCode::RuleNotFound
            | ErrorCode::SubscriptionNotFound
            | ErrorCode::ValidationError
            | ErrorCode::InvalidInput => ErrorSeverity::Info,

            ErrorCode::StorageError
            | ErrorCode::SerializationError
            | ErrorCode::UnknownCommand
            | ErrorCode::InfrastructureError => ErrorSeverity::Error,

            ErrorCode::BackendUnavailable => ErrorSeverity::Critical,
        }
    }

    /// Check if error is recoverable
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ErrorCode::BackendUnavailable | ErrorCode::NetworkError | ErrorCode::TimeoutError
        )
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Backend rejected call: {0}")]
    BackendRejected(String),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Infrastructure error: {0}")]
    Infrastructure(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl DomainError {
    /// Get error code
    pub fn code(&self) -> ErrorCode {
        match self {
            DomainError::BackendUnavailable(_) => ErrorCode::BackendUnavailable,
            DomainError::BackendRejected(_) => ErrorCode::BackendRejected,
            DomainError::UnknownCommand(_) => ErrorCode::UnknownCommand,
            DomainError::NotFound(_) => ErrorCode::ProxyNotFound,
            DomainError::Storage(_) => ErrorCode::StorageError,
            DomainError::Infrastructure(_) => ErrorCode::InfrastructureError,
            DomainError::Validation(_) => ErrorCode::ValidationError,
            DomainError::InvalidInput(_) => ErrorCode::InvalidInput,
            DomainError::Serialization(_) => ErrorCode::SerializationError,
            DomainError::Deserialization(_) => ErrorCode::SerializationError,
        }
    }

    /// Get error message
    pub fn message(&self) -> &str {
        match self {
            DomainError::BackendUnavailable(msg)
            | DomainError::BackendRejected(msg)
            | DomainError::UnknownCommand(msg)
            | DomainError::NotFound(msg)
            | DomainError::Storage(msg)
            | DomainError::Infrastructure(msg)
            | DomainError::Validation(msg)
            | DomainError::InvalidInput(msg)
            | DomainError::Serialization(msg)
            | DomainError::Deserialization(msg) => msg,
        }
    }

    /// Get error severity
    pub fn severity(&self) -> ErrorSeverity {
        self.code().severity()
    }

    /// Check if error is recoverable
    pub fn is_recoverable(&self) -> bool {
        self.code().is_recoverable()
    }

    /// Format error with code
    pub fn format_with_code(&self) -> String {
        format!("[{}] {}", self.code().code(), self)
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::Deserialization(err.to_string())
    }
}
