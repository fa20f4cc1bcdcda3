//! Unified error type for the sync pipeline and read API.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// How a consumer-loop failure should be handled.
///
/// `Transient` failures unsubscribe, back off and resume; `Poison` failures
/// are quarantined (logged, counted, offset advances); `Fatal` failures
/// stop the consumer and take the process down with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    Transient,
    Poison,
    Fatal,
}

/// Unified error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("kafka error: {0}")]
    Kafka(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("person not found in pdl: {0}")]
    PersonNotFound(String),

    #[error("upstream error: {0}")]
    Upstream(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn kafka(msg: impl Into<String>) -> Self {
        Self::Kafka(msg.into())
    }

    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn person_not_found(msg: impl Into<String>) -> Self {
        Self::PersonNotFound(msg.into())
    }

    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::Upstream(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Classify this error for consumer-loop recovery.
    ///
    /// Malformed or invalid records must not stall a topic, so they are
    /// poison rather than transient. `PersonNotFound` only reaches the loop
    /// in production clusters, where it is an intentional fail-fast.
    pub fn classify(&self) -> FailureClass {
        match self {
            Self::Deserialization(_) | Self::Validation(_) => FailureClass::Poison,
            Self::PersonNotFound(_) => FailureClass::Fatal,
            _ => FailureClass::Transient,
        }
    }
}
