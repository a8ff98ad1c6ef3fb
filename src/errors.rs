//! Error types for registration operations
//!
//! Three families live here:
//! - [`RegistrationError`] - failures raised by the aggregate itself
//! - [`MessagingError`] - NATS transport failures while delivering events
//! - [`ConfigError`] - invalid configuration values
//!
//! Repository and service errors wrap these and live next to their traits.

use chrono::{DateTime, TimeDelta, Utc};
use thiserror::Error;

use crate::domain::{EmailError, ProfileError, RegistrationStatus};

/// Coarse classification of a [`RegistrationError`]
///
/// Callers use the kind to pick a surfacing strategy (HTTP status,
/// retry hint, etc.) without matching every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed input rejected before any state change
    Validation,

    /// Operation attempted too soon; carries remaining wait
    Throttle,

    /// Verification code expired; detection moves the aggregate to `Expired`
    Expiry,

    /// Attempt limit reached; the aggregate moved to `Expired`
    RateLimit,

    /// Wrong code on verification; the attempt counter was incremented
    PersistentMismatch,

    /// Operation not allowed in the current status
    StatusConflict,

    /// Entropy or hashing failure
    Internal,
}

/// Errors raised by the registration aggregate
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Invalid profile: {0}")]
    InvalidProfile(#[from] ProfileError),

    #[error("Field {0} must not be empty")]
    EmptyField(&'static str),

    #[error("Cannot {operation} a registration in {actual:?} status")]
    InvalidStatus {
        operation: &'static str,
        actual: RegistrationStatus,
    },

    #[error("Email must be verified first")]
    VerifyFirst,

    #[error("Registration already completed")]
    RegistrationCompleted,

    #[error("Verification code expired at {expired_at}")]
    CodeExpired { expired_at: DateTime<Utc> },

    #[error("Verification code does not match, {attempts_remaining} attempts remaining")]
    CodeMismatch { attempts_remaining: u8 },

    #[error("Too many verification attempts (max {max_attempts})")]
    TooManyAttempts { max_attempts: u8 },

    #[error("Invalid verification code")]
    InvalidCode,

    #[error("Verification code was sent recently, retry in {} seconds", .retry_after.num_seconds())]
    ResendThrottled { retry_after: TimeDelta },

    #[error("Failed to generate verification code: {0}")]
    CodeGeneration(String),

    #[error("Failed to hash password: {0}")]
    PasswordHashing(String),

    #[error("Timestamp out of range: {0}")]
    TimestampOverflow(&'static str),
}

impl RegistrationError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        use RegistrationError::*;

        match self {
            InvalidEmail(_) | InvalidProfile(_) | EmptyField(_) | InvalidCode => {
                ErrorKind::Validation
            }
            ResendThrottled { .. } => ErrorKind::Throttle,
            CodeExpired { .. } => ErrorKind::Expiry,
            TooManyAttempts { .. } => ErrorKind::RateLimit,
            CodeMismatch { .. } => ErrorKind::PersistentMismatch,
            InvalidStatus { .. } | VerifyFirst | RegistrationCompleted => {
                ErrorKind::StatusConflict
            }
            CodeGeneration(_) | PasswordHashing(_) | TimestampOverflow(_) => ErrorKind::Internal,
        }
    }

    /// Whether the state change that accompanied this error must be committed
    ///
    /// Attempt-counter increments and expiry transitions are real state even
    /// though the operation reports failure.
    pub fn is_persistent(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Expiry | ErrorKind::RateLimit | ErrorKind::PersistentMismatch
        )
    }
}

/// Result type for aggregate operations
pub type RegistrationResult<T> = Result<T, RegistrationError>;

/// Errors that can occur while delivering events over NATS
#[derive(Debug, Error)]
pub enum MessagingError {
    /// NATS connection error
    #[error("NATS connection error: {0}")]
    NatsConnection(String),

    /// NATS publish error
    #[error("NATS publish error: {0}")]
    NatsPublish(String),

    /// NATS subscribe error
    #[error("NATS subscribe error: {0}")]
    NatsSubscribe(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Deserialization error
    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

/// Result type for messaging operations
pub type MessagingResult<T> = Result<T, MessagingError>;

impl From<serde_json::Error> for MessagingError {
    fn from(err: serde_json::Error) -> Self {
        MessagingError::Serialization(err.to_string())
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Environment variable {name} has invalid value {value:?}")]
    InvalidValue { name: &'static str, value: String },

    #[error("Configuration value {0} must be positive")]
    NotPositive(&'static str),

    #[error("Configuration value {name} exceeds {max_seconds} seconds")]
    TooLarge {
        name: &'static str,
        max_seconds: i64,
    },

    #[error("Invalid password hashing parameters: {0}")]
    PasswordHashing(String),
}
