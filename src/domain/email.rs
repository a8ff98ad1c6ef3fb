// Copyright (c) 2025 - Cowboy AI, Inc.
//! Email Value Object with Address Validation Invariants

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("email pattern is a valid regex")
});

/// Email validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EmailError {
    #[error("Email is empty")]
    Empty,

    #[error("Email exceeds maximum length of 254 characters: {0}")]
    TooLong(usize),

    #[error("Local part exceeds maximum length of 64 characters: {0}")]
    LocalPartTooLong(usize),

    #[error("Email has an invalid format: {0}")]
    InvalidFormat(String),
}

/// Validated email address
///
/// Invariants, checked once at construction:
/// - Non-empty after trimming surrounding whitespace
/// - Total length ≤ 254 characters
/// - Local part ≤ 64 characters, no leading/trailing or doubled dots
/// - Matches the HTML5 `type=email` grammar
///
/// Addresses are stored lowercased so lookups by email are case-insensitive.
///
/// # Examples
///
/// ```rust
/// use cim_registration::domain::Email;
///
/// let email = Email::new(" Student@Example.EDU ").unwrap();
/// assert_eq!(email.as_str(), "student@example.edu");
///
/// assert!(Email::new("").is_err());
/// assert!(Email::new("no-at-sign").is_err());
/// assert!(Email::new("a..b@example.com").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Maximum total length (RFC 5321 path limit minus brackets)
    pub const MAX_LENGTH: usize = 254;

    /// Maximum local part length (RFC 5321)
    pub const MAX_LOCAL_PART_LENGTH: usize = 64;

    /// Create a new email with validation
    pub fn new(email: impl AsRef<str>) -> Result<Self, EmailError> {
        let email = email.as_ref().trim();

        if email.is_empty() {
            return Err(EmailError::Empty);
        }

        if email.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong(email.len()));
        }

        let Some((local, _domain)) = email.rsplit_once('@') else {
            return Err(EmailError::InvalidFormat(email.to_string()));
        };

        if local.len() > Self::MAX_LOCAL_PART_LENGTH {
            return Err(EmailError::LocalPartTooLong(local.len()));
        }

        if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
            return Err(EmailError::InvalidFormat(email.to_string()));
        }

        if !EMAIL_PATTERN.is_match(email) {
            return Err(EmailError::InvalidFormat(email.to_string()));
        }

        Ok(Self(email.to_lowercase()))
    }

    /// Get the email as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Part after the `@`
    pub fn domain(&self) -> &str {
        self.0.rsplit_once('@').map(|(_, d)| d).unwrap_or_default()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Email {
    type Error = EmailError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for Email {
    type Error = EmailError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
