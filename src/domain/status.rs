// Copyright (c) 2025 - Cowboy AI, Inc.
//! Registration lifecycle status

use serde::{Deserialize, Serialize};
use std::fmt;

/// Registration lifecycle status
///
/// ```text
/// Pending ──verify──▶ Verified ──complete──▶ Completed (terminal)
///    │  ▲                │
///    │  └────resend──────┘
///    ▼  ▲
/// Expired (resend recovers)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    /// Code issued, waiting for verification
    Pending,

    /// Code expired or attempts exhausted
    Expired,

    /// Email ownership proven
    Verified,

    /// Account created
    Completed,
}

impl RegistrationStatus {
    /// Check if transition to another status is valid
    pub fn can_transition_to(&self, target: &RegistrationStatus) -> bool {
        use RegistrationStatus::*;

        if self == target {
            // Expired/Completed re-entry is idempotent; Pending re-entry is a resend
            return true;
        }

        match (self, target) {
            (Pending, Verified) => true,
            (Pending, Expired) => true,

            (Expired, Pending) => true,

            (Verified, Pending) => true,
            (Verified, Completed) => true,

            // Completed is terminal
            (Completed, _) => false,

            _ => false,
        }
    }

    /// Whether no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, RegistrationStatus::Completed)
    }
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistrationStatus::Pending => write!(f, "pending"),
            RegistrationStatus::Expired => write!(f, "expired"),
            RegistrationStatus::Verified => write!(f, "verified"),
            RegistrationStatus::Completed => write!(f, "completed"),
        }
    }
}
