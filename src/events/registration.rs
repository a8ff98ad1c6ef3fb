// Copyright (c) 2025 - Cowboy AI, Inc.
//! Registration Domain Events
//!
//! Every externally observable transition of a registration is recorded as
//! exactly one of these events. Payloads are the wire contract consumed by
//! notification collaborators (verification mail, welcome mail), so field
//! names are stable and the set of variants is closed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    Email, PasswordHash, RegistrationId, StaffProfile, StudentProfile, VerificationCode,
};

/// Registration Domain Events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RegistrationEvent {
    /// Registration was issued and the first code generated
    RegistrationStarted(RegistrationStarted),

    /// The registrant proved ownership of the email
    EmailVerified(EmailVerified),

    /// A fresh code replaced the previous one
    VerificationCodeResent(VerificationCodeResent),

    /// The registration can no longer be verified without a resend
    RegistrationFailed(RegistrationFailed),

    /// A student account was created
    StudentRegistrationCompleted(StudentRegistrationCompleted),

    /// A staff account was created
    StaffRegistrationCompleted(StaffRegistrationCompleted),
}

/// Why a registration failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// Verification attempts exhausted
    TooManyAttempts,
}

/// Registration was issued
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationStarted {
    /// Event version for schema evolution
    pub event_version: u32,

    /// Unique event identifier (UUID v7 for time ordering)
    pub event_id: Uuid,

    /// Registration aggregate ID
    pub registration_id: RegistrationId,

    /// When this event occurred
    pub timestamp: DateTime<Utc>,

    /// Correlation ID for request tracing
    pub correlation_id: Uuid,

    /// Causation ID (event that caused this event)
    pub causation_id: Option<Uuid>,

    /// Address the code is sent to
    pub email: Email,

    /// Code to deliver
    pub code: VerificationCode,
}

/// Email ownership was proven
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailVerified {
    pub event_version: u32,
    pub event_id: Uuid,
    pub registration_id: RegistrationId,
    pub timestamp: DateTime<Utc>,
    pub correlation_id: Uuid,
    pub causation_id: Option<Uuid>,

    /// Verified address
    pub email: Email,
}

/// A new code was issued
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationCodeResent {
    pub event_version: u32,
    pub event_id: Uuid,
    pub registration_id: RegistrationId,
    pub timestamp: DateTime<Utc>,
    pub correlation_id: Uuid,
    pub causation_id: Option<Uuid>,

    /// Address the code is sent to
    pub email: Email,

    /// Replacement code to deliver
    pub code: VerificationCode,
}

/// Registration failed and moved to `Expired`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationFailed {
    pub event_version: u32,
    pub event_id: Uuid,
    pub registration_id: RegistrationId,
    pub timestamp: DateTime<Utc>,
    pub correlation_id: Uuid,
    pub causation_id: Option<Uuid>,

    pub email: Email,

    pub reason: FailureReason,
}

/// Student account was created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRegistrationCompleted {
    pub event_version: u32,
    pub event_id: Uuid,
    pub registration_id: RegistrationId,
    pub timestamp: DateTime<Utc>,
    pub correlation_id: Uuid,
    pub causation_id: Option<Uuid>,

    pub email: Email,

    pub profile: StudentProfile,

    /// Argon2id PHC string; the raw password never leaves the aggregate
    pub password_hash: PasswordHash,
}

/// Staff account was created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffRegistrationCompleted {
    pub event_version: u32,
    pub event_id: Uuid,
    pub registration_id: RegistrationId,
    pub timestamp: DateTime<Utc>,
    pub correlation_id: Uuid,
    pub causation_id: Option<Uuid>,

    pub email: Email,

    pub profile: StaffProfile,

    pub password_hash: PasswordHash,
}

/// Current schema version shared by all registration events
pub const CURRENT_EVENT_VERSION: u32 = 1;

impl RegistrationEvent {
    /// Extract registration ID
    pub fn registration_id(&self) -> RegistrationId {
        use RegistrationEvent::*;

        match self {
            RegistrationStarted(e) => e.registration_id,
            EmailVerified(e) => e.registration_id,
            VerificationCodeResent(e) => e.registration_id,
            RegistrationFailed(e) => e.registration_id,
            StudentRegistrationCompleted(e) => e.registration_id,
            StaffRegistrationCompleted(e) => e.registration_id,
        }
    }

    /// Extract event ID
    pub fn event_id(&self) -> Uuid {
        use RegistrationEvent::*;

        match self {
            RegistrationStarted(e) => e.event_id,
            EmailVerified(e) => e.event_id,
            VerificationCodeResent(e) => e.event_id,
            RegistrationFailed(e) => e.event_id,
            StudentRegistrationCompleted(e) => e.event_id,
            StaffRegistrationCompleted(e) => e.event_id,
        }
    }

    /// Extract timestamp
    pub fn timestamp(&self) -> DateTime<Utc> {
        use RegistrationEvent::*;

        match self {
            RegistrationStarted(e) => e.timestamp,
            EmailVerified(e) => e.timestamp,
            VerificationCodeResent(e) => e.timestamp,
            RegistrationFailed(e) => e.timestamp,
            StudentRegistrationCompleted(e) => e.timestamp,
            StaffRegistrationCompleted(e) => e.timestamp,
        }
    }

    /// Extract correlation ID
    pub fn correlation_id(&self) -> Uuid {
        use RegistrationEvent::*;

        match self {
            RegistrationStarted(e) => e.correlation_id,
            EmailVerified(e) => e.correlation_id,
            VerificationCodeResent(e) => e.correlation_id,
            RegistrationFailed(e) => e.correlation_id,
            StudentRegistrationCompleted(e) => e.correlation_id,
            StaffRegistrationCompleted(e) => e.correlation_id,
        }
    }

    /// Extract causation ID
    pub fn causation_id(&self) -> Option<Uuid> {
        use RegistrationEvent::*;

        match self {
            RegistrationStarted(e) => e.causation_id,
            EmailVerified(e) => e.causation_id,
            VerificationCodeResent(e) => e.causation_id,
            RegistrationFailed(e) => e.causation_id,
            StudentRegistrationCompleted(e) => e.causation_id,
            StaffRegistrationCompleted(e) => e.causation_id,
        }
    }

    /// Extract event version
    pub fn event_version(&self) -> u32 {
        use RegistrationEvent::*;

        match self {
            RegistrationStarted(e) => e.event_version,
            EmailVerified(e) => e.event_version,
            VerificationCodeResent(e) => e.event_version,
            RegistrationFailed(e) => e.event_version,
            StudentRegistrationCompleted(e) => e.event_version,
            StaffRegistrationCompleted(e) => e.event_version,
        }
    }

    /// Email the event concerns
    pub fn email(&self) -> &Email {
        use RegistrationEvent::*;

        match self {
            RegistrationStarted(e) => &e.email,
            EmailVerified(e) => &e.email,
            VerificationCodeResent(e) => &e.email,
            RegistrationFailed(e) => &e.email,
            StudentRegistrationCompleted(e) => &e.email,
            StaffRegistrationCompleted(e) => &e.email,
        }
    }

    /// Get human-readable event type name
    pub fn event_type_name(&self) -> &'static str {
        use RegistrationEvent::*;

        match self {
            RegistrationStarted(_) => "RegistrationStarted",
            EmailVerified(_) => "EmailVerified",
            VerificationCodeResent(_) => "VerificationCodeResent",
            RegistrationFailed(_) => "RegistrationFailed",
            StudentRegistrationCompleted(_) => "StudentRegistrationCompleted",
            StaffRegistrationCompleted(_) => "StaffRegistrationCompleted",
        }
    }

    /// Whether this event marks account creation
    pub fn is_completion(&self) -> bool {
        matches!(
            self,
            RegistrationEvent::StudentRegistrationCompleted(_)
                | RegistrationEvent::StaffRegistrationCompleted(_)
        )
    }
}
