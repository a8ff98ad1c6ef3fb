// Copyright (c) 2025 - Cowboy AI, Inc.
//! Commands for the Registration Aggregate
//!
//! Commands express caller intent and can be rejected by the aggregate.
//!
//! # Time Handling
//!
//! All commands include an explicit `timestamp` parameter read once by the
//! application layer. The aggregate uses it as the single "now" for every
//! comparison in the operation. **NEVER call `Utc::now()` in domain logic**.

use chrono::{DateTime, Utc};
use std::fmt;
use uuid::Uuid;

use super::Registration;
use crate::config::RegistrationConfig;
use crate::domain::{PasswordHash, StaffProfile, StudentProfile};
use crate::errors::RegistrationResult;

/// A command that mutates an already persisted registration
///
/// Implementations delegate to exactly one aggregate method. The mutation
/// protocol runs them against a working copy of the loaded aggregate.
pub trait RegistrationCommand: fmt::Debug + Send + Sync {
    /// Operation name used in logs and status-conflict errors
    fn name(&self) -> &'static str;

    /// Apply the command to the aggregate
    fn execute(
        &self,
        registration: &mut Registration,
        config: &RegistrationConfig,
    ) -> RegistrationResult<()>;
}

/// Command to issue a new registration
///
/// This is the initial command that creates the aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRegistrationCommand {
    /// Raw address as entered by the registrant
    pub email: String,

    /// Timestamp when command was issued (explicit time parameter)
    pub timestamp: DateTime<Utc>,

    /// Correlation ID for distributed tracing
    pub correlation_id: Uuid,
}

/// Command to verify email ownership with a code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyCodeCommand {
    /// Candidate code
    pub code: String,

    /// Timestamp when command was issued
    pub timestamp: DateTime<Utc>,

    /// Correlation ID for distributed tracing
    pub correlation_id: Uuid,
}

/// Command to re-check a code on an already verified registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckCodeCommand {
    pub code: String,
    pub timestamp: DateTime<Utc>,
    pub correlation_id: Uuid,
}

/// Command to issue a replacement code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResendCodeCommand {
    pub timestamp: DateTime<Utc>,
    pub correlation_id: Uuid,
}

/// Command to create a student account from a registration
///
/// The password arrives already hashed; hashing runs off the async
/// executor before the command is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompleteStudentRegistrationCommand {
    /// Code the registrant was sent
    pub code: String,

    /// Student identity
    pub profile: StudentProfile,

    /// Argon2id hash of the chosen password
    pub password_hash: PasswordHash,

    pub timestamp: DateTime<Utc>,
    pub correlation_id: Uuid,
}

/// Command to create a staff account from a registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompleteStaffRegistrationCommand {
    pub code: String,
    pub profile: StaffProfile,
    pub password_hash: PasswordHash,
    pub timestamp: DateTime<Utc>,
    pub correlation_id: Uuid,
}

impl RegistrationCommand for VerifyCodeCommand {
    fn name(&self) -> &'static str {
        "verify_code"
    }

    fn execute(
        &self,
        registration: &mut Registration,
        config: &RegistrationConfig,
    ) -> RegistrationResult<()> {
        registration.verify_code(self, config)
    }
}

impl RegistrationCommand for CheckCodeCommand {
    fn name(&self) -> &'static str {
        "check_code"
    }

    fn execute(
        &self,
        registration: &mut Registration,
        _config: &RegistrationConfig,
    ) -> RegistrationResult<()> {
        registration.check_code(self)
    }
}

impl RegistrationCommand for ResendCodeCommand {
    fn name(&self) -> &'static str {
        "resend_code"
    }

    fn execute(
        &self,
        registration: &mut Registration,
        config: &RegistrationConfig,
    ) -> RegistrationResult<()> {
        registration.resend_code(self, config)
    }
}

impl RegistrationCommand for CompleteStudentRegistrationCommand {
    fn name(&self) -> &'static str {
        "complete_student_registration"
    }

    fn execute(
        &self,
        registration: &mut Registration,
        config: &RegistrationConfig,
    ) -> RegistrationResult<()> {
        registration.complete_student(self, config)
    }
}

impl RegistrationCommand for CompleteStaffRegistrationCommand {
    fn name(&self) -> &'static str {
        "complete_staff_registration"
    }

    fn execute(
        &self,
        registration: &mut Registration,
        config: &RegistrationConfig,
    ) -> RegistrationResult<()> {
        registration.complete_staff(self, config)
    }
}
