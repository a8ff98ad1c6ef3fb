// Copyright (c) 2025 - Cowboy AI, Inc.
//! Registration Aggregate
//!
//! The aggregate owns status, the active code, both timers and the attempt
//! counter. It is the only writer of its fields; every method validates its
//! preconditions, mutates, and records at most one event per observable
//! transition in its embedded [`EventRecorder`].
//!
//! # Lifecycle
//!
//! | From | Call | To | Event |
//! |---|---|---|---|
//! | - | issue | Pending | RegistrationStarted |
//! | Pending | verify_code (match) | Verified | EmailVerified |
//! | Pending | verify_code (mismatch, under max) | Pending | - |
//! | Pending | verify_code (mismatch, at max) | Expired | RegistrationFailed |
//! | Pending/Expired | verify_code (expired) | Expired | - |
//! | Pending/Expired/Verified | resend_code | Pending | VerificationCodeResent |
//! | Verified | complete_* | Completed | *RegistrationCompleted |
//! | Completed | complete_* | Completed | - |
//!
//! The aggregate is not internally synchronized. Cross-request consistency
//! belongs to the mutation protocol in [`super::mutation`].

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::commands::*;
use crate::config::RegistrationConfig;
use crate::domain::{Email, RegistrationId, RegistrationStatus, VerificationCode};
use crate::errors::{RegistrationError, RegistrationResult};
use crate::events::*;
use crate::state_machine::{
    LifecycleInput, StateInvariant, StateMachine, TransitionError, TransitionOutput,
};

/// Registration aggregate root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    id: RegistrationId,
    email: Email,
    status: RegistrationStatus,
    verification_code: VerificationCode,
    code_attempts: u8,
    code_expires_at: DateTime<Utc>,
    resend_timeout: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    recorder: EventRecorder,
}

/// Persisted field values of a [`Registration`]
///
/// This is what crosses the persistence boundary. Uncommitted events are
/// never part of a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationSnapshot {
    pub id: RegistrationId,
    pub email: Email,
    pub status: RegistrationStatus,
    pub verification_code: VerificationCode,
    pub code_attempts: u8,
    pub code_expires_at: DateTime<Utc>,
    pub resend_timeout: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Registration {
    /// Issue a new registration
    ///
    /// # Business Rules
    /// - Email must pass validation, otherwise nothing is created
    /// - Starts `Pending` with a fresh code and both timers computed from
    ///   the command timestamp
    ///
    /// # Returns
    /// The new aggregate with a single `RegistrationStarted` event recorded
    pub fn issue(
        command: IssueRegistrationCommand,
        config: &RegistrationConfig,
    ) -> RegistrationResult<Self> {
        let email = Email::new(&command.email)?;
        let verification_code = VerificationCode::generate(config.code_length)?;
        let now = command.timestamp;
        let code_expires_at = deadline(now, config.code_ttl, "code_expires_at")?;
        let resend_timeout = deadline(now, config.resend_cooldown, "resend_timeout")?;

        let mut registration = Self {
            id: RegistrationId::new(),
            email,
            status: RegistrationStatus::Pending,
            verification_code,
            code_attempts: 0,
            code_expires_at,
            resend_timeout,
            created_at: now,
            updated_at: now,
            recorder: EventRecorder::new(),
        };

        let (event_id, causation_id) = registration.next_event_ids();
        let event = RegistrationStarted {
            event_version: CURRENT_EVENT_VERSION,
            event_id,
            registration_id: registration.id,
            timestamp: now,
            correlation_id: command.correlation_id,
            causation_id,
            email: registration.email.clone(),
            code: registration.verification_code.clone(),
        };
        registration
            .recorder
            .record(RegistrationEvent::RegistrationStarted(event));

        Ok(registration)
    }

    /// Rebuild an aggregate from persisted field values
    ///
    /// The recorder starts empty.
    pub fn rehydrate(snapshot: RegistrationSnapshot) -> Self {
        Self {
            id: snapshot.id,
            email: snapshot.email,
            status: snapshot.status,
            verification_code: snapshot.verification_code,
            code_attempts: snapshot.code_attempts,
            code_expires_at: snapshot.code_expires_at,
            resend_timeout: snapshot.resend_timeout,
            created_at: snapshot.created_at,
            updated_at: snapshot.updated_at,
            recorder: EventRecorder::new(),
        }
    }

    /// Current field values for persistence
    pub fn to_snapshot(&self) -> RegistrationSnapshot {
        RegistrationSnapshot {
            id: self.id,
            email: self.email.clone(),
            status: self.status,
            verification_code: self.verification_code.clone(),
            code_attempts: self.code_attempts,
            code_expires_at: self.code_expires_at,
            resend_timeout: self.resend_timeout,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Verify email ownership
    ///
    /// # Business Rules
    /// - Expiry is checked first: a `Pending` or `Expired` registration past
    ///   `code_expires_at` moves to `Expired` and fails, even for the right code
    /// - Only `Pending` registrations can be verified
    /// - A mismatch increments `code_attempts`; reaching the maximum moves to
    ///   `Expired` and records `RegistrationFailed`
    ///
    /// Expiry, mismatch and exhaustion errors are persistent: the state
    /// change that accompanies them must be committed.
    pub fn verify_code(
        &mut self,
        command: &VerifyCodeCommand,
        config: &RegistrationConfig,
    ) -> RegistrationResult<()> {
        self.verify(
            &command.code,
            command.timestamp,
            command.correlation_id,
            config,
        )
    }

    /// Re-check a code on a verified registration
    ///
    /// Never mutates and never records events.
    pub fn check_code(&self, command: &CheckCodeCommand) -> RegistrationResult<()> {
        if self.status != RegistrationStatus::Verified {
            return Err(RegistrationError::VerifyFirst);
        }

        if command.timestamp > self.code_expires_at {
            return Err(RegistrationError::CodeExpired {
                expired_at: self.code_expires_at,
            });
        }

        if !self.verification_code.matches(&command.code) {
            return Err(RegistrationError::InvalidCode);
        }

        Ok(())
    }

    /// Replace the active code
    ///
    /// # Business Rules
    /// - Throttled until `resend_timeout` has passed
    /// - Completed registrations cannot be resent
    /// - Otherwise: new code distinct from the previous one, attempts reset,
    ///   both timers recomputed, status back to `Pending`
    pub fn resend_code(
        &mut self,
        command: &ResendCodeCommand,
        config: &RegistrationConfig,
    ) -> RegistrationResult<()> {
        let now = command.timestamp;

        if now <= self.resend_timeout {
            return Err(RegistrationError::ResendThrottled {
                retry_after: self.resend_timeout - now,
            });
        }

        if self.status.is_terminal() {
            return Err(RegistrationError::RegistrationCompleted);
        }

        let code_expires_at = deadline(now, config.code_ttl, "code_expires_at")?;
        let resend_timeout = deadline(now, config.resend_cooldown, "resend_timeout")?;
        let code =
            VerificationCode::generate_distinct(config.code_length, &self.verification_code)?;
        self.advance(LifecycleInput::Resend, "resend_code")?;

        self.verification_code = code;
        self.code_attempts = 0;
        self.code_expires_at = code_expires_at;
        self.resend_timeout = resend_timeout;
        self.updated_at = now;

        let (event_id, causation_id) = self.next_event_ids();
        let event = VerificationCodeResent {
            event_version: CURRENT_EVENT_VERSION,
            event_id,
            registration_id: self.id,
            timestamp: now,
            correlation_id: command.correlation_id,
            causation_id,
            email: self.email.clone(),
            code: self.verification_code.clone(),
        };
        self.recorder
            .record(RegistrationEvent::VerificationCodeResent(event));

        Ok(())
    }

    /// Create a student account
    ///
    /// # Business Rules
    /// - The supplied code must match the active code, checked before anything else
    /// - Already completed: no-op success, no event
    /// - Not yet verified: verification runs first and its error propagates
    /// - The command carries a finished password hash; no hashing happens here
    pub fn complete_student(
        &mut self,
        command: &CompleteStudentRegistrationCommand,
        config: &RegistrationConfig,
    ) -> RegistrationResult<()> {
        if !self.verification_code.matches(&command.code) {
            return Err(RegistrationError::InvalidCode);
        }
        if self.is_completed() {
            return Ok(());
        }
        command.profile.validate()?;

        let now = command.timestamp;
        self.ensure_verified(&command.code, now, command.correlation_id, config)?;

        self.advance(LifecycleInput::Complete, "complete_student_registration")?;
        self.updated_at = now;

        let (event_id, causation_id) = self.next_event_ids();
        let event = StudentRegistrationCompleted {
            event_version: CURRENT_EVENT_VERSION,
            event_id,
            registration_id: self.id,
            timestamp: now,
            correlation_id: command.correlation_id,
            causation_id,
            email: self.email.clone(),
            profile: command.profile.clone(),
            password_hash: command.password_hash.clone(),
        };
        self.recorder
            .record(RegistrationEvent::StudentRegistrationCompleted(event));

        Ok(())
    }

    /// Create a staff account
    ///
    /// Same rules as [`Registration::complete_student`].
    pub fn complete_staff(
        &mut self,
        command: &CompleteStaffRegistrationCommand,
        config: &RegistrationConfig,
    ) -> RegistrationResult<()> {
        if !self.verification_code.matches(&command.code) {
            return Err(RegistrationError::InvalidCode);
        }
        if self.is_completed() {
            return Ok(());
        }
        command.profile.validate()?;

        let now = command.timestamp;
        self.ensure_verified(&command.code, now, command.correlation_id, config)?;

        self.advance(LifecycleInput::Complete, "complete_staff_registration")?;
        self.updated_at = now;

        let (event_id, causation_id) = self.next_event_ids();
        let event = StaffRegistrationCompleted {
            event_version: CURRENT_EVENT_VERSION,
            event_id,
            registration_id: self.id,
            timestamp: now,
            correlation_id: command.correlation_id,
            causation_id,
            email: self.email.clone(),
            profile: command.profile.clone(),
            password_hash: command.password_hash.clone(),
        };
        self.recorder
            .record(RegistrationEvent::StaffRegistrationCompleted(event));

        Ok(())
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn id(&self) -> RegistrationId {
        self.id
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn status(&self) -> RegistrationStatus {
        self.status
    }

    pub fn verification_code(&self) -> &VerificationCode {
        &self.verification_code
    }

    pub fn code_attempts(&self) -> u8 {
        self.code_attempts
    }

    pub fn code_expires_at(&self) -> DateTime<Utc> {
        self.code_expires_at
    }

    pub fn resend_timeout(&self) -> DateTime<Utc> {
        self.resend_timeout
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_status(&self, status: RegistrationStatus) -> bool {
        self.status == status
    }

    pub fn is_completed(&self) -> bool {
        self.status == RegistrationStatus::Completed
    }

    /// Events recorded since load, without clearing them
    pub fn recorded_events(&self) -> &[RegistrationEvent] {
        self.recorder.peek()
    }

    /// Take the recorded events
    ///
    /// Only the persistence collaborator calls this, after a successful commit.
    pub fn commit_events(&mut self) -> Vec<RegistrationEvent> {
        self.recorder.drain()
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn verify(
        &mut self,
        candidate: &str,
        now: DateTime<Utc>,
        correlation_id: Uuid,
        config: &RegistrationConfig,
    ) -> RegistrationResult<()> {
        use RegistrationStatus::*;

        if matches!(self.status, Pending | Expired) && now > self.code_expires_at {
            if self.advance(LifecycleInput::Expire, "verify_code")? == TransitionOutput::Changed {
                self.updated_at = now;
            }
            return Err(RegistrationError::CodeExpired {
                expired_at: self.code_expires_at,
            });
        }

        if self.status != Pending {
            return Err(RegistrationError::InvalidStatus {
                operation: "verify_code",
                actual: self.status,
            });
        }

        if self.verification_code.matches(candidate) {
            self.advance(LifecycleInput::Verify, "verify_code")?;
            self.updated_at = now;

            let (event_id, causation_id) = self.next_event_ids();
            let event = EmailVerified {
                event_version: CURRENT_EVENT_VERSION,
                event_id,
                registration_id: self.id,
                timestamp: now,
                correlation_id,
                causation_id,
                email: self.email.clone(),
            };
            self.recorder.record(RegistrationEvent::EmailVerified(event));
            return Ok(());
        }

        self.code_attempts = self.code_attempts.saturating_add(1);
        self.updated_at = now;

        if self.code_attempts < config.max_code_attempts {
            return Err(RegistrationError::CodeMismatch {
                attempts_remaining: config.max_code_attempts - self.code_attempts,
            });
        }

        self.advance(LifecycleInput::ExhaustAttempts, "verify_code")?;

        let (event_id, causation_id) = self.next_event_ids();
        let event = RegistrationFailed {
            event_version: CURRENT_EVENT_VERSION,
            event_id,
            registration_id: self.id,
            timestamp: now,
            correlation_id,
            causation_id,
            email: self.email.clone(),
            reason: FailureReason::TooManyAttempts,
        };
        self.recorder
            .record(RegistrationEvent::RegistrationFailed(event));

        Err(RegistrationError::TooManyAttempts {
            max_attempts: config.max_code_attempts,
        })
    }

    fn ensure_verified(
        &mut self,
        code: &str,
        now: DateTime<Utc>,
        correlation_id: Uuid,
        config: &RegistrationConfig,
    ) -> RegistrationResult<()> {
        if self.status == RegistrationStatus::Verified {
            return Ok(());
        }
        self.verify(code, now, correlation_id, config)
    }

    /// Move the status through the lifecycle machine
    fn advance(
        &mut self,
        input: LifecycleInput,
        operation: &'static str,
    ) -> RegistrationResult<TransitionOutput> {
        let current = self.status;

        let (next, output) = current.transition(&input).map_err(|e| match e {
            TransitionError::BusinessRuleViolation(_) => RegistrationError::RegistrationCompleted,
            TransitionError::InvalidTransition { .. } => RegistrationError::InvalidStatus {
                operation,
                actual: current,
            },
        })?;

        self.status = next;
        Ok(output)
    }

    /// Identity for the next event and the event that caused it
    fn next_event_ids(&self) -> (Uuid, Option<Uuid>) {
        (
            Uuid::now_v7(),
            self.recorder.last().map(RegistrationEvent::event_id),
        )
    }
}

fn deadline(
    now: DateTime<Utc>,
    after: TimeDelta,
    field: &'static str,
) -> RegistrationResult<DateTime<Utc>> {
    now.checked_add_signed(after)
        .ok_or(RegistrationError::TimestampOverflow(field))
}

impl StateInvariant for Registration {
    fn check_invariants(&self) -> Result<(), String> {
        if self.updated_at < self.created_at {
            return Err("updated_at precedes created_at".to_string());
        }
        if self.code_expires_at <= self.created_at {
            return Err("code_expires_at is not after created_at".to_string());
        }
        if self.resend_timeout <= self.created_at {
            return Err("resend_timeout is not after created_at".to_string());
        }
        if self.verification_code.is_empty() {
            return Err("verification code is empty".to_string());
        }
        if let Some(foreign) = self
            .recorder
            .peek()
            .iter()
            .find(|e| e.registration_id() != self.id)
        {
            return Err(format!(
                "recorded {} belongs to registration {}",
                foreign.event_type_name(),
                foreign.registration_id()
            ));
        }
        Ok(())
    }
}
