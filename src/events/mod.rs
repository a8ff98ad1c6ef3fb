// Copyright (c) 2025 - Cowboy AI, Inc.
//! Registration Domain Events
//!
//! Events are immutable facts representing state changes that have occurred.
//!
//! # Event Sourcing Principles
//!
//! 1. **Events are immutable**: Once created, events never change
//! 2. **Events are past tense**: Named for what happened (Verified, not Verify)
//! 3. **Events include metadata**: correlation_id, causation_id, timestamp
//! 4. **Events are versioned**: event_version field for schema evolution
//!
//! # Correlation and Causation
//!
//! - **correlation_id**: copied from the command that produced the event
//! - **causation_id**: the event recorded just before it in the same unit of work
//!
//! Completing a `Pending` registration in one call produces a chain:
//! ```text
//! CompleteStudentRegistration
//!   correlation_id: req-123
//!   ↓
//! EmailVerified                  event_id: evt-1, causation_id: None
//!   ↓
//! StudentRegistrationCompleted   event_id: evt-2, causation_id: evt-1
//! ```
//!
//! # Module Organization
//!
//! - [`registration`] - event payloads and the closed [`RegistrationEvent`] union
//! - [`recorder`] - [`EventRecorder`], the aggregate's uncommitted event buffer

pub mod recorder;
pub mod registration;

pub use recorder::EventRecorder;
pub use registration::{
    EmailVerified, FailureReason, RegistrationEvent, RegistrationFailed, RegistrationStarted,
    StaffRegistrationCompleted, StudentRegistrationCompleted, VerificationCodeResent,
    CURRENT_EVENT_VERSION,
};
