// Copyright (c) 2025 - Cowboy AI, Inc.
//! Registration Lifecycle State Machine
//!
//! # States
//!
//! - Pending: code issued
//! - Expired: code timed out or attempts exhausted
//! - Verified: email ownership proven
//! - Completed: account created (terminal)
//!
//! # Inputs
//!
//! - Verify: Pending → Verified
//! - ExhaustAttempts: Pending → Expired
//! - Expire: Pending/Expired → Expired
//! - Resend: Pending/Expired/Verified → Pending
//! - Complete: Verified → Completed, Completed → Completed (idempotent)

use super::{StateMachine, TransitionError, TransitionResult};
use crate::domain::RegistrationStatus;

/// Lifecycle input (FSM input)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleInput {
    /// Correct code supplied in time
    Verify,

    /// Last allowed attempt failed
    ExhaustAttempts,

    /// Code expiry detected
    Expire,

    /// New code issued
    Resend,

    /// Account created
    Complete,
}

/// What a transition means for event emission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutput {
    /// Status changed; a domain event is expected
    Changed,

    /// Status stayed the same (idempotent re-entry)
    Unchanged,
}

impl StateMachine for RegistrationStatus {
    type Input = LifecycleInput;
    type Output = TransitionOutput;

    fn transition(&self, input: &Self::Input) -> TransitionResult<(Self, Self::Output)> {
        use LifecycleInput::*;
        use RegistrationStatus::*;

        let target = match (self, input) {
            (Pending, Verify) => Verified,
            (Pending, ExhaustAttempts) => Expired,
            (Pending | Expired, Expire) => Expired,
            (Pending | Expired | Verified, Resend) => Pending,
            (Verified | Completed, Complete) => Completed,

            (Completed, _) => {
                return Err(TransitionError::BusinessRuleViolation(
                    "Registration already completed".to_string(),
                ))
            }
            (from, input) => {
                return Err(TransitionError::InvalidTransition {
                    from: from.to_string(),
                    to: format!("{input:?}"),
                })
            }
        };

        debug_assert!(self.can_transition_to(&target));

        let output = if target == *self && !matches!(input, Resend) {
            TransitionOutput::Unchanged
        } else {
            TransitionOutput::Changed
        };

        Ok((target, output))
    }

    fn valid_inputs(&self) -> Vec<Self::Input> {
        use LifecycleInput::*;
        use RegistrationStatus::*;

        match self {
            Pending => vec![Verify, ExhaustAttempts, Expire, Resend],
            Expired => vec![Expire, Resend],
            Verified => vec![Resend, Complete],
            Completed => vec![Complete],
        }
    }
}
