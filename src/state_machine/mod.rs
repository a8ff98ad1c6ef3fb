// Copyright (c) 2025 - Cowboy AI, Inc.
//! Finite State Machine Abstractions
//!
//! Generic, pure state machine types for modeling domain lifecycles.
//! Transitions are deterministic functions with no side effects; the
//! aggregate decides *when* to transition, the machine decides *whether*
//! the transition is legal and *where* it lands.
//!
//! # Mealy Machine
//!
//! Output depends on both current state and input:
//! ```text
//! (State, Input) → (State, Output)
//! ```
//!
//! # Example
//!
//! ```rust
//! use cim_registration::domain::RegistrationStatus;
//! use cim_registration::state_machine::{LifecycleInput, StateMachine};
//!
//! let (next, _) = RegistrationStatus::Pending
//!     .transition(&LifecycleInput::Verify)
//!     .unwrap();
//! assert_eq!(next, RegistrationStatus::Verified);
//!
//! assert!(RegistrationStatus::Completed
//!     .transition(&LifecycleInput::Resend)
//!     .is_err());
//! ```

pub mod registration_lifecycle;

pub use registration_lifecycle::{LifecycleInput, TransitionOutput};

/// Result of a state transition
pub type TransitionResult<S> = Result<S, TransitionError>;

/// Errors that can occur during state transitions
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    /// Transition from current state to target state is not allowed
    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    /// Business rule prevents transition
    #[error("Business rule violated: {0}")]
    BusinessRuleViolation(String),
}

/// Trait for finite state machines
///
/// Implement this trait to define a state machine with typed states,
/// inputs, and outputs.
pub trait StateMachine: Sized + Clone {
    /// Input type that triggers transitions
    type Input;

    /// Output type produced by transitions (use () if none)
    type Output;

    /// Attempt to transition to a new state given an input
    ///
    /// # Returns
    /// - Ok((new_state, output)) if transition is valid
    /// - Err(TransitionError) if transition is invalid
    fn transition(&self, input: &Self::Input) -> TransitionResult<(Self, Self::Output)>;

    /// Check if a transition is valid without performing it
    fn can_transition(&self, input: &Self::Input) -> bool {
        self.transition(input).is_ok()
    }

    /// Get all valid inputs from current state (if enumerable)
    fn valid_inputs(&self) -> Vec<Self::Input>
    where
        Self::Input: Clone,
    {
        Vec::new()
    }
}

/// Trait for states with invariants
///
/// Invariants must hold at every observable boundary, i.e. after each
/// public operation completes.
pub trait StateInvariant {
    /// Check if state invariants hold
    fn check_invariants(&self) -> Result<(), String>;
}
