// Copyright (c) 2025 - Cowboy AI, Inc.
//! Unit of Work for Registration Mutations
//!
//! A [`Mutation`] is a named operation object: a command bound to the policy
//! it runs under. Running it never touches the caller's aggregate; it works
//! on a copy and returns a [`Transition`] that tells the persistence
//! collaborator exactly what to commit.
//!
//! # Commit Decision
//!
//! | Command result | Aggregate changed | Transition |
//! |---|---|---|
//! | `Ok` | yes | `Commit` |
//! | `Ok` | no | `Unchanged` |
//! | persistent `Err` | yes | `CommitAndFail` |
//! | any other `Err` | - | `Reject` |
//!
//! Persistent errors (expiry, mismatch, exhaustion) carry real state: the
//! attempt counter and expiry transition survive the failed request. Every
//! other error discards the working copy together with its recorded events.

use super::{Registration, RegistrationCommand};
use crate::config::RegistrationConfig;
use crate::errors::RegistrationError;

/// A command bound to the configuration it runs under
#[derive(Debug)]
pub struct Mutation<'a> {
    command: Box<dyn RegistrationCommand + 'a>,
    config: &'a RegistrationConfig,
}

/// Outcome of running a [`Mutation`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Persist the new state and its recorded events
    Commit { registration: Registration },

    /// Persist the new state and events, then report the error
    CommitAndFail {
        registration: Registration,
        error: RegistrationError,
    },

    /// Nothing to persist
    Unchanged,

    /// Discard everything and report the error
    Reject(RegistrationError),
}

impl<'a> Mutation<'a> {
    pub fn new(command: impl RegistrationCommand + 'a, config: &'a RegistrationConfig) -> Self {
        Self {
            command: Box::new(command),
            config,
        }
    }

    /// Operation name of the bound command
    pub fn name(&self) -> &'static str {
        self.command.name()
    }

    /// Run the command once against a copy of `loaded`
    pub fn run(&self, loaded: &Registration) -> Transition {
        let mut working = loaded.clone();
        let result = self.command.execute(&mut working, self.config);

        let mutated = working.to_snapshot() != loaded.to_snapshot()
            || working.recorded_events().len() != loaded.recorded_events().len();

        match result {
            Ok(()) if mutated => Transition::Commit {
                registration: working,
            },
            Ok(()) => Transition::Unchanged,
            Err(error) if mutated && error.is_persistent() => Transition::CommitAndFail {
                registration: working,
                error,
            },
            Err(error) => Transition::Reject(error),
        }
    }
}

impl Transition {
    /// Whether the repository must write anything
    pub fn is_commit(&self) -> bool {
        matches!(
            self,
            Transition::Commit { .. } | Transition::CommitAndFail { .. }
        )
    }

    /// Error reported to the caller, if any
    pub fn error(&self) -> Option<&RegistrationError> {
        match self {
            Transition::CommitAndFail { error, .. } | Transition::Reject(error) => Some(error),
            Transition::Commit { .. } | Transition::Unchanged => None,
        }
    }
}
