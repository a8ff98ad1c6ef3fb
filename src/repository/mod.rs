// Copyright (c) 2025 - Cowboy AI, Inc.
//! Persistence Collaborator
//!
//! The repository owns transport of [`Registration`]s in and out of storage.
//! It never edits aggregate fields: all changes arrive through a
//! [`Mutation`] and are committed according to the [`crate::aggregate::Transition`]
//! it returns.
//!
//! # Mutation Protocol
//!
//! 1. **Load** exactly one registration by key, or fail with `NotFound`
//!    without running the mutation
//! 2. **Run** the mutation exactly once
//! 3. **Commit** state and recorded events together, or discard both
//! 4. **Drain** the recorder only after the commit succeeded
//!
//! Mutations against the same key are serializable: no caller observes a
//! partially applied transition, and two concurrent mutations never both
//! start from the same pre-mutation state.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::aggregate::{Mutation, Registration};
use crate::domain::{Email, RegistrationId};
use crate::errors::RegistrationError;
use crate::events::RegistrationEvent;

pub mod memory;

pub use memory::InMemoryRegistrationRepository;

/// Repository errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// No registration matches the key
    #[error("Registration not found: {0}")]
    NotFound(String),

    /// A registration with this ID is already stored
    #[error("Registration already exists: {0}")]
    AlreadyExists(RegistrationId),

    /// Stored version moved between load and commit (optimistic backends)
    #[error("Concurrency conflict: expected version {expected}, got {actual}")]
    ConcurrencyConflict { expected: u64, actual: u64 },

    /// The mutation failed and nothing was committed
    #[error(transparent)]
    Rejected(#[from] RegistrationError),

    /// Storage backend failure
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// What a successful save or mutation left behind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReceipt {
    /// Registration as now stored, recorder drained
    pub registration: Registration,

    /// Events committed by this call, in record order
    pub events: Vec<RegistrationEvent>,

    /// Stored version after the call
    pub version: u64,

    /// Persistent error the mutation reported after its state was committed
    pub failure: Option<RegistrationError>,
}

impl CommitReceipt {
    /// Registration on success, the committed failure otherwise
    pub fn into_result(self) -> Result<Registration, RegistrationError> {
        match self.failure {
            Some(error) => Err(error),
            None => Ok(self.registration),
        }
    }
}

/// Committed event with its position in the global log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEvent {
    /// Global, gap-free sequence starting at 1
    pub sequence: u64,

    pub registration_id: RegistrationId,

    pub event: RegistrationEvent,
}

/// Storage port for registrations
#[async_trait]
pub trait RegistrationRepository: Send + Sync {
    /// Most recently saved registration for an email
    async fn find_by_email(&self, email: &Email) -> RepositoryResult<Registration>;

    /// Registration by identifier
    async fn find_by_id(&self, id: RegistrationId) -> RepositoryResult<Registration>;

    /// Store a newly issued registration together with its recorded events
    ///
    /// # Errors
    /// - `AlreadyExists` if the ID is already stored
    async fn save(&self, registration: Registration) -> RepositoryResult<CommitReceipt>;

    /// Run a mutation against the registration with this ID
    ///
    /// # Errors
    /// - `NotFound` before the mutation runs
    /// - `Rejected` carrying the mutation's error unchanged when nothing was committed
    async fn mutate_by_id(
        &self,
        id: RegistrationId,
        mutation: &Mutation<'_>,
    ) -> RepositoryResult<CommitReceipt>;

    /// Run a mutation against the most recent registration for this email
    async fn mutate_by_email(
        &self,
        email: &Email,
        mutation: &Mutation<'_>,
    ) -> RepositoryResult<CommitReceipt>;
}
