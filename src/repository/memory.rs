// Copyright (c) 2025 - Cowboy AI, Inc.
//! In-memory registration repository
//!
//! Each registration sits behind its own async mutex, held for the whole
//! load → run → commit cycle, which makes mutations serializable per key
//! while different registrations proceed in parallel.
//!
//! # Lock Order
//!
//! `registrations` → `emails` → record → `log`. A record lock is never
//! held while acquiring `registrations` or `emails`. Email-keyed access
//! keeps `emails` read-locked until the record lock is taken.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::{debug, warn};
use uuid::Uuid;

use super::{CommitReceipt, RegistrationRepository, RepositoryError, RepositoryResult, StoredEvent};
use crate::aggregate::{Mutation, Registration, RegistrationSnapshot, Transition};
use crate::domain::{Email, RegistrationId};

#[derive(Debug)]
struct StoredRegistration {
    snapshot: RegistrationSnapshot,
    version: u64,
}

type Record = Arc<Mutex<StoredRegistration>>;
type LockedRecord = OwnedMutexGuard<StoredRegistration>;

/// Registration repository backed by process memory
#[derive(Debug, Default)]
pub struct InMemoryRegistrationRepository {
    registrations: RwLock<HashMap<RegistrationId, Record>>,
    emails: RwLock<HashMap<Email, RegistrationId>>,
    log: Mutex<Vec<StoredEvent>>,
}

impl InMemoryRegistrationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every committed event, in commit order
    pub async fn committed_events(&self) -> Vec<StoredEvent> {
        self.log.lock().await.clone()
    }

    /// Committed events of one registration
    pub async fn events_for(&self, id: RegistrationId) -> Vec<StoredEvent> {
        self.log
            .lock()
            .await
            .iter()
            .filter(|stored| stored.registration_id == id)
            .cloned()
            .collect()
    }

    /// Committed events sharing a correlation ID
    pub async fn events_by_correlation(&self, correlation_id: Uuid) -> Vec<StoredEvent> {
        self.log
            .lock()
            .await
            .iter()
            .filter(|stored| stored.event.correlation_id() == correlation_id)
            .cloned()
            .collect()
    }

    /// Stored version of a registration
    pub async fn version_of(&self, id: RegistrationId) -> Option<u64> {
        let record = self.record(id).await.ok()?;
        let stored = record.lock().await;
        Some(stored.version)
    }

    /// Number of stored registrations
    pub async fn len(&self) -> usize {
        self.registrations.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.registrations.read().await.is_empty()
    }

    async fn record(&self, id: RegistrationId) -> RepositoryResult<Record> {
        self.registrations
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    /// Lock the record the email index currently points at
    ///
    /// The index stays read-locked until the record lock is held, so a newer
    /// registration for the same email cannot be saved in between.
    async fn lock_by_email(&self, email: &Email) -> RepositoryResult<LockedRecord> {
        let registrations = self.registrations.read().await;
        let emails = self.emails.read().await;

        let id = emails
            .get(email)
            .copied()
            .ok_or_else(|| RepositoryError::NotFound(email.to_string()))?;
        let record = registrations
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;
        drop(registrations);

        let locked = record.lock_owned().await;
        drop(emails);
        Ok(locked)
    }

    async fn append(&self, registration: &Registration) {
        let mut log = self.log.lock().await;
        for event in registration.recorded_events() {
            let sequence = log.len() as u64 + 1;
            log.push(StoredEvent {
                sequence,
                registration_id: registration.id(),
                event: event.clone(),
            });
        }
    }

    async fn run(
        &self,
        mut stored: LockedRecord,
        mutation: &Mutation<'_>,
    ) -> RepositoryResult<CommitReceipt> {
        let loaded = Registration::rehydrate(stored.snapshot.clone());

        let (mut registration, failure) = match mutation.run(&loaded) {
            Transition::Reject(error) => {
                debug!(
                    registration_id = %loaded.id(),
                    operation = mutation.name(),
                    error = %error,
                    "Mutation rejected, nothing committed"
                );
                return Err(RepositoryError::Rejected(error));
            }
            Transition::Unchanged => {
                return Ok(CommitReceipt {
                    registration: loaded,
                    events: Vec::new(),
                    version: stored.version,
                    failure: None,
                });
            }
            Transition::Commit { registration } => (registration, None),
            Transition::CommitAndFail {
                registration,
                error,
            } => (registration, Some(error)),
        };

        self.append(&registration).await;
        stored.snapshot = registration.to_snapshot();
        stored.version += 1;
        let events = registration.commit_events();

        if let Some(error) = &failure {
            warn!(
                registration_id = %registration.id(),
                operation = mutation.name(),
                version = stored.version,
                error = %error,
                "Committed state of a failed mutation"
            );
        } else {
            debug!(
                registration_id = %registration.id(),
                operation = mutation.name(),
                version = stored.version,
                events = events.len(),
                "Mutation committed"
            );
        }

        Ok(CommitReceipt {
            registration,
            events,
            version: stored.version,
            failure,
        })
    }
}

#[async_trait]
impl RegistrationRepository for InMemoryRegistrationRepository {
    async fn find_by_email(&self, email: &Email) -> RepositoryResult<Registration> {
        let stored = self.lock_by_email(email).await?;
        Ok(Registration::rehydrate(stored.snapshot.clone()))
    }

    async fn find_by_id(&self, id: RegistrationId) -> RepositoryResult<Registration> {
        let record = self.record(id).await?;
        let stored = record.lock().await;
        Ok(Registration::rehydrate(stored.snapshot.clone()))
    }

    async fn save(&self, mut registration: Registration) -> RepositoryResult<CommitReceipt> {
        let id = registration.id();

        let mut registrations = self.registrations.write().await;
        if registrations.contains_key(&id) {
            return Err(RepositoryError::AlreadyExists(id));
        }
        let mut emails = self.emails.write().await;

        self.append(&registration).await;
        registrations.insert(
            id,
            Arc::new(Mutex::new(StoredRegistration {
                snapshot: registration.to_snapshot(),
                version: 1,
            })),
        );
        if let Some(previous) = emails.insert(registration.email().clone(), id) {
            debug!(
                registration_id = %id,
                previous = %previous,
                "Email now points at a newer registration"
            );
        }
        drop(emails);
        drop(registrations);

        let events = registration.commit_events();
        debug!(registration_id = %id, events = events.len(), "Registration saved");

        Ok(CommitReceipt {
            registration,
            events,
            version: 1,
            failure: None,
        })
    }

    async fn mutate_by_id(
        &self,
        id: RegistrationId,
        mutation: &Mutation<'_>,
    ) -> RepositoryResult<CommitReceipt> {
        let stored = self.record(id).await?.lock_owned().await;
        self.run(stored, mutation).await
    }

    async fn mutate_by_email(
        &self,
        email: &Email,
        mutation: &Mutation<'_>,
    ) -> RepositoryResult<CommitReceipt> {
        let stored = self.lock_by_email(email).await?;
        self.run(stored, mutation).await
    }
}
