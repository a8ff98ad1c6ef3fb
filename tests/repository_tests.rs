// Copyright (c) 2025 - Cowboy AI, Inc.
//! Integration tests for the atomic mutation protocol
//!
//! Verifies the in-memory repository against the persistence contract:
//! not-found short-circuits, exactly-once execution, commit/rollback by
//! transition variant, and per-key serializability under concurrency.

mod fixtures;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc as std_mpsc;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use pretty_assertions::assert_eq;

use cim_registration::aggregate::*;
use cim_registration::config::RegistrationConfig;
use cim_registration::domain::{Email, RegistrationId, RegistrationStatus};
use cim_registration::errors::{RegistrationError, RegistrationResult};
use cim_registration::repository::*;

use fixtures::*;

/// Counts executions, optionally verifying before failing
#[derive(Debug)]
struct ProbeCommand {
    calls: Arc<AtomicUsize>,
    verify_with: Option<String>,
    fail_with: Option<RegistrationError>,
}

impl RegistrationCommand for ProbeCommand {
    fn name(&self) -> &'static str {
        "probe"
    }

    fn execute(
        &self,
        registration: &mut Registration,
        config: &RegistrationConfig,
    ) -> RegistrationResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(code) = &self.verify_with {
            registration.verify_code(&verify_cmd(code, 10), config)?;
        }
        match &self.fail_with {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

/// Parks inside the record lock until released
#[derive(Debug)]
struct GateCommand {
    entered: std_mpsc::Sender<()>,
    release: StdMutex<std_mpsc::Receiver<()>>,
}

impl RegistrationCommand for GateCommand {
    fn name(&self) -> &'static str {
        "gate"
    }

    fn execute(
        &self,
        _registration: &mut Registration,
        _config: &RegistrationConfig,
    ) -> RegistrationResult<()> {
        let _ = self.entered.send(());
        if let Ok(release) = self.release.lock() {
            let _ = release.recv();
        }
        Ok(())
    }
}

async fn saved(repository: &InMemoryRegistrationRepository, email: &str) -> Registration {
    repository.save(issued(email)).await.unwrap().registration
}

#[tokio::test]
async fn test_save_commits_started_event() {
    let repository = InMemoryRegistrationRepository::new();
    let registration = issued(STUDENT_EMAIL);
    let id = registration.id();

    let receipt = repository.save(registration).await.unwrap();

    assert_eq!(receipt.version, 1);
    assert_eq!(receipt.failure, None);
    assert_eq!(receipt.events.len(), 1);
    assert!(receipt.registration.recorded_events().is_empty());

    let log = repository.committed_events().await;
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].sequence, 1);
    assert_eq!(log[0].registration_id, id);
    assert_eq!(log[0].event, receipt.events[0]);

    let found = repository.find_by_id(id).await.unwrap();
    assert_eq!(found.to_snapshot(), receipt.registration.to_snapshot());

    let by_email = repository
        .find_by_email(&Email::new(STUDENT_EMAIL).unwrap())
        .await
        .unwrap();
    assert_eq!(by_email.id(), id);
}

#[tokio::test]
async fn test_save_rejects_duplicate_id() {
    let repository = InMemoryRegistrationRepository::new();
    let registration = issued(STUDENT_EMAIL);
    let duplicate = Registration::rehydrate(registration.to_snapshot());

    repository.save(registration).await.unwrap();
    let err = repository.save(duplicate.clone()).await.unwrap_err();

    assert_eq!(err, RepositoryError::AlreadyExists(duplicate.id()));
    assert_eq!(repository.len().await, 1);
}

#[tokio::test]
async fn test_latest_registration_wins_email_lookup() {
    let repository = InMemoryRegistrationRepository::new();
    let first = saved(&repository, STUDENT_EMAIL).await;
    let second = saved(&repository, STUDENT_EMAIL).await;

    let found = repository
        .find_by_email(&Email::new(STUDENT_EMAIL).unwrap())
        .await
        .unwrap();

    assert_ne!(first.id(), second.id());
    assert_eq!(found.id(), second.id());
    assert!(repository.find_by_id(first.id()).await.is_ok());
}

#[tokio::test]
async fn test_not_found_skips_mutation() {
    let repository = InMemoryRegistrationRepository::new();
    let config = test_config();
    let calls = Arc::new(AtomicUsize::new(0));
    let mutation = Mutation::new(
        ProbeCommand {
            calls: calls.clone(),
            verify_with: None,
            fail_with: None,
        },
        &config,
    );

    let by_id = repository
        .mutate_by_id(RegistrationId::new(), &mutation)
        .await
        .unwrap_err();
    let by_email = repository
        .mutate_by_email(&Email::new("nobody@example.edu").unwrap(), &mutation)
        .await
        .unwrap_err();

    assert!(matches!(by_id, RepositoryError::NotFound(_)));
    assert!(matches!(by_email, RepositoryError::NotFound(_)));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_successful_mutation_commits_state_and_events() {
    let repository = InMemoryRegistrationRepository::new();
    let config = test_config();
    let registration = saved(&repository, STUDENT_EMAIL).await;
    let code = code_of(&registration);

    let receipt = repository
        .mutate_by_email(
            registration.email(),
            &Mutation::new(verify_cmd(&code, 10), &config),
        )
        .await
        .unwrap();

    assert_eq!(receipt.version, 2);
    assert_eq!(receipt.registration.status(), RegistrationStatus::Verified);
    assert_eq!(receipt.events.len(), 1);
    assert!(receipt.registration.recorded_events().is_empty());

    let stored = repository.find_by_id(registration.id()).await.unwrap();
    assert_eq!(stored.status(), RegistrationStatus::Verified);

    let log = repository.events_for(registration.id()).await;
    let sequences: Vec<u64> = log.iter().map(|stored| stored.sequence).collect();
    assert_eq!(sequences, vec![1, 2]);
    assert_eq!(log[1].event.event_type_name(), "EmailVerified");
}

#[tokio::test]
async fn test_persistent_failure_commits_attempt_counter() {
    let repository = InMemoryRegistrationRepository::new();
    let config = test_config();
    let registration = saved(&repository, STUDENT_EMAIL).await;

    let receipt = repository
        .mutate_by_id(
            registration.id(),
            &Mutation::new(verify_cmd(WRONG_CODE, 10), &config),
        )
        .await
        .unwrap();

    assert_eq!(
        receipt.failure,
        Some(RegistrationError::CodeMismatch {
            attempts_remaining: 2
        })
    );
    assert_eq!(receipt.version, 2);
    assert!(receipt.events.is_empty());

    let stored = repository.find_by_id(registration.id()).await.unwrap();
    assert_eq!(stored.code_attempts(), 1);

    assert_eq!(
        receipt.into_result().unwrap_err(),
        RegistrationError::CodeMismatch {
            attempts_remaining: 2
        }
    );
}

#[tokio::test]
async fn test_rejected_mutation_discards_state_and_events() {
    let repository = InMemoryRegistrationRepository::new();
    let config = test_config();
    let registration = saved(&repository, STUDENT_EMAIL).await;
    let calls = Arc::new(AtomicUsize::new(0));

    // Verifies successfully, then fails with a non-persistent error
    let mutation = Mutation::new(
        ProbeCommand {
            calls: calls.clone(),
            verify_with: Some(code_of(&registration)),
            fail_with: Some(RegistrationError::InvalidCode),
        },
        &config,
    );

    let err = repository
        .mutate_by_id(registration.id(), &mutation)
        .await
        .unwrap_err();

    assert_eq!(err, RepositoryError::Rejected(RegistrationError::InvalidCode));
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let stored = repository.find_by_id(registration.id()).await.unwrap();
    assert_eq!(stored.status(), RegistrationStatus::Pending);
    assert_eq!(repository.version_of(registration.id()).await, Some(1));
    assert_eq!(repository.committed_events().await.len(), 1);
}

#[tokio::test]
async fn test_throttle_rejection_leaves_version() {
    let repository = InMemoryRegistrationRepository::new();
    let config = test_config();
    let registration = saved(&repository, STUDENT_EMAIL).await;

    let err = repository
        .mutate_by_id(registration.id(), &Mutation::new(resend_cmd(5), &config))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        RepositoryError::Rejected(RegistrationError::ResendThrottled { .. })
    ));
    assert_eq!(repository.version_of(registration.id()).await, Some(1));
}

#[tokio::test]
async fn test_unchanged_mutation_writes_nothing() {
    let repository = InMemoryRegistrationRepository::new();
    let config = test_config();
    let registration = saved(&repository, STUDENT_EMAIL).await;
    let code = code_of(&registration);
    repository
        .mutate_by_id(registration.id(), &Mutation::new(verify_cmd(&code, 10), &config))
        .await
        .unwrap();

    let receipt = repository
        .mutate_by_id(registration.id(), &Mutation::new(check_cmd(&code, 20), &config))
        .await
        .unwrap();

    assert_eq!(receipt.version, 2);
    assert!(receipt.events.is_empty());
    assert_eq!(receipt.failure, None);
    assert_eq!(repository.committed_events().await.len(), 2);
}

#[tokio::test]
async fn test_events_by_correlation() {
    let repository = InMemoryRegistrationRepository::new();
    saved(&repository, STUDENT_EMAIL).await;
    saved(&repository, STAFF_EMAIL).await;

    let correlated = repository
        .events_by_correlation(parse_uuid(CORRELATION_ID_1))
        .await;

    assert_eq!(correlated.len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_wrong_codes_are_serialized() {
    let repository = Arc::new(InMemoryRegistrationRepository::new());
    let registration = saved(&repository, STUDENT_EMAIL).await;
    let id = registration.id();

    let tasks: Vec<_> = (0..20)
        .map(|_| {
            let repository = repository.clone();
            tokio::spawn(async move {
                let config = test_config();
                let mutation = Mutation::new(verify_cmd(WRONG_CODE, 10), &config);
                repository.mutate_by_id(id, &mutation).await
            })
        })
        .collect();

    let mut mismatches = 0;
    let mut exhausted = 0;
    let mut conflicts = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(receipt) => match receipt.failure {
                Some(RegistrationError::CodeMismatch { .. }) => mismatches += 1,
                Some(RegistrationError::TooManyAttempts { .. }) => exhausted += 1,
                other => panic!("unexpected receipt failure {other:?}"),
            },
            Err(RepositoryError::Rejected(RegistrationError::InvalidStatus { .. })) => {
                conflicts += 1
            }
            Err(other) => panic!("unexpected error {other}"),
        }
    }

    assert_eq!((mismatches, exhausted, conflicts), (2, 1, 17));

    let stored = repository.find_by_id(id).await.unwrap();
    assert_eq!(stored.status(), RegistrationStatus::Expired);
    assert_eq!(stored.code_attempts(), 3);
    assert_eq!(repository.version_of(id).await, Some(4));

    let failures = repository
        .events_for(id)
        .await
        .into_iter()
        .filter(|stored| stored.event.event_type_name() == "RegistrationFailed")
        .count();
    assert_eq!(failures, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_verification_succeeds_once() {
    let repository = Arc::new(InMemoryRegistrationRepository::new());
    let registration = saved(&repository, STUDENT_EMAIL).await;
    let email = registration.email().clone();
    let code = code_of(&registration);

    let tasks: Vec<_> = (0..10)
        .map(|_| {
            let repository = repository.clone();
            let email = email.clone();
            let code = code.clone();
            tokio::spawn(async move {
                let config = test_config();
                let mutation = Mutation::new(verify_cmd(&code, 10), &config);
                repository.mutate_by_email(&email, &mutation).await
            })
        })
        .collect();

    let mut verified = 0;
    for task in tasks {
        if let Ok(receipt) = task.await.unwrap() {
            assert_eq!(receipt.events.len(), 1);
            verified += 1;
        }
    }

    assert_eq!(verified, 1);
    assert_eq!(repository.committed_events().await.len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_save_waits_for_in_flight_email_mutation() {
    let repository = Arc::new(InMemoryRegistrationRepository::new());
    let older = saved(&repository, STUDENT_EMAIL).await;
    let email = older.email().clone();

    // Hold the older record's lock so the email-keyed mutation queues on it
    let (entered_tx, entered_rx) = std_mpsc::channel();
    let (release_tx, release_rx) = std_mpsc::channel();
    let gate = tokio::spawn({
        let repository = repository.clone();
        let id = older.id();
        async move {
            let config = test_config();
            let command = GateCommand {
                entered: entered_tx,
                release: StdMutex::new(release_rx),
            };
            let mutation = Mutation::new(command, &config);
            repository.mutate_by_id(id, &mutation).await
        }
    });
    tokio::task::spawn_blocking(move || entered_rx.recv())
        .await
        .unwrap()
        .unwrap();

    let calls = Arc::new(AtomicUsize::new(0));
    let by_email = tokio::spawn({
        let repository = repository.clone();
        let email = email.clone();
        let calls = calls.clone();
        async move {
            let config = test_config();
            let command = ProbeCommand {
                calls,
                verify_with: None,
                fail_with: None,
            };
            let mutation = Mutation::new(command, &config);
            repository.mutate_by_email(&email, &mutation).await
        }
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    let newer = issued(STUDENT_EMAIL);
    let newer_id = newer.id();
    let save = tokio::spawn({
        let repository = repository.clone();
        async move { repository.save(newer).await }
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(
        !save.is_finished(),
        "a newer registration must not be indexed while an email lookup is in flight"
    );

    release_tx.send(()).unwrap();
    gate.await.unwrap().unwrap();
    let receipt = by_email.await.unwrap().unwrap();
    save.await.unwrap().unwrap();

    assert_eq!(receipt.registration.id(), older.id());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(repository.find_by_email(&email).await.unwrap().id(), newer_id);
}
