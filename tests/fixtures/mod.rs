// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for cim-registration
//!
//! Provides deterministic test data for aggregate, repository, service and
//! serialization tests. UUIDs and timestamps are fixed constants; only
//! verification codes and event IDs generated by the aggregate vary.
//!
//! # Design Principles
//! - Time only moves through explicit offsets from [`fixed_timestamp`]
//! - Password hashing uses cheap Argon2 parameters
//! - Event fixtures are the only place that constructs events by hand

#![allow(dead_code)]

use chrono::{DateTime, TimeDelta, Utc};
use std::sync::{Arc, LazyLock, Once};
use uuid::Uuid;

use cim_registration::aggregate::*;
use cim_registration::config::{PasswordHashingConfig, RegistrationConfig};
use cim_registration::domain::*;
use cim_registration::events::*;
use cim_registration::publisher::InMemoryEventPublisher;
use cim_registration::repository::InMemoryRegistrationRepository;
use cim_registration::service::RegistrationService;
use cim_registration::ManualClock;

// Fixed test UUIDs (UUID v7 format, but deterministic for testing)
pub const EVENT_ID_1: &str = "01934f4a-0001-7000-8000-000000000001";
pub const EVENT_ID_2: &str = "01934f4a-0002-7000-8000-000000000002";

pub const REGISTRATION_ID_1: &str = "01934f4a-1000-7000-8000-000000001000";

pub const GROUP_ID_1: &str = "01934f4a-2000-7000-8000-000000002000";

pub const CORRELATION_ID_1: &str = "01934f4a-c001-7000-8000-00000000c001";

// Fixed test timestamp (2026-01-19T12:00:00Z)
pub const FIXED_TIMESTAMP: &str = "2026-01-19T12:00:00Z";

pub const STUDENT_EMAIL: &str = "ada.lovelace@example.edu";
pub const STAFF_EMAIL: &str = "grace.hopper@example.edu";
pub const PASSWORD: &str = "correct horse battery staple";
pub const WRONG_CODE: &str = "!WRONG";

/// Parse a fixed UUID from a constant string
pub fn parse_uuid(s: &str) -> Uuid {
    Uuid::parse_str(s).expect("Invalid UUID in test fixture")
}

/// Parse the fixed timestamp
pub fn fixed_timestamp() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(FIXED_TIMESTAMP)
        .expect("Invalid timestamp in test fixture")
        .with_timezone(&Utc)
}

/// Fixed timestamp plus `seconds`
pub fn at(seconds: i64) -> DateTime<Utc> {
    fixed_timestamp() + TimeDelta::seconds(seconds)
}

/// Default policy with cheap password hashing
pub fn test_config() -> RegistrationConfig {
    RegistrationConfig {
        password_hashing: PasswordHashingConfig {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        },
        ..RegistrationConfig::default()
    }
}

/// Install a test subscriber once; honours `RUST_LOG`
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}

// ============================================================================
// Aggregates and commands
// ============================================================================

/// Freshly issued registration, `RegistrationStarted` still recorded
pub fn issued(email: &str) -> Registration {
    Registration::issue(
        IssueRegistrationCommand {
            email: email.to_string(),
            timestamp: fixed_timestamp(),
            correlation_id: parse_uuid(CORRELATION_ID_1),
        },
        &test_config(),
    )
    .expect("Failed to issue registration")
}

/// Issued registration as a repository would load it (empty recorder)
pub fn loaded(email: &str) -> Registration {
    Registration::rehydrate(issued(email).to_snapshot())
}

/// Active code of a registration
pub fn code_of(registration: &Registration) -> String {
    registration.verification_code().as_str().to_string()
}

pub fn verify_cmd(code: &str, seconds: i64) -> VerifyCodeCommand {
    VerifyCodeCommand {
        code: code.to_string(),
        timestamp: at(seconds),
        correlation_id: parse_uuid(CORRELATION_ID_1),
    }
}

pub fn check_cmd(code: &str, seconds: i64) -> CheckCodeCommand {
    CheckCodeCommand {
        code: code.to_string(),
        timestamp: at(seconds),
        correlation_id: parse_uuid(CORRELATION_ID_1),
    }
}

pub fn resend_cmd(seconds: i64) -> ResendCodeCommand {
    ResendCodeCommand {
        timestamp: at(seconds),
        correlation_id: parse_uuid(CORRELATION_ID_1),
    }
}

pub fn student_profile() -> StudentProfile {
    StudentProfile::new("0042-1815", "Ada", "Lovelace", Some("Augusta"), parse_uuid(GROUP_ID_1))
        .expect("Invalid student profile")
}

pub fn staff_profile() -> StaffProfile {
    StaffProfile::new("Grace", "Hopper", None, "Professor").expect("Invalid staff profile")
}

pub fn password() -> Password {
    Password::new(PASSWORD).expect("Invalid password")
}

static PASSWORD_HASH: LazyLock<PasswordHash> = LazyLock::new(|| {
    password()
        .hash(&test_config().password_hashing)
        .expect("Failed to hash fixture password")
});

/// Cheap Argon2id hash of [`PASSWORD`], computed once per test binary
pub fn password_hash() -> PasswordHash {
    PASSWORD_HASH.clone()
}

pub fn complete_student_cmd(code: &str, seconds: i64) -> CompleteStudentRegistrationCommand {
    CompleteStudentRegistrationCommand {
        code: code.to_string(),
        profile: student_profile(),
        password_hash: password_hash(),
        timestamp: at(seconds),
        correlation_id: parse_uuid(CORRELATION_ID_1),
    }
}

pub fn complete_staff_cmd(code: &str, seconds: i64) -> CompleteStaffRegistrationCommand {
    CompleteStaffRegistrationCommand {
        code: code.to_string(),
        profile: staff_profile(),
        password_hash: password_hash(),
        timestamp: at(seconds),
        correlation_id: parse_uuid(CORRELATION_ID_1),
    }
}

// ============================================================================
// Service wiring
// ============================================================================

pub type TestService = RegistrationService<InMemoryRegistrationRepository, InMemoryEventPublisher>;

pub struct ServiceHarness {
    pub service: TestService,
    pub repository: Arc<InMemoryRegistrationRepository>,
    pub publisher: Arc<InMemoryEventPublisher>,
    pub clock: ManualClock,
}

/// Service over in-memory collaborators with a manual clock at [`fixed_timestamp`]
pub fn service_harness() -> ServiceHarness {
    service_harness_with(test_config())
}

/// Same as [`service_harness`] under a caller-chosen policy
pub fn service_harness_with(config: RegistrationConfig) -> ServiceHarness {
    init_tracing();

    let repository = Arc::new(InMemoryRegistrationRepository::new());
    let publisher = Arc::new(InMemoryEventPublisher::new());
    let clock = ManualClock::new(fixed_timestamp());

    let service = RegistrationService::with_clock(
        repository.clone(),
        publisher.clone(),
        config,
        Arc::new(clock.clone()),
    );

    ServiceHarness {
        service,
        repository,
        publisher,
        clock,
    }
}

// ============================================================================
// Event fixtures
// ============================================================================

pub fn registration_started_fixture() -> RegistrationStarted {
    RegistrationStarted {
        event_version: CURRENT_EVENT_VERSION,
        event_id: parse_uuid(EVENT_ID_1),
        registration_id: RegistrationId::from_uuid(parse_uuid(REGISTRATION_ID_1)),
        timestamp: fixed_timestamp(),
        correlation_id: parse_uuid(CORRELATION_ID_1),
        causation_id: None,
        email: Email::new(STUDENT_EMAIL).expect("Invalid email"),
        code: VerificationCode::from_string("K7Q2ZP"),
    }
}

pub fn email_verified_fixture() -> EmailVerified {
    EmailVerified {
        event_version: CURRENT_EVENT_VERSION,
        event_id: parse_uuid(EVENT_ID_2),
        registration_id: RegistrationId::from_uuid(parse_uuid(REGISTRATION_ID_1)),
        timestamp: at(30),
        correlation_id: parse_uuid(CORRELATION_ID_1),
        causation_id: Some(parse_uuid(EVENT_ID_1)),
        email: Email::new(STUDENT_EMAIL).expect("Invalid email"),
    }
}

pub fn code_resent_fixture() -> VerificationCodeResent {
    VerificationCodeResent {
        event_version: CURRENT_EVENT_VERSION,
        event_id: parse_uuid(EVENT_ID_2),
        registration_id: RegistrationId::from_uuid(parse_uuid(REGISTRATION_ID_1)),
        timestamp: at(90),
        correlation_id: parse_uuid(CORRELATION_ID_1),
        causation_id: None,
        email: Email::new(STUDENT_EMAIL).expect("Invalid email"),
        code: VerificationCode::from_string("9XW3LM"),
    }
}

pub fn registration_failed_fixture() -> RegistrationFailed {
    RegistrationFailed {
        event_version: CURRENT_EVENT_VERSION,
        event_id: parse_uuid(EVENT_ID_2),
        registration_id: RegistrationId::from_uuid(parse_uuid(REGISTRATION_ID_1)),
        timestamp: at(45),
        correlation_id: parse_uuid(CORRELATION_ID_1),
        causation_id: None,
        email: Email::new(STUDENT_EMAIL).expect("Invalid email"),
        reason: FailureReason::TooManyAttempts,
    }
}

pub fn student_completed_fixture() -> StudentRegistrationCompleted {
    StudentRegistrationCompleted {
        event_version: CURRENT_EVENT_VERSION,
        event_id: parse_uuid(EVENT_ID_2),
        registration_id: RegistrationId::from_uuid(parse_uuid(REGISTRATION_ID_1)),
        timestamp: at(120),
        correlation_id: parse_uuid(CORRELATION_ID_1),
        causation_id: Some(parse_uuid(EVENT_ID_1)),
        email: Email::new(STUDENT_EMAIL).expect("Invalid email"),
        profile: student_profile(),
        password_hash: PasswordHash::from_phc(
            "$argon2id$v=19$m=15000,t=2,p=1$c2FsdHNhbHRzYWx0$aGFzaGhhc2hoYXNoaGFzaA",
        ),
    }
}

pub fn staff_completed_fixture() -> StaffRegistrationCompleted {
    StaffRegistrationCompleted {
        event_version: CURRENT_EVENT_VERSION,
        event_id: parse_uuid(EVENT_ID_2),
        registration_id: RegistrationId::from_uuid(parse_uuid(REGISTRATION_ID_1)),
        timestamp: at(120),
        correlation_id: parse_uuid(CORRELATION_ID_1),
        causation_id: None,
        email: Email::new(STAFF_EMAIL).expect("Invalid email"),
        profile: staff_profile(),
        password_hash: PasswordHash::from_phc(
            "$argon2id$v=19$m=15000,t=2,p=1$c2FsdHNhbHRzYWx0$aGFzaGhhc2hoYXNoaGFzaA",
        ),
    }
}
