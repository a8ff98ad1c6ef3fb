// Copyright (c) 2025 - Cowboy AI, Inc.

//! NATS subject hierarchy for registration events
//!
//! # Subject Pattern
//!
//! Every committed registration event is published to:
//!
//! ```text
//! registration.{event_type}.{registration_id}
//! ```
//!
//! This allows for:
//! - Per-registration subscriptions (`registration.*.{id}`)
//! - Event-type subscriptions (`registration.started.*`), used by the
//!   verification mailer
//! - Global subscriptions (`registration.>`)
//!
//! # Examples
//!
//! ```rust
//! use cim_registration::domain::RegistrationId;
//! use cim_registration::subjects::{EventType, SubjectBuilder};
//!
//! let id: RegistrationId = "01934f4a-1000-7000-8000-000000001000".parse().unwrap();
//!
//! let subject = SubjectBuilder::new()
//!     .event_type(EventType::Started)
//!     .registration(id)
//!     .build();
//! assert_eq!(subject, "registration.started.01934f4a-1000-7000-8000-000000001000");
//!
//! let mailer = SubjectBuilder::new()
//!     .event_type(EventType::CodeResent)
//!     .build();
//! assert_eq!(mailer, "registration.code_resent.*");
//! ```

use std::fmt;

use crate::domain::RegistrationId;
use crate::events::RegistrationEvent;

/// Root namespace for all registration subjects
pub const REGISTRATION_ROOT: &str = "registration";

/// Subject token per event kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    /// Registration issued, first code to deliver
    Started,
    /// Email ownership proven
    EmailVerified,
    /// Replacement code to deliver
    CodeResent,
    /// Attempts exhausted
    Failed,
    /// Student account created
    StudentCompleted,
    /// Staff account created
    StaffCompleted,
}

impl EventType {
    /// Every event type, in lifecycle order
    pub const ALL: [EventType; 6] = [
        EventType::Started,
        EventType::EmailVerified,
        EventType::CodeResent,
        EventType::Failed,
        EventType::StudentCompleted,
        EventType::StaffCompleted,
    ];

    /// Subject token for an event
    pub fn of(event: &RegistrationEvent) -> Self {
        match event {
            RegistrationEvent::RegistrationStarted(_) => EventType::Started,
            RegistrationEvent::EmailVerified(_) => EventType::EmailVerified,
            RegistrationEvent::VerificationCodeResent(_) => EventType::CodeResent,
            RegistrationEvent::RegistrationFailed(_) => EventType::Failed,
            RegistrationEvent::StudentRegistrationCompleted(_) => EventType::StudentCompleted,
            RegistrationEvent::StaffRegistrationCompleted(_) => EventType::StaffCompleted,
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventType::Started => write!(f, "started"),
            EventType::EmailVerified => write!(f, "email_verified"),
            EventType::CodeResent => write!(f, "code_resent"),
            EventType::Failed => write!(f, "failed"),
            EventType::StudentCompleted => write!(f, "student_completed"),
            EventType::StaffCompleted => write!(f, "staff_completed"),
        }
    }
}

/// Builder for registration NATS subjects
///
/// Unset tokens become single-token wildcards (`*`).
#[derive(Debug, Clone)]
pub struct SubjectBuilder {
    root: String,
    event_type: Option<EventType>,
    registration: Option<RegistrationId>,
}

impl SubjectBuilder {
    /// Create a builder rooted at [`REGISTRATION_ROOT`]
    pub fn new() -> Self {
        Self::with_root(REGISTRATION_ROOT)
    }

    /// Create a builder under a custom root (e.g. per deployment)
    pub fn with_root(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            event_type: None,
            registration: None,
        }
    }

    /// Set the event type
    pub fn event_type(mut self, event_type: EventType) -> Self {
        self.event_type = Some(event_type);
        self
    }

    /// Set the registration
    pub fn registration(mut self, id: RegistrationId) -> Self {
        self.registration = Some(id);
        self
    }

    /// Build the subject string
    pub fn build(self) -> String {
        let event_type = self
            .event_type
            .map_or_else(|| "*".to_string(), |t| t.to_string());
        let registration = self
            .registration
            .map_or_else(|| "*".to_string(), |id| id.to_string());

        format!("{}.{}.{}", self.root, event_type, registration)
    }

    /// Build a subscription for all registration events
    ///
    /// Returns: `{root}.>`
    pub fn build_all(self) -> String {
        format!("{}.>", self.root)
    }
}

impl Default for SubjectBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Subject an event is published to under `root`
pub fn subject_for(root: &str, event: &RegistrationEvent) -> String {
    SubjectBuilder::with_root(root)
        .event_type(EventType::of(event))
        .registration(event.registration_id())
        .build()
}

/// Subscription covering every registration event under `root`
pub fn all_registration_events(root: &str) -> String {
    SubjectBuilder::with_root(root).build_all()
}
