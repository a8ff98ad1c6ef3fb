//! Email-verification registration for the Composable Information Machine
//!
//! This crate provides the registration aggregate that gates student and
//! staff account creation behind a time-bounded verification code, the
//! atomic mutation protocol used to persist it, and delivery of its domain
//! events over NATS.
//!
//! # Modules
//!
//! - [`domain`] - value objects (email, code, password, profiles, status)
//! - [`events`] - domain events and the event recorder
//! - [`aggregate`] - the `Registration` aggregate, commands and mutations
//! - [`repository`] - persistence port and in-memory implementation
//! - [`service`] - application service orchestrating a full request
//! - [`nats`], [`subjects`], [`publisher`] - event delivery

pub mod aggregate;
pub mod clock;
pub mod config;
pub mod domain;
pub mod errors;
pub mod events;
pub mod nats;
pub mod publisher;
pub mod repository;
pub mod service;
pub mod state_machine;
pub mod subjects;

// Re-export commonly used types
pub use aggregate::{Mutation, Registration, RegistrationSnapshot, Transition};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{PasswordHashingConfig, RegistrationConfig};
pub use errors::{
    ConfigError, ErrorKind, MessagingError, MessagingResult, RegistrationError,
    RegistrationResult,
};
pub use events::{EventRecorder, RegistrationEvent};
pub use nats::{NatsClient, NatsConfig, RegistrationEventHandler};
pub use publisher::{EventPublisher, InMemoryEventPublisher, NatsEventPublisher};
pub use repository::{
    CommitReceipt, InMemoryRegistrationRepository, RegistrationRepository, RepositoryError,
};
pub use service::{RegistrationService, ServiceError, ServiceResult};
