// Copyright (c) 2025 - Cowboy AI, Inc.
//! Registration Aggregate
//!
//! # Pattern
//!
//! ```text
//! Command → Mutation::run(&Registration) → Transition
//!                                              ↓
//!                    Repository commits state + recorded events atomically
//!                                              ↓
//!                                    Events published to NATS
//! ```
//!
//! # Design Principles
//!
//! ## 1. Single Writer
//! Only aggregate methods change aggregate fields. Repositories move
//! [`RegistrationSnapshot`]s across the storage boundary and never edit them.
//!
//! ## 2. Explicit Recorder
//! The aggregate owns an [`crate::events::EventRecorder`] and exposes
//! `recorded_events()` / `commit_events()`.
//!
//! ## 3. Time as Parameter
//! - Never call `Utc::now()` in domain logic
//! - Timestamp passed explicitly in commands
//! - One timestamp per operation
//!
//! ## 4. Commit by Variant
//! The persistence collaborator decides commit or rollback from the returned
//! [`Transition`] variant, never from side effects.
//!
//! # Example Usage
//!
//! ```rust
//! use cim_registration::aggregate::{IssueRegistrationCommand, Registration};
//! use cim_registration::config::RegistrationConfig;
//! use cim_registration::domain::RegistrationStatus;
//! use chrono::Utc;
//! use uuid::Uuid;
//!
//! let registration = Registration::issue(
//!     IssueRegistrationCommand {
//!         email: "student@example.edu".to_string(),
//!         timestamp: Utc::now(),
//!         correlation_id: Uuid::now_v7(),
//!     },
//!     &RegistrationConfig::default(),
//! )
//! .unwrap();
//!
//! assert!(registration.is_status(RegistrationStatus::Pending));
//! assert_eq!(registration.verification_code().len(), 6);
//! assert_eq!(registration.recorded_events().len(), 1);
//! ```

pub mod commands;
pub mod mutation;
pub mod registration;

pub use commands::*;
pub use mutation::{Mutation, Transition};
pub use registration::{Registration, RegistrationSnapshot};
