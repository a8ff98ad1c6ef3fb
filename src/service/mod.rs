// Copyright (c) 2025 - Cowboy AI, Inc.
//! Service Layer for Registration Workflows
//!
//! This module provides the application service layer that orchestrates
//! the aggregate, the repository and event delivery.
//!
//! # Architecture
//!
//! ```text
//! Client Request (HTTP, CLI; out of scope)
//!     ↓
//! Service Layer (this module)
//!     ↓
//! Mutation → Aggregate → Events
//!     ↓
//! Repository (atomic commit)
//!     ↓
//! NATS Publishing → mailers, account provisioning
//! ```
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use cim_registration::config::RegistrationConfig;
//! use cim_registration::publisher::InMemoryEventPublisher;
//! use cim_registration::repository::InMemoryRegistrationRepository;
//! use cim_registration::service::RegistrationService;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let service = RegistrationService::new(
//!     Arc::new(InMemoryRegistrationRepository::new()),
//!     Arc::new(InMemoryEventPublisher::new()),
//!     RegistrationConfig::default(),
//! );
//!
//! let registration = service.start_registration("student@example.edu").await?;
//! let code = registration.verification_code().as_str().to_string();
//!
//! let verified = service.verify_code("student@example.edu", &code).await?;
//! assert!(verified.is_status(cim_registration::domain::RegistrationStatus::Verified));
//! # Ok(())
//! # }
//! ```

pub mod registration;

pub use registration::{RegistrationService, ServiceError, ServiceResult};
