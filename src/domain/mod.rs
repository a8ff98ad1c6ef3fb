// Copyright (c) 2025 - Cowboy AI, Inc.
//! Registration Domain Models
//!
//! Value objects with validation invariants used by the registration
//! aggregate. Each is validated once at construction; the aggregate never
//! re-validates them.
//!
//! # Value Objects
//!
//! - [`RegistrationId`] - UUID v7 aggregate identifier
//! - [`Email`] - validated, normalized email address
//! - [`VerificationCode`] - CSPRNG code with constant-time matching
//! - [`Password`] / [`PasswordHash`] - secret input and its Argon2id hash
//! - [`StudentProfile`] / [`StaffProfile`] - identity fields per principal type
//! - [`RegistrationStatus`] - lifecycle status

pub mod email;
pub mod password;
pub mod profile;
pub mod registration_id;
pub mod status;
pub mod verification_code;

pub use email::{Email, EmailError};
pub use password::{Password, PasswordHash};
pub use profile::{ProfileError, StaffProfile, StudentProfile};
pub use registration_id::RegistrationId;
pub use status::RegistrationStatus;
pub use verification_code::{VerificationCode, CODE_ALPHABET};
