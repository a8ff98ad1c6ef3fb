// Copyright (c) 2025 - Cowboy AI, Inc.
//! Identity fields supplied when a registration is completed
//!
//! Groups and positions belong to the organization model; registrations only
//! carry their identifiers.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Profile validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProfileError {
    #[error("Field {0} must not be empty")]
    EmptyField(&'static str),

    #[error("Field {field} exceeds maximum length of {max} characters")]
    TooLong { field: &'static str, max: usize },
}

/// Maximum length of any single name field
pub const MAX_NAME_LENGTH: usize = 100;

/// Identity of a student account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentProfile {
    /// Student card barcode, unique per active account
    pub barcode: String,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
    /// Study group the student belongs to
    pub group_id: Uuid,
}

impl StudentProfile {
    /// Build a profile, trimming and validating every text field
    pub fn new(
        barcode: impl AsRef<str>,
        first_name: impl AsRef<str>,
        last_name: impl AsRef<str>,
        middle_name: Option<&str>,
        group_id: Uuid,
    ) -> Result<Self, ProfileError> {
        Ok(Self {
            barcode: required("barcode", barcode.as_ref())?,
            first_name: required("first_name", first_name.as_ref())?,
            last_name: required("last_name", last_name.as_ref())?,
            middle_name: optional("middle_name", middle_name)?,
            group_id,
        })
    }

    /// Re-check invariants on a profile built field by field
    pub fn validate(&self) -> Result<(), ProfileError> {
        required("barcode", &self.barcode)?;
        required("first_name", &self.first_name)?;
        required("last_name", &self.last_name)?;
        optional("middle_name", self.middle_name.as_deref())?;
        Ok(())
    }
}

/// Identity of a staff account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffProfile {
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
    /// Job title as shown in the directory
    pub position: String,
}

impl StaffProfile {
    /// Build a profile, trimming and validating every text field
    pub fn new(
        first_name: impl AsRef<str>,
        last_name: impl AsRef<str>,
        middle_name: Option<&str>,
        position: impl AsRef<str>,
    ) -> Result<Self, ProfileError> {
        Ok(Self {
            first_name: required("first_name", first_name.as_ref())?,
            last_name: required("last_name", last_name.as_ref())?,
            middle_name: optional("middle_name", middle_name)?,
            position: required("position", position.as_ref())?,
        })
    }

    /// Re-check invariants on a profile built field by field
    pub fn validate(&self) -> Result<(), ProfileError> {
        required("first_name", &self.first_name)?;
        required("last_name", &self.last_name)?;
        optional("middle_name", self.middle_name.as_deref())?;
        required("position", &self.position)?;
        Ok(())
    }
}

fn required(field: &'static str, value: &str) -> Result<String, ProfileError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ProfileError::EmptyField(field));
    }
    if value.chars().count() > MAX_NAME_LENGTH {
        return Err(ProfileError::TooLong {
            field,
            max: MAX_NAME_LENGTH,
        });
    }
    Ok(value.to_string())
}

fn optional(field: &'static str, value: Option<&str>) -> Result<Option<String>, ProfileError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => required(field, v).map(Some),
    }
}
