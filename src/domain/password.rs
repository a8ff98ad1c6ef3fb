// Copyright (c) 2025 - Cowboy AI, Inc.
//! Password and Password Hash Value Objects
//!
//! Raw passwords only ever live inside [`Password`], which wraps a
//! [`secrecy::Secret`]. The only thing that leaves the aggregate is the
//! Argon2id PHC string produced by [`Password::hash`].

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{self, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::PasswordHashingConfig;
use crate::errors::{RegistrationError, RegistrationResult};

/// Raw password supplied by the registrant
pub struct Password(Secret<String>);

impl Password {
    /// Wrap a raw password, rejecting empty input
    pub fn new(password: impl Into<String>) -> RegistrationResult<Self> {
        let password = password.into();
        if password.is_empty() {
            return Err(RegistrationError::EmptyField("password"));
        }
        Ok(Self(Secret::new(password)))
    }

    /// Hash with Argon2id and a fresh random salt
    pub fn hash(&self, config: &PasswordHashingConfig) -> RegistrationResult<PasswordHash> {
        let salt = SaltString::generate(&mut OsRng);

        hasher(config)?
            .hash_password(self.0.expose_secret().as_bytes(), &salt)
            .map(|hash| PasswordHash(hash.to_string()))
            .map_err(|e| RegistrationError::PasswordHashing(e.to_string()))
    }
}

impl AsRef<Secret<String>> for Password {
    fn as_ref(&self) -> &Secret<String> {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(******)")
    }
}

/// Argon2id hash in PHC string format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap an existing PHC string
    pub fn from_phc(phc: impl Into<String>) -> Self {
        Self(phc.into())
    }

    /// Get the PHC string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check a candidate password against this hash
    ///
    /// Cost parameters are read from the PHC string itself.
    pub fn verify(&self, candidate: &Password) -> RegistrationResult<bool> {
        let parsed = password_hash::PasswordHash::new(&self.0)
            .map_err(|e| RegistrationError::PasswordHashing(e.to_string()))?;

        match Argon2::default()
            .verify_password(candidate.0.expose_secret().as_bytes(), &parsed)
        {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(RegistrationError::PasswordHashing(e.to_string())),
        }
    }
}

fn hasher(config: &PasswordHashingConfig) -> RegistrationResult<Argon2<'static>> {
    let params = Params::new(
        config.memory_kib,
        config.iterations,
        config.parallelism,
        None,
    )
    .map_err(|e| RegistrationError::PasswordHashing(e.to_string()))?;

    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}
