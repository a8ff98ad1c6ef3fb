// Copyright (c) 2025 - Cowboy AI, Inc.
//! Verification Code Value Object and Generator
//!
//! Codes are drawn from the operating system CSPRNG. Each character is
//! sampled independently and uniformly from `A-Z0-9` using rejection
//! sampling so no symbol is favoured.

use rand::rngs::OsRng;
use rand::TryRngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use subtle::ConstantTimeEq;

use crate::errors::{RegistrationError, RegistrationResult};

/// Symbols a verification code may contain
pub const CODE_ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

// Largest multiple of 36 that fits in a byte; bytes at or above are rejected.
const REJECTION_BOUND: u8 = 252;

/// Opaque verification code sent to the registrant
///
/// Equality against candidate input goes through [`VerificationCode::matches`],
/// which compares in constant time.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VerificationCode(String);

impl VerificationCode {
    /// Generate a fresh code of `length` characters
    ///
    /// # Errors
    /// Returns [`RegistrationError::CodeGeneration`] if the entropy source fails.
    pub fn generate(length: usize) -> RegistrationResult<Self> {
        let mut code = String::with_capacity(length);
        let mut buf = [0u8; 32];

        while code.len() < length {
            OsRng
                .try_fill_bytes(&mut buf)
                .map_err(|e| RegistrationError::CodeGeneration(e.to_string()))?;

            for byte in buf {
                if code.len() == length {
                    break;
                }
                if byte < REJECTION_BOUND {
                    code.push(CODE_ALPHABET[(byte % 36) as usize] as char);
                }
            }
        }

        Ok(Self(code))
    }

    /// Generate a code guaranteed to differ from `previous`
    pub fn generate_distinct(length: usize, previous: &VerificationCode) -> RegistrationResult<Self> {
        if length == 0 {
            return Err(RegistrationError::CodeGeneration(
                "code length must be positive".to_string(),
            ));
        }

        loop {
            let code = Self::generate(length)?;
            if !code.matches(previous.as_str()) {
                return Ok(code);
            }
        }
    }

    /// Wrap an already issued code (rehydration, tests)
    pub fn from_string(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Constant-time comparison against candidate input
    pub fn matches(&self, candidate: &str) -> bool {
        self.0.as_bytes().ct_eq(candidate.as_bytes()).into()
    }

    /// Get the code as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of characters
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the code is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// Codes are credentials; keep them out of debug output.
impl fmt::Debug for VerificationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("VerificationCode(******)")
    }
}
