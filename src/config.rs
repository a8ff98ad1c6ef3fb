// Copyright (c) 2025 - Cowboy AI, Inc.
//! Registration configuration
//!
//! Defaults match the production policy: 6-character codes valid for
//! 10 minutes, a 1 minute resend cool-down and 3 verification attempts.
//! Every value can be overridden from the environment.

use chrono::TimeDelta;

use crate::errors::ConfigError;

/// Upper bound for `code_ttl` and `resend_cooldown`, in seconds (one day)
pub const MAX_POLICY_SECONDS: i64 = 24 * 60 * 60;

/// Password hashing parameters (Argon2id)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHashingConfig {
    /// Memory cost in KiB
    pub memory_kib: u32,

    /// Number of passes
    pub iterations: u32,

    /// Degree of parallelism
    pub parallelism: u32,
}

impl Default for PasswordHashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: 15000,
            iterations: 2,
            parallelism: 1,
        }
    }
}

/// Policy applied by the registration aggregate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationConfig {
    /// Verification code length in characters
    pub code_length: usize,

    /// How long an issued code stays valid
    pub code_ttl: TimeDelta,

    /// Minimum wait between code (re)issuances
    pub resend_cooldown: TimeDelta,

    /// Failed comparisons allowed before the registration expires
    pub max_code_attempts: u8,

    /// Password hashing cost
    pub password_hashing: PasswordHashingConfig,
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            code_length: 6,
            code_ttl: TimeDelta::minutes(10),
            resend_cooldown: TimeDelta::minutes(1),
            max_code_attempts: 3,
            password_hashing: PasswordHashingConfig::default(),
        }
    }
}

impl RegistrationConfig {
    /// Load configuration from environment variables
    ///
    /// Unset variables fall back to [`RegistrationConfig::default`].
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let code_length = env_or("REGISTRATION_CODE_LENGTH", defaults.code_length)?;
        let code_ttl = env_seconds_or("REGISTRATION_CODE_TTL_SECS", defaults.code_ttl)?;
        let resend_cooldown =
            env_seconds_or("REGISTRATION_RESEND_COOLDOWN_SECS", defaults.resend_cooldown)?;
        let max_code_attempts =
            env_or("REGISTRATION_MAX_CODE_ATTEMPTS", defaults.max_code_attempts)?;

        let password_hashing = PasswordHashingConfig {
            memory_kib: env_or(
                "REGISTRATION_ARGON2_MEMORY_KIB",
                defaults.password_hashing.memory_kib,
            )?,
            iterations: env_or(
                "REGISTRATION_ARGON2_ITERATIONS",
                defaults.password_hashing.iterations,
            )?,
            parallelism: env_or(
                "REGISTRATION_ARGON2_PARALLELISM",
                defaults.password_hashing.parallelism,
            )?,
        };

        let config = Self {
            code_length,
            code_ttl,
            resend_cooldown,
            max_code_attempts,
            password_hashing,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that all values are usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.code_length == 0 {
            return Err(ConfigError::NotPositive("code_length"));
        }
        if self.code_ttl <= TimeDelta::zero() {
            return Err(ConfigError::NotPositive("code_ttl"));
        }
        if self.resend_cooldown <= TimeDelta::zero() {
            return Err(ConfigError::NotPositive("resend_cooldown"));
        }
        let max = TimeDelta::seconds(MAX_POLICY_SECONDS);
        if self.code_ttl > max {
            return Err(too_large("code_ttl"));
        }
        if self.resend_cooldown > max {
            return Err(too_large("resend_cooldown"));
        }
        if self.max_code_attempts == 0 {
            return Err(ConfigError::NotPositive("max_code_attempts"));
        }

        argon2::Params::new(
            self.password_hashing.memory_kib,
            self.password_hashing.iterations,
            self.password_hashing.parallelism,
            None,
        )
        .map_err(|e| ConfigError::PasswordHashing(e.to_string()))?;

        Ok(())
    }
}

fn too_large(name: &'static str) -> ConfigError {
    ConfigError::TooLarge {
        name,
        max_seconds: MAX_POLICY_SECONDS,
    }
}

fn env_or<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
        Err(_) => Ok(default),
    }
}

fn env_seconds_or(name: &'static str, default: TimeDelta) -> Result<TimeDelta, ConfigError> {
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(TimeDelta::try_seconds)
            .ok_or(ConfigError::InvalidValue { name, value }),
        Err(_) => Ok(default),
    }
}
