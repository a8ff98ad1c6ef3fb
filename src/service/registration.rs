// Copyright (c) 2025 - Cowboy AI, Inc.
//! Registration Service Layer
//!
//! # Transaction Semantics
//!
//! Each service method is a transaction:
//! 1. Read the clock once (completions first hash the password on the
//!    blocking pool)
//! 2. Build the command
//! 3. Run it through the repository's mutation protocol
//! 4. Publish the committed events to NATS
//! 5. Report the persistent failure, if the mutation had one
//!
//! Step 5 comes after step 4 so notification collaborators hear about
//! `RegistrationFailed` even though the caller gets an error.

use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument, warn, Span};
use uuid::Uuid;

use crate::aggregate::*;
use crate::clock::{Clock, SystemClock};
use crate::config::RegistrationConfig;
use crate::domain::{
    Email, Password, PasswordHash, RegistrationId, StaffProfile, StudentProfile,
};
use crate::errors::{MessagingError, RegistrationError};
use crate::events::RegistrationEvent;
use crate::publisher::EventPublisher;
use crate::repository::{CommitReceipt, RegistrationRepository, RepositoryError};

/// Service layer result type
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service layer errors
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The aggregate refused the operation
    #[error(transparent)]
    Registration(#[from] RegistrationError),

    /// Storage failed or the key was unknown
    #[error("Repository error: {0}")]
    Repository(RepositoryError),

    /// Events were committed but could not be delivered
    #[error("Messaging error: {0}")]
    Messaging(#[from] MessagingError),
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Rejected(error) => ServiceError::Registration(error),
            other => ServiceError::Repository(other),
        }
    }
}

impl ServiceError {
    /// Aggregate error behind this failure, if any
    pub fn registration_error(&self) -> Option<&RegistrationError> {
        match self {
            ServiceError::Registration(error) => Some(error),
            _ => None,
        }
    }

    /// Whether the key matched no registration
    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::Repository(RepositoryError::NotFound(_)))
    }
}

/// Application service for registration workflows
pub struct RegistrationService<R, P> {
    repository: Arc<R>,
    publisher: Arc<P>,
    clock: Arc<dyn Clock>,
    config: RegistrationConfig,
}

impl<R, P> RegistrationService<R, P>
where
    R: RegistrationRepository,
    P: EventPublisher,
{
    /// Create a service reading the wall clock
    pub fn new(repository: Arc<R>, publisher: Arc<P>, config: RegistrationConfig) -> Self {
        Self::with_clock(repository, publisher, config, Arc::new(SystemClock))
    }

    /// Create a service with an explicit time source
    pub fn with_clock(
        repository: Arc<R>,
        publisher: Arc<P>,
        config: RegistrationConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            publisher,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &RegistrationConfig {
        &self.config
    }

    /// Issue a registration and send its first code
    ///
    /// Checking that no active account already owns the email is the
    /// caller's responsibility.
    #[instrument(skip(self))]
    pub async fn start_registration(&self, email: &str) -> ServiceResult<Registration> {
        let command = IssueRegistrationCommand {
            email: email.to_string(),
            timestamp: self.clock.now(),
            correlation_id: Uuid::now_v7(),
        };

        let registration = Registration::issue(command, &self.config)?;
        let receipt = self.repository.save(registration).await?;
        self.publish(&receipt.events).await?;

        info!(
            registration_id = %receipt.registration.id(),
            "Registration started"
        );
        Ok(receipt.registration)
    }

    /// Verify email ownership
    #[instrument(skip(self, code))]
    pub async fn verify_code(&self, email: &str, code: &str) -> ServiceResult<Registration> {
        let command = VerifyCodeCommand {
            code: code.to_string(),
            timestamp: self.clock.now(),
            correlation_id: Uuid::now_v7(),
        };
        self.execute(email, command).await
    }

    /// Re-check a code on a verified registration
    #[instrument(skip(self, code))]
    pub async fn check_code(&self, email: &str, code: &str) -> ServiceResult<Registration> {
        let command = CheckCodeCommand {
            code: code.to_string(),
            timestamp: self.clock.now(),
            correlation_id: Uuid::now_v7(),
        };
        self.execute(email, command).await
    }

    /// Issue a replacement code
    #[instrument(skip(self))]
    pub async fn resend_code(&self, email: &str) -> ServiceResult<Registration> {
        let command = ResendCodeCommand {
            timestamp: self.clock.now(),
            correlation_id: Uuid::now_v7(),
        };
        self.execute(email, command).await
    }

    /// Create a student account
    #[instrument(skip(self, code, profile, password))]
    pub async fn complete_student_registration(
        &self,
        email: &str,
        code: &str,
        profile: StudentProfile,
        password: Password,
    ) -> ServiceResult<Registration> {
        let password_hash = self.hash_password(password).await?;
        let command = CompleteStudentRegistrationCommand {
            code: code.to_string(),
            profile,
            password_hash,
            timestamp: self.clock.now(),
            correlation_id: Uuid::now_v7(),
        };
        self.execute(email, command).await
    }

    /// Create a staff account
    #[instrument(skip(self, code, profile, password))]
    pub async fn complete_staff_registration(
        &self,
        email: &str,
        code: &str,
        profile: StaffProfile,
        password: Password,
    ) -> ServiceResult<Registration> {
        let password_hash = self.hash_password(password).await?;
        let command = CompleteStaffRegistrationCommand {
            code: code.to_string(),
            profile,
            password_hash,
            timestamp: self.clock.now(),
            correlation_id: Uuid::now_v7(),
        };
        self.execute(email, command).await
    }

    /// Most recent registration for an email
    pub async fn registration_by_email(&self, email: &str) -> ServiceResult<Registration> {
        let email = Email::new(email).map_err(RegistrationError::from)?;
        Ok(self.repository.find_by_email(&email).await?)
    }

    /// Registration by identifier
    pub async fn registration_by_id(&self, id: RegistrationId) -> ServiceResult<Registration> {
        Ok(self.repository.find_by_id(id).await?)
    }

    /// Hash on the blocking pool so Argon2 never stalls the executor
    #[instrument(name = "Computing password hash", skip_all)]
    async fn hash_password(&self, password: Password) -> ServiceResult<PasswordHash> {
        let hashing = self.config.password_hashing;
        let current_span = Span::current();

        let hash = tokio::task::spawn_blocking(move || {
            current_span.in_scope(|| password.hash(&hashing))
        })
        .await
        .map_err(|e| RegistrationError::PasswordHashing(e.to_string()))??;

        Ok(hash)
    }

    async fn execute(
        &self,
        email: &str,
        command: impl RegistrationCommand + 'static,
    ) -> ServiceResult<Registration> {
        let email = Email::new(email).map_err(RegistrationError::from)?;
        let mutation = Mutation::new(command, &self.config);
        let operation = mutation.name();

        let receipt = match self.repository.mutate_by_email(&email, &mutation).await {
            Ok(receipt) => receipt,
            Err(err) => {
                warn!(operation, error = %err, "Registration operation rejected");
                return Err(err.into());
            }
        };

        self.publish(&receipt.events).await?;
        log_outcome(operation, &receipt);

        Ok(receipt.into_result()?)
    }

    async fn publish(&self, events: &[RegistrationEvent]) -> ServiceResult<()> {
        if events.is_empty() {
            return Ok(());
        }
        if let Err(err) = self.publisher.publish(events).await {
            warn!(error = %err, events = events.len(), "Committed events were not delivered");
            return Err(err.into());
        }
        Ok(())
    }
}

fn log_outcome(operation: &'static str, receipt: &CommitReceipt) {
    let registration_id = receipt.registration.id();
    let status = receipt.registration.status();

    match &receipt.failure {
        Some(error) => warn!(
            operation,
            %registration_id,
            %status,
            attempts = receipt.registration.code_attempts(),
            error = %error,
            "Registration operation failed after committing state"
        ),
        None if receipt.events.is_empty() => info!(
            operation,
            %registration_id,
            %status,
            "Registration unchanged"
        ),
        None => info!(
            operation,
            %registration_id,
            %status,
            version = receipt.version,
            "Registration updated"
        ),
    }
}
