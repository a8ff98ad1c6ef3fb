// Copyright (c) 2025 - Cowboy AI, Inc.
//! Delivery of committed events to notification collaborators
//!
//! Publishers only ever see events the repository has already committed.
//! A publish failure does not roll anything back.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use crate::errors::MessagingResult;
use crate::events::RegistrationEvent;
use crate::nats::NatsClient;
use crate::subjects::{subject_for, REGISTRATION_ROOT};

/// Port for publishing committed registration events
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish events in commit order
    async fn publish(&self, events: &[RegistrationEvent]) -> MessagingResult<()>;
}

/// Publishes each event as JSON on `registration.{event_type}.{id}`
#[derive(Clone)]
pub struct NatsEventPublisher {
    client: NatsClient,
    subject_root: String,
}

impl NatsEventPublisher {
    pub fn new(client: NatsClient, subject_root: impl Into<String>) -> Self {
        Self {
            client,
            subject_root: subject_root.into(),
        }
    }
}

#[async_trait]
impl EventPublisher for NatsEventPublisher {
    async fn publish(&self, events: &[RegistrationEvent]) -> MessagingResult<()> {
        for event in events {
            let subject = subject_for(&self.subject_root, event);
            self.client.publish(&subject, event).await?;
            debug!(
                event_id = %event.event_id(),
                event_type = event.event_type_name(),
                subject = %subject,
                "Published registration event"
            );
        }
        Ok(())
    }
}

/// Collects published events in memory
///
/// Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventPublisher {
    published: Arc<Mutex<Vec<(String, RegistrationEvent)>>>,
}

impl InMemoryEventPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Published events, oldest first
    pub async fn events(&self) -> Vec<RegistrationEvent> {
        self.published
            .lock()
            .await
            .iter()
            .map(|(_, event)| event.clone())
            .collect()
    }

    /// Subjects events were published to, oldest first
    pub async fn subjects(&self) -> Vec<String> {
        self.published
            .lock()
            .await
            .iter()
            .map(|(subject, _)| subject.clone())
            .collect()
    }

    /// Drop everything collected so far
    pub async fn clear(&self) {
        self.published.lock().await.clear();
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventPublisher {
    async fn publish(&self, events: &[RegistrationEvent]) -> MessagingResult<()> {
        let mut published = self.published.lock().await;
        for event in events {
            published.push((subject_for(REGISTRATION_ROOT, event), event.clone()));
        }
        Ok(())
    }
}
