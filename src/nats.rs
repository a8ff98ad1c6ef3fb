//! NATS client abstraction for registration event delivery

use async_nats::{Client, ConnectOptions, Subscriber};
use futures::stream::BoxStream;
use futures::StreamExt;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::errors::{MessagingError, MessagingResult};
use crate::events::RegistrationEvent;
use crate::subjects::REGISTRATION_ROOT;

/// Configuration for NATS connection
#[derive(Debug, Clone)]
pub struct NatsConfig {
    /// NATS server URLs
    pub servers: Vec<String>,
    /// Client name
    pub name: String,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Request timeout
    pub request_timeout: Duration,
    /// Root token of every published subject
    pub subject_root: String,
}

impl Default for NatsConfig {
    fn default() -> Self {
        Self {
            servers: vec!["nats://localhost:4222".to_string()],
            name: "cim-registration".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(5),
            subject_root: REGISTRATION_ROOT.to_string(),
        }
    }
}

impl NatsConfig {
    /// Defaults overridden by `NATS_URL` (comma separated),
    /// `NATS_CLIENT_NAME` and `REGISTRATION_SUBJECT_ROOT`
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(urls) = std::env::var("NATS_URL") {
            let servers: Vec<String> = urls
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
            if !servers.is_empty() {
                config.servers = servers;
            }
        }
        if let Ok(name) = std::env::var("NATS_CLIENT_NAME") {
            config.name = name;
        }
        if let Ok(root) = std::env::var("REGISTRATION_SUBJECT_ROOT") {
            config.subject_root = root;
        }

        config
    }
}

/// Decoded registration events from a subscription
pub type EventStream = BoxStream<'static, MessagingResult<RegistrationEvent>>;

/// NATS client wrapper providing registration-specific operations
#[derive(Clone)]
pub struct NatsClient {
    client: Client,
}

impl NatsClient {
    /// Create a new NATS client with the given configuration
    pub async fn new(config: &NatsConfig) -> MessagingResult<Self> {
        let connect_options = ConnectOptions::new()
            .name(&config.name)
            .connection_timeout(config.connect_timeout)
            .request_timeout(Some(config.request_timeout));

        let client = async_nats::connect_with_options(config.servers.join(","), connect_options)
            .await
            .map_err(|e| MessagingError::NatsConnection(e.to_string()))?;

        info!("Connected to NATS at {:?}", config.servers);

        Ok(Self { client })
    }

    /// Publish a message to a subject
    pub async fn publish<T>(&self, subject: &str, message: &T) -> MessagingResult<()>
    where
        T: Serialize,
    {
        let payload = serde_json::to_vec(message)?;

        self.client
            .publish(subject.to_string(), payload.into())
            .await
            .map_err(|e| MessagingError::NatsPublish(e.to_string()))?;

        debug!("Published message to subject: {}", subject);
        Ok(())
    }

    /// Subscribe to a subject
    pub async fn subscribe(&self, subject: &str) -> MessagingResult<Subscriber> {
        let subscriber = self
            .client
            .subscribe(subject.to_string())
            .await
            .map_err(|e| MessagingError::NatsSubscribe(e.to_string()))?;

        info!("Subscribed to subject: {}", subject);
        Ok(subscriber)
    }

    /// Subscribe and decode every message as a [`RegistrationEvent`]
    pub async fn subscribe_events(
        &self,
        subject: &str,
    ) -> MessagingResult<EventStream> {
        let subscriber = self.subscribe(subject).await?;

        Ok(subscriber
            .map(|msg| {
                serde_json::from_slice::<RegistrationEvent>(&msg.payload)
                    .map_err(|e| MessagingError::Deserialization(e.to_string()))
            })
            .boxed())
    }

    /// Flush buffered publishes to the server
    pub async fn flush(&self) -> MessagingResult<()> {
        self.client
            .flush()
            .await
            .map_err(|e| MessagingError::NatsPublish(e.to_string()))
    }

    /// Get the underlying NATS client for advanced operations
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

/// Consumer of committed registration events (mailers, account provisioning)
#[async_trait::async_trait]
pub trait RegistrationEventHandler: Send + Sync {
    /// Handle one event
    async fn handle(&self, event: RegistrationEvent) -> MessagingResult<()>;

    /// Get the subject this handler subscribes to
    fn subject(&self) -> String;
}

/// Runs handlers against their subscriptions
pub struct EventProcessor {
    client: NatsClient,
}

impl EventProcessor {
    /// Create a new event processor
    pub fn new(client: NatsClient) -> Self {
        Self { client }
    }

    /// Start processing events for a handler in a background task
    ///
    /// Handler failures and undecodable messages are logged and skipped.
    pub async fn run_handler<H>(&self, handler: Arc<H>) -> MessagingResult<JoinHandle<()>>
    where
        H: RegistrationEventHandler + 'static,
    {
        let subject = handler.subject();
        let mut events = self.client.subscribe_events(&subject).await?;

        Ok(tokio::spawn(async move {
            while let Some(next) = events.next().await {
                match next {
                    Ok(event) => {
                        if let Err(e) = handler.handle(event).await {
                            error!("Handler error for subject {}: {}", subject, e);
                        }
                    }
                    Err(e) => {
                        error!("Failed to deserialize event on {}: {}", subject, e);
                    }
                }
            }
        }))
    }
}
