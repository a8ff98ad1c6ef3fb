// Copyright (c) 2025 - Cowboy AI, Inc.
//! Uncommitted event accumulator
//!
//! Owned by exactly one aggregate instance. Events pile up here while a unit
//! of work runs; the persistence collaborator drains them only after the
//! aggregate state and events have been committed together.

use super::RegistrationEvent;

/// Ordered buffer of events not yet persisted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventRecorder {
    events: Vec<RegistrationEvent>,
}

impl EventRecorder {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event
    pub fn record(&mut self, event: RegistrationEvent) {
        self.events.push(event);
    }

    /// Recorded events, oldest first, without clearing
    pub fn peek(&self) -> &[RegistrationEvent] {
        &self.events
    }

    /// Most recently recorded event
    pub fn last(&self) -> Option<&RegistrationEvent> {
        self.events.last()
    }

    /// Take every recorded event, leaving the recorder empty
    pub fn drain(&mut self) -> Vec<RegistrationEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
