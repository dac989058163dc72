// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Event Bus Implementation - Pub/Sub for Role Events
//
// In-memory broadcast of role lifecycle and containment events to observers
// (audit sinks, CLI output). Events published without subscribers are dropped.

use crate::domain::events::RoleEvent;
use crate::domain::role::RoleName;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Event bus for publishing and subscribing to role events
#[derive(Clone)]
pub struct EventBus {
    sender: Arc<broadcast::Sender<RoleEvent>>,
}

impl EventBus {
    /// Create a new event bus with specified channel capacity
    /// Capacity determines how many events can be buffered before dropping old ones
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Create event bus with default capacity (256)
    pub fn with_default_capacity() -> Self {
        Self::new(256)
    }

    /// Publish a role event to all subscribers
    pub fn publish(&self, event: RoleEvent) {
        debug!("Publishing event: {:?}", event);

        let receiver_count = self.sender.send(event).unwrap_or(0);

        if receiver_count == 0 {
            debug!("No subscribers listening to event");
        }
    }

    /// Subscribe to all role events
    pub fn subscribe(&self) -> EventReceiver {
        EventReceiver {
            receiver: self.sender.subscribe(),
            role: None,
        }
    }

    /// Subscribe to lifecycle events of a single role.
    /// Containment events carry no role and are filtered out.
    pub fn subscribe_role(&self, role: RoleName) -> EventReceiver {
        EventReceiver {
            receiver: self.sender.subscribe(),
            role: Some(role),
        }
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

/// Receiver for role events, optionally filtered by role
pub struct EventReceiver {
    receiver: broadcast::Receiver<RoleEvent>,
    role: Option<RoleName>,
}

impl EventReceiver {
    /// Receive the next matching event (waits until one is available)
    pub async fn recv(&mut self) -> Result<RoleEvent, EventBusError> {
        loop {
            let event = self.receiver.recv().await.map_err(|e| match e {
                broadcast::error::RecvError::Closed => EventBusError::Closed,
                broadcast::error::RecvError::Lagged(n) => {
                    warn!("Event receiver lagged by {} events", n);
                    EventBusError::Lagged(n)
                }
            })?;

            if self.matches(&event) {
                return Ok(event);
            }
        }
    }

    /// Try to receive a matching event without waiting
    pub fn try_recv(&mut self) -> Result<RoleEvent, EventBusError> {
        loop {
            let event = self.receiver.try_recv().map_err(|e| match e {
                broadcast::error::TryRecvError::Empty => EventBusError::Empty,
                broadcast::error::TryRecvError::Closed => EventBusError::Closed,
                broadcast::error::TryRecvError::Lagged(n) => {
                    warn!("Event receiver lagged by {} events", n);
                    EventBusError::Lagged(n)
                }
            })?;

            if self.matches(&event) {
                return Ok(event);
            }
        }
    }

    /// Drain every event currently buffered for this receiver
    pub fn drain(&mut self) -> Vec<RoleEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.try_recv() {
            events.push(event);
        }
        events
    }

    fn matches(&self, event: &RoleEvent) -> bool {
        let Some(wanted) = &self.role else {
            return true;
        };
        match event {
            RoleEvent::RoleCreated { role, .. } => role == wanted,
            RoleEvent::CapabilitiesReconciled { role, .. } => role == wanted,
            RoleEvent::RoleRemoved { role, .. } => role == wanted,
            RoleEvent::ManagementDenied { .. } => false,
        }
    }
}

/// Errors that can occur when receiving events
#[derive(Debug, thiserror::Error)]
pub enum EventBusError {
    #[error("Event bus is closed")]
    Closed,

    #[error("No events available")]
    Empty,

    #[error("Receiver lagged by {0} events (events were dropped)")]
    Lagged(u64),
}
