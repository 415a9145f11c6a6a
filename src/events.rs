//! Data-change notifications between list views.
//!
//! A mutation made through one controller publishes
//! [`DeskEvent::DataChanged`]; any view showing the same resource
//! re-fetches when it sees the event. Dropping a [`Subscription`]
//! unsubscribes.

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

const DEFAULT_CAPACITY: usize = 64;

/// Event published on the bus
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeskEvent {
    /// Records of a resource were created, updated or deleted
    DataChanged { resource: String },
}

impl DeskEvent {
    pub fn data_changed(resource: impl Into<String>) -> Self {
        DeskEvent::DataChanged {
            resource: resource.into(),
        }
    }

    pub fn resource(&self) -> &str {
        match self {
            DeskEvent::DataChanged { resource } => resource,
        }
    }
}

/// Broadcast bus; clones share the same channel
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<DeskEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish to current subscribers; returns how many will see it
    pub fn publish(&self, event: DeskEvent) -> usize {
        tracing::debug!(resource = event.resource(), "publishing data change");
        // Sending fails only when nobody is subscribed.
        self.sender.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Receiving end of the bus
#[derive(Debug)]
pub struct Subscription {
    receiver: broadcast::Receiver<DeskEvent>,
}

impl Subscription {
    /// Next event, skipping any the subscriber fell behind on.
    ///
    /// Returns `None` once every `EventBus` handle is dropped.
    pub async fn recv(&mut self) -> Option<DeskEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event subscriber lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Next event if one is already queued
    pub fn try_recv(&mut self) -> Option<DeskEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event subscriber lagged");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }
}
