//! Event bus abstraction for hirelane admin notifications.
//!
//! When a job report or a contact message is filed, the server publishes an
//! event so connected admin dashboards can refresh their unseen counters
//! live. The trait allows different implementations for broadcasting
//! across server replicas:
//! - Memory (single server, tokio broadcast channels)
//! - Redis (multi-server, Redis pub/sub)

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use thiserror::Error;

/// Which admin-facing collection received an insert
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    JobReport,
    ContactMessage,
}

/// Event pushed to connected admin clients
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub kind: NotificationKind,
    /// Unseen count of that kind at publish time.
    pub unseen: i64,
    pub timestamp: i64,
}

/// Error type for event bus operations
#[derive(Debug, Error)]
pub enum EventBusError {
    #[error("backend error: {0}")]
    Backend(String),
}

/// Stream of notification events
pub type EventStream = Pin<Box<dyn Stream<Item = NotificationEvent> + Send>>;

/// Event bus trait for publishing and subscribing to notification events.
///
/// Delivery is fire-and-forget: a publish with no subscribers is not an
/// error, and a slow subscriber may miss events (it should re-read the
/// counters on reconnect).
#[async_trait]
pub trait EventBus: Send + Sync {
    /// Broadcast an event to all subscribed admin clients.
    async fn publish(&self, event: NotificationEvent) -> Result<(), EventBusError>;

    /// Subscribe to notification events.
    ///
    /// Returns a stream that yields events as they occur.
    /// The stream will continue until dropped or the connection is closed.
    async fn subscribe(&self) -> Result<EventStream, EventBusError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_equality() {
        assert_eq!(NotificationKind::JobReport, NotificationKind::JobReport);
        assert_ne!(NotificationKind::JobReport, NotificationKind::ContactMessage);
    }

    #[test]
    fn event_serialization_roundtrip() {
        let event = NotificationEvent {
            kind: NotificationKind::ContactMessage,
            unseen: 7,
            timestamp: 1234567890,
        };

        let json = serde_json::to_string(&event).unwrap();
        let deserialized: NotificationEvent = serde_json::from_str(&json).unwrap();

        assert_eq!(event.kind, deserialized.kind);
        assert_eq!(event.unseen, deserialized.unseen);
        assert_eq!(event.timestamp, deserialized.timestamp);
    }

    #[test]
    fn kind_serde_snake_case() {
        let json = serde_json::to_string(&NotificationKind::JobReport).unwrap();
        assert_eq!(json, "\"job_report\"");
    }

    #[test]
    fn error_display() {
        let error = EventBusError::Backend("channel closed".to_string());
        assert!(error.to_string().contains("backend error"));
        assert!(error.to_string().contains("channel closed"));
    }
}
