//! In-memory event bus implementation using tokio broadcast channels.
//!
//! This implementation is suitable for:
//! - Single server deployments
//! - Development and testing
//!
//! Events are only broadcast within a single process. If you have multiple
//! server replicas, they will NOT receive each other's events.

use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

use hirelane_events::{EventBus, EventBusError, EventStream, NotificationEvent};

const CHANNEL_CAPACITY: usize = 100;

/// In-memory event bus backed by a single tokio broadcast channel.
pub struct MemoryEventBus {
    tx: broadcast::Sender<NotificationEvent>,
}

impl MemoryEventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }
}

impl Default for MemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventBus for MemoryEventBus {
    async fn publish(&self, event: NotificationEvent) -> Result<(), EventBusError> {
        // Ignore error if no receivers (this is fine)
        let _ = self.tx.send(event);
        Ok(())
    }

    async fn subscribe(&self) -> Result<EventStream, EventBusError> {
        let rx = self.tx.subscribe();

        // Filter out lagged errors (happens when a receiver can't keep up).
        // A client that fell behind should re-read the counters.
        let stream = BroadcastStream::new(rx).filter_map(|result| result.ok());

        Ok(Box::pin(stream))
    }
}
