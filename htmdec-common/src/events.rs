//! Event types for the HTMDEC event system
//!
//! Provides shared event definitions and the EventBus used as the
//! notification bus of the import engine.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Kind of resource announced by a `ResourceImported` event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Folder,
    Item,
}

/// Terminal state of a progress context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStatus {
    Success,
    Error,
}

/// HTMDEC event types
///
/// Events are broadcast via EventBus and can be serialized for SSE transmission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum HtmdecEvent {
    /// A folder or item was created (or reused) for a path on disk
    ///
    /// Triggers:
    /// - Downstream processors reacting to newly imported resources
    /// - SSE: Refresh the browsed folder
    ResourceImported {
        /// Folder or item id
        id: Uuid,
        resource_type: ResourceType,
        /// Source path on disk
        import_path: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// One filesystem entry visited by an import
    ImportProgress {
        /// Progress context id
        progress_id: Uuid,
        title: String,
        user_id: Uuid,
        /// Entry name
        message: String,
        /// Entries visited so far
        current: u64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Progress context closed; emitted exactly once per context
    ImportFinished {
        progress_id: Uuid,
        title: String,
        user_id: Uuid,
        status: ProgressStatus,
        /// Entries visited in total
        current: u64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl HtmdecEvent {
    /// Event name used as the SSE event type
    pub fn event_type(&self) -> &'static str {
        match self {
            HtmdecEvent::ResourceImported { .. } => "ResourceImported",
            HtmdecEvent::ImportProgress { .. } => "ImportProgress",
            HtmdecEvent::ImportFinished { .. } => "ImportFinished",
        }
    }
}

// ========================================
// EventBus Implementation
// ========================================

/// Central event distribution bus for application-wide events
///
/// The EventBus uses tokio::broadcast internally, providing:
/// - Non-blocking publish (slow subscribers don't block producers)
/// - Multiple concurrent subscribers
/// - Lagged message detection for slow subscribers
///
/// Publishing does not need a running runtime, so the synchronous import
/// walker emits directly.
///
/// # Examples
///
/// ```
/// use htmdec_common::events::{EventBus, HtmdecEvent, ResourceType};
///
/// let event_bus = EventBus::new(100);
/// let mut rx = event_bus.subscribe();
///
/// event_bus.emit_lossy(HtmdecEvent::ResourceImported {
///     id: uuid::Uuid::new_v4(),
///     resource_type: ResourceType::Item,
///     import_path: "/data/sample.tif".to_string(),
///     timestamp: chrono::Utc::now(),
/// });
///
/// assert!(rx.try_recv().is_ok());
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<HtmdecEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// * `capacity` - Number of events to buffer before dropping old events
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<HtmdecEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: HtmdecEvent,
    ) -> Result<usize, broadcast::error::SendError<HtmdecEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    ///
    /// Fire-and-forget: the import engine never waits for acknowledgment.
    pub fn emit_lossy(&self, event: HtmdecEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
