//! In-process event bus backed by a `tokio::sync::broadcast` channel.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use upkeep_core::types::DbId;

// ---------------------------------------------------------------------------
// MaintenanceEvent
// ---------------------------------------------------------------------------

/// A domain event emitted by the maintenance engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceEvent {
    /// Dot-separated event name, e.g. `"pm.reminder.three_day"`.
    pub event_type: String,

    /// The schedule the event concerns, if any.
    pub schedule_id: Option<DbId>,

    /// The equipment the event concerns, if any.
    pub equipment_id: Option<DbId>,

    /// Free-form JSON payload carrying event-specific data.
    pub payload: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl MaintenanceEvent {
    /// Create a new event with only the required `event_type`.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            schedule_id: None,
            equipment_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    /// Attach the schedule and its equipment to the event.
    pub fn with_schedule(mut self, schedule_id: DbId, equipment_id: DbId) -> Self {
        self.schedule_id = Some(schedule_id);
        self.equipment_id = Some(equipment_id);
        self
    }

    /// Set the JSON payload for the event.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so any number of subscribers independently
/// receive every published [`MaintenanceEvent`]. Shared as `Arc<EventBus>`.
pub struct EventBus {
    sender: broadcast::Sender<MaintenanceEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest un-consumed messages are dropped
    /// and slow receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// With zero subscribers the event is silently dropped; publication is
    /// fire-and-forget.
    pub fn publish(&self, event: MaintenanceEvent) {
        let _ = self.sender.send(event);
    }

    /// Create a new subscription receiving all events published after this
    /// call.
    pub fn subscribe(&self) -> broadcast::Receiver<MaintenanceEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
