//! The Status Event Bus: a process-wide map from gear id to a
//! set of SSE subscribers, fed by the gear processing pipeline at
//! `processing`/`complete`/`error` transition points. Generalized from
//! `orchestrator::api::ws::pool::ConnectionPool` (a flat `DashMap`-keyed
//! registry with atomic counters) into a two-level `DashMap` so publish
//! fans out per-gear instead of globally.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;
use uuid::Uuid;

pub const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Connected,
    Processing,
    Complete,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusEvent {
    pub status: StatusKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl StatusEvent {
    pub fn connected() -> Self {
        Self { status: StatusKind::Connected, data: None }
    }

    pub fn processing(data: Value) -> Self {
        Self { status: StatusKind::Processing, data: Some(data) }
    }

    pub fn complete(data: Value) -> Self {
        Self { status: StatusKind::Complete, data: Some(data) }
    }

    pub fn error(data: Value) -> Self {
        Self { status: StatusKind::Error, data: Some(data) }
    }
}

type SubscriberId = String;

/// Per-gear set of SSE subscribers. `subscribe` returns a receiver that the
/// caller adapts into a `text/event-stream` response; `publish` fans an
/// event out to every live subscriber of a gear, pruning any whose receiver
/// has gone away.
#[derive(Default)]
pub struct StatusBus {
    gears: DashMap<String, DashMap<SubscriberId, mpsc::Sender<StatusEvent>>>,
}

impl StatusBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new subscriber for `gear_id` and returns its receiver,
    /// already primed with a `connected` event.
    pub fn subscribe(&self, gear_id: &str) -> mpsc::Receiver<StatusEvent> {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let subscriber_id = Uuid::new_v4().to_string();

        // Best-effort: a full channel on first send would indicate a
        // misconfigured capacity, never actual backpressure from a fresh
        // subscriber, so this is fine to drop silently via try_send.
        let _ = tx.try_send(StatusEvent::connected());

        self.gears.entry(gear_id.to_string()).or_default().insert(subscriber_id, tx);
        rx
    }

    /// Publishes `event` to every live subscriber of `gear_id`. Write
    /// failures (channel closed) remove that subscriber; if the set empties
    /// as a result, the gear's map entry is deleted entirely.
    pub fn publish(&self, gear_id: &str, event: StatusEvent) {
        let Some(subscribers) = self.gears.get(gear_id) else { return };

        let mut dead = Vec::new();
        for entry in subscribers.iter() {
            if entry.value().try_send(event.clone()).is_err() {
                dead.push(entry.key().clone());
            }
        }
        drop(subscribers);

        if !dead.is_empty() {
            if let Some(subscribers) = self.gears.get(gear_id) {
                for id in dead {
                    subscribers.remove(&id);
                }
            }
        }

        let should_remove = self.gears.get(gear_id).map(|s| s.is_empty()).unwrap_or(false);
        if should_remove {
            self.gears.remove(gear_id);
        }
    }

    pub fn subscriber_count(&self, gear_id: &str) -> usize {
        self.gears.get(gear_id).map(|s| s.len()).unwrap_or(0)
    }
}
