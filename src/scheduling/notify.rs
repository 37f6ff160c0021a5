//! Fire-and-forget appointment events.
//!
//! The core emits an event after a create or cancel has been committed.
//! Delivery is best effort: a full or closed channel drops the event with a
//! warning and never fails the operation that produced it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Created,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentEvent {
    pub event_id: Uuid,
    pub kind: EventKind,
    pub appointment_id: i64,
    pub occurred_at: DateTime<Utc>,
}

impl AppointmentEvent {
    pub fn new(kind: EventKind, appointment_id: i64) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            kind,
            appointment_id,
            occurred_at: Utc::now(),
        }
    }
}

/// Sink for appointment events. Implementations must not block.
pub trait Notifier: Send + Sync {
    fn notify(&self, event: AppointmentEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _event: AppointmentEvent) {}
}

/// Pushes events onto a bounded channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::Sender<AppointmentEvent>,
}

impl ChannelNotifier {
    pub fn new(tx: mpsc::Sender<AppointmentEvent>) -> Self {
        Self { tx }
    }

    /// Notifier plus the receiving end, with room for `capacity` events.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<AppointmentEvent>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self::new(tx), rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, event: AppointmentEvent) {
        match self.tx.try_send(event) {
            Ok(()) => (),
            Err(mpsc::error::TrySendError::Full(event)) => {
                tracing::warn!(
                    event_id = %event.event_id,
                    appointment_id = event.appointment_id,
                    "Notification queue full, event dropped"
                );
            }
            Err(mpsc::error::TrySendError::Closed(event)) => {
                tracing::warn!(
                    event_id = %event.event_id,
                    appointment_id = event.appointment_id,
                    "Notification receiver gone, event dropped"
                );
            }
        }
    }
}

/// Drain `rx` into the log until every sender is dropped.
pub fn spawn_event_logger(
    mut rx: mpsc::Receiver<AppointmentEvent>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            tracing::info!(
                event_id = %event.event_id,
                kind = ?event.kind,
                appointment_id = event.appointment_id,
                occurred_at = %event.occurred_at,
                "Appointment notification"
            );
        }
        tracing::debug!("Notification channel closed");
    })
}

/// Keeps every event in memory (for testing).
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    events: std::sync::Mutex<Vec<AppointmentEvent>>,
}

#[cfg(test)]
impl RecordingNotifier {
    pub fn events(&self) -> Vec<AppointmentEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn kinds(&self) -> Vec<(EventKind, i64)> {
        self.events()
            .into_iter()
            .map(|e| (e.kind, e.appointment_id))
            .collect()
    }
}

#[cfg(test)]
impl Notifier for RecordingNotifier {
    fn notify(&self, event: AppointmentEvent) {
        self.events.lock().unwrap().push(event);
    }
}
