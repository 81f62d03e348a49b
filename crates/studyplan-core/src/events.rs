use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::task::Slot;

/// Session id used when a listener does not name one.
pub const DEFAULT_SESSION: &str = "default";

/// Notifications produced after planning or by the digest job.
///
/// The scheduler never sends these itself; callers hand them to an
/// [`EventSink`] once a plan has been persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Event {
    #[serde(rename = "plan.update")]
    PlanUpdated { task_id: String, slots: Vec<Slot> },
    #[serde(rename = "daily.digest")]
    DailyDigest { date: NaiveDate, due: Vec<DueTask> },
    #[serde(rename = "reminder")]
    Reminder { text: String, at: DateTime<Utc> },
}

/// Short task summary carried by the daily digest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DueTask {
    pub id: String,
    pub title: String,
    pub due_at: DateTime<Utc>,
}

/// Consumer of scheduler output.
pub trait EventSink: Send + Sync {
    fn publish(&self, event: Event);
}

impl<T: EventSink + ?Sized> EventSink for Arc<T> {
    fn publish(&self, event: Event) {
        (**self).publish(event)
    }
}

/// Sink that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn publish(&self, _event: Event) {}
}

/// Receiving end of a registry subscription.
#[derive(Debug)]
pub struct Subscription {
    pub session_id: String,
    rx: mpsc::UnboundedReceiver<Event>,
}

impl Subscription {
    pub async fn recv(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<Event> {
        self.rx.try_recv().ok()
    }
}

/// Listeners grouped by session id.
///
/// Dropping a [`Subscription`] unsubscribes it; the next publish to that
/// session prunes the closed sender and removes the session once empty.
#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    sessions: Mutex<HashMap<String, Vec<mpsc::UnboundedSender<Event>>>>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, session_id: impl Into<String>) -> Subscription {
        let session_id = session_id.into();
        let (tx, rx) = mpsc::unbounded_channel();
        self.sessions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(session_id.clone())
            .or_default()
            .push(tx);
        debug!(session_id = %session_id, "listener subscribed");
        Subscription { session_id, rx }
    }

    /// Deliver `event` to every live listener of `session_id`.
    ///
    /// Returns the number of listeners reached.
    pub fn publish_to(&self, session_id: &str, event: &Event) -> usize {
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        let Some(senders) = sessions.get_mut(session_id) else {
            return 0;
        };

        let before = senders.len();
        senders.retain(|tx| tx.send(event.clone()).is_ok());
        let delivered = senders.len();
        if delivered < before {
            warn!(session_id, dropped = before - delivered, "pruned closed listeners");
        }
        if senders.is_empty() {
            sessions.remove(session_id);
        }
        delivered
    }

    pub fn session_count(&self) -> usize {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn subscriber_count(&self, session_id: &str) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(session_id)
            .map_or(0, Vec::len)
    }
}

impl EventSink for SubscriptionRegistry {
    fn publish(&self, event: Event) {
        self.publish_to(DEFAULT_SESSION, &event);
    }
}
