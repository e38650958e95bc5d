use serde::Serialize;
use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// A row-level change on one table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeEvent {
    pub table: String,
    pub kind: ChangeKind,
    pub id: String,
}

/// Per-table change notification fan-out
///
/// Each subscriber gets its own channel. Senders whose receiver has been
/// dropped are pruned on the next publish to that table.
#[derive(Debug, Default)]
pub struct ChangeFeed {
    subscribers: Mutex<HashMap<String, Vec<Sender<ChangeEvent>>>>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<Sender<ChangeEvent>>>> {
        self.subscribers.lock().unwrap_or_else(|err| err.into_inner())
    }

    /// Subscribe to insert/update/delete events for `table`
    pub fn subscribe(&self, table: &str) -> Receiver<ChangeEvent> {
        let (tx, rx) = mpsc::channel();
        self.lock().entry(table.to_string()).or_default().push(tx);
        rx
    }

    /// Deliver an event to every live subscriber of `table`
    pub fn publish(&self, table: &str, kind: ChangeKind, id: &str) {
        let mut subscribers = self.lock();
        let Some(senders) = subscribers.get_mut(table) else {
            return;
        };

        let event = ChangeEvent {
            table: table.to_string(),
            kind,
            id: id.to_string(),
        };
        senders.retain(|tx| tx.send(event.clone()).is_ok());
        if senders.is_empty() {
            subscribers.remove(table);
        }
    }

    pub fn subscriber_count(&self, table: &str) -> usize {
        self.lock().get(table).map_or(0, Vec::len)
    }
}
