//! Domain events broadcast by the viewer

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;

/// Events other parts of the application react to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainEvent {
    /// A file was moved to the trash from the viewer
    FileDeleted(PathBuf),
}

/// Fan-out of [`DomainEvent`]s to channel subscribers
#[derive(Clone, Default)]
pub struct EventBus {
    subscribers: Arc<Mutex<Vec<Sender<DomainEvent>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> Receiver<DomainEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.lock().push(tx);
        rx
    }

    /// Deliver to every live subscriber; dropped receivers are pruned
    pub fn emit(&self, event: DomainEvent) {
        let mut subscribers = self.subscribers.lock();
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        tracing::debug!(?event, subscribers = subscribers.len(), "Domain event emitted");
    }
}
