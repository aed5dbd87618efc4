//! Entry events, listeners and writers
//!
//! Regions consult an optional [`CacheWriter`], which may veto a change, and
//! then report accepted changes to registered [`CacheListener`]s.
//! [`QueueingListener`] turns those callbacks into a bounded
//! FIFO that another thread drains through [`EventQueue`].

use crossbeam::channel::{bounded, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Capacity of the queue behind [`event_queue`]'s default listener
pub const EVENT_QUEUE_CAPACITY: usize = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Create,
    Update,
}

/// A single entry change observed on a region
#[derive(Clone, Debug, PartialEq)]
pub struct EntryEvent<K, V> {
    pub region_name: String,
    pub operation: Operation,
    pub key: K,
    pub old_value: Option<V>,
    pub new_value: V,
}

impl<K, V> EntryEvent<K, V> {
    pub fn new(
        region_name: impl Into<String>,
        operation: Operation,
        key: K,
        old_value: Option<V>,
        new_value: V,
    ) -> Self {
        Self {
            region_name: region_name.into(),
            operation,
            key,
            old_value,
            new_value,
        }
    }
}

/// Callbacks fired after an entry is created or updated.
pub trait CacheListener<K, V>: Send + Sync {
    fn after_create(&self, _event: &EntryEvent<K, V>) {}

    fn after_update(&self, _event: &EntryEvent<K, V>) {}
}

/// Returned by a [`CacheWriter`] to stop a change from being applied
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cache writer rejected change: {0}")]
pub struct WriterRejected(pub String);

/// Callbacks consulted before an entry is created or updated.
pub trait CacheWriter<K, V>: Send + Sync {
    fn before_create(&self, _event: &EntryEvent<K, V>) -> Result<(), WriterRejected> {
        Ok(())
    }

    fn before_update(&self, _event: &EntryEvent<K, V>) -> Result<(), WriterRejected> {
        Ok(())
    }
}

/// Fire the listener callback matching the event's operation.
pub fn dispatch<K, V>(listeners: &[Arc<dyn CacheListener<K, V>>], event: &EntryEvent<K, V>) {
    for listener in listeners {
        match event.operation {
            Operation::Create => listener.after_create(event),
            Operation::Update => listener.after_update(event),
        }
    }
}

/// Listener that copies events into a bounded channel.
///
/// When the channel is full the callback blocks until the consumer takes an
/// event; nothing is dropped. Only creates are queued unless
/// [`with_updates`](Self::with_updates) is set.
pub struct QueueingListener<K, V> {
    tx: Sender<EntryEvent<K, V>>,
    include_updates: bool,
}

impl<K, V> QueueingListener<K, V> {
    pub fn with_updates(mut self) -> Self {
        self.include_updates = true;
        self
    }

    fn enqueue(&self, event: EntryEvent<K, V>) {
        if self.tx.send(event).is_err() {
            tracing::warn!("Event queue receiver dropped, discarding event");
        }
    }
}

impl<K, V> CacheListener<K, V> for QueueingListener<K, V>
where
    K: Clone + Send,
    V: Clone + Send,
{
    fn after_create(&self, event: &EntryEvent<K, V>) {
        self.enqueue(event.clone());
    }

    fn after_update(&self, event: &EntryEvent<K, V>) {
        if self.include_updates {
            self.enqueue(event.clone());
        }
    }
}

/// Consuming end of a [`QueueingListener`]; FIFO
pub struct EventQueue<K, V> {
    rx: Receiver<EntryEvent<K, V>>,
}

impl<K, V> EventQueue<K, V> {
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.rx.capacity().unwrap_or(usize::MAX)
    }

    /// Take the oldest event, waiting for one if the queue is empty.
    /// `None` once every listener is gone and the queue is drained.
    pub fn recv(&self) -> Option<EntryEvent<K, V>> {
        self.rx.recv().ok()
    }

    pub fn try_recv(&self) -> Option<EntryEvent<K, V>> {
        match self.rx.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EntryEvent<K, V>> {
        match self.rx.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Take everything currently queued without waiting.
    pub fn drain(&self) -> Vec<EntryEvent<K, V>> {
        self.rx.try_iter().collect()
    }
}

/// A listener and the queue it feeds, with room for `capacity` events.
pub fn event_queue<K, V>(capacity: usize) -> (QueueingListener<K, V>, EventQueue<K, V>) {
    let (tx, rx) = bounded(capacity);
    (
        QueueingListener {
            tx,
            include_updates: false,
        },
        EventQueue { rx },
    )
}
