//! Listener example driver
//!
//! Registers a [`QueueingListener`] on a region, writes [`ITERATIONS`]
//! distinct keys in random order and reports how many create events were
//! queued.

use crate::error::Result;
use crate::event::{event_queue, CacheListener, EventQueue, EVENT_QUEUE_CAPACITY};
use crate::region::Region;
use rand::seq::SliceRandom;
use std::sync::Arc;

pub const ITERATIONS: usize = 100;

pub struct ListenerExample {
    listeners: Vec<Arc<dyn CacheListener<i32, String>>>,
    events: EventQueue<i32, String>,
}

impl Default for ListenerExample {
    fn default() -> Self {
        Self::new()
    }
}

impl ListenerExample {
    pub fn new() -> Self {
        let (listener, events) = event_queue::<i32, String>(EVENT_QUEUE_CAPACITY);
        let listener: Arc<dyn CacheListener<i32, String>> = Arc::new(listener);
        Self {
            listeners: vec![listener],
            events,
        }
    }

    /// Listeners to register on the region before writing to it.
    pub fn cache_listeners(&self) -> &[Arc<dyn CacheListener<i32, String>>] {
        &self.listeners
    }

    pub fn events(&self) -> &EventQueue<i32, String> {
        &self.events
    }

    /// Put every generated integer as `(i, i.to_string())` and return the
    /// number of events queued so far.
    pub async fn accept<R: Region<i32, String>>(&self, region: &mut R) -> Result<usize> {
        for key in generate_integers() {
            region.put_entry(key, key.to_string()).await?;
        }
        let created = self.events.len();
        tracing::info!("Region {}: {} create events queued", region.name(), created);
        Ok(created)
    }
}

/// `ITERATIONS` distinct integers from `[0, ITERATIONS)` in random order.
pub fn generate_integers() -> Vec<i32> {
    let mut integers: Vec<i32> = (0..ITERATIONS as i32).collect();
    integers.shuffle(&mut rand::thread_rng());
    integers
}
