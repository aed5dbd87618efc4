//! Regions
//!
//! [`MockRegion`] is an in-memory region for tests: it keeps entries in a
//! map, consults its writer and notifies its listeners the way a server
//! region would. [`CachingProxyRegion`] is the client-side view of a server
//! region: puts go to the server first and are then cached locally, and
//! listeners registered through [`RegionFactory`] see the local changes.

use crate::client::RegionClient;
use crate::codec::ValueCodec;
use crate::error::Result;
use crate::event::{dispatch, CacheListener, CacheWriter, EntryEvent, Operation};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;

/// The part of a region the example drivers write through.
pub trait Region<K, V> {
    fn name(&self) -> &str;

    /// Store `value` under `key`, returning the previous value.
    fn put_entry(&mut self, key: K, value: V) -> impl Future<Output = Result<Option<V>>> + Send;
}

/// In-memory region double
pub struct MockRegion<K, V> {
    name: String,
    data: Mutex<HashMap<K, V>>,
    writer: Option<Arc<dyn CacheWriter<K, V>>>,
    listeners: Vec<Arc<dyn CacheListener<K, V>>>,
}

impl<K, V> MockRegion<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: Mutex::new(HashMap::new()),
            writer: None,
            listeners: Vec::new(),
        }
    }

    pub fn with_writer(mut self, writer: Arc<dyn CacheWriter<K, V>>) -> Self {
        self.writer = Some(writer);
        self
    }

    pub fn add_cache_listener(mut self, listener: Arc<dyn CacheListener<K, V>>) -> Self {
        self.listeners.push(listener);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Store `value` under `key` and return the previous value.
    ///
    /// The writer is consulted first, then the listeners fire, then the
    /// value is stored. If the writer vetoes the change the region is left
    /// untouched, no listener fires, and the current value is returned.
    pub fn put(&self, key: K, value: V) -> Option<V> {
        let event = {
            let data = self.data.lock();
            let old_value = data.get(&key).cloned();
            let operation = if old_value.is_some() {
                Operation::Update
            } else {
                Operation::Create
            };
            let event = EntryEvent::new(
                self.name.clone(),
                operation,
                key.clone(),
                old_value,
                value.clone(),
            );

            if let Some(writer) = &self.writer {
                let verdict = match operation {
                    Operation::Create => writer.before_create(&event),
                    Operation::Update => writer.before_update(&event),
                };
                if let Err(rejected) = verdict {
                    tracing::warn!("Region {}: {}", self.name, rejected);
                    return event.old_value;
                }
            }

            event
        };

        // Listeners see the region as it was before the put, and run without
        // the lock held.
        dispatch(&self.listeners, &event);
        self.data.lock().insert(key, value);
        event.old_value
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.data.lock().get(key).cloned()
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        self.data.lock().remove(key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.data.lock().contains_key(key)
    }

    pub fn keys(&self) -> Vec<K> {
        self.data.lock().keys().cloned().collect()
    }

    pub fn values(&self) -> Vec<V> {
        self.data.lock().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.data.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.lock().is_empty()
    }

    /// Bulk load. Bypasses the writer and listeners.
    pub fn put_all(&self, entries: impl IntoIterator<Item = (K, V)>) {
        self.data.lock().extend(entries);
    }
}

impl<K, V> Region<K, V> for MockRegion<K, V>
where
    K: Eq + Hash + Clone + Send,
    V: Clone + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn put_entry(&mut self, key: K, value: V) -> impl Future<Output = Result<Option<V>>> + Send {
        let old_value = self.put(key, value);
        async move { Ok(old_value) }
    }
}

/// Client-side caching proxy over a server region
pub struct CachingProxyRegion<C, S = TcpStream> {
    client: RegionClient<C, S>,
    local: HashMap<i32, String>,
    listeners: Vec<Arc<dyn CacheListener<i32, String>>>,
}

impl<C, S> CachingProxyRegion<C, S>
where
    C: ValueCodec,
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub fn name(&self) -> &str {
        self.client.region_name()
    }

    /// Write through to the server, then update the local copy.
    ///
    /// Listeners see a create when the key was not cached locally, an
    /// update otherwise. Nothing changes locally if the server put fails.
    pub async fn put(&mut self, key: i32, value: String) -> Result<Option<String>> {
        self.client.put(key, &value).await?;
        let old_value = self.local.insert(key, value.clone());
        let operation = if old_value.is_some() {
            Operation::Update
        } else {
            Operation::Create
        };
        let event = EntryEvent::new(self.name(), operation, key, old_value.clone(), value);
        dispatch(&self.listeners, &event);
        Ok(old_value)
    }

    /// Serve from the local cache, falling back to the server on a miss.
    pub async fn get(&mut self, key: i32) -> Result<Option<String>> {
        if let Some(value) = self.local.get(&key) {
            return Ok(Some(value.clone()));
        }
        let fetched = self.client.get(key).await?;
        if let Some(value) = &fetched {
            self.local.insert(key, value.clone());
        }
        Ok(fetched)
    }

    pub fn contains_key_locally(&self, key: i32) -> bool {
        self.local.contains_key(&key)
    }

    pub fn local_len(&self) -> usize {
        self.local.len()
    }

    pub fn into_client(self) -> RegionClient<C, S> {
        self.client
    }
}

impl<C, S> Region<i32, String> for CachingProxyRegion<C, S>
where
    C: ValueCodec,
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    fn name(&self) -> &str {
        self.client.region_name()
    }

    fn put_entry(
        &mut self,
        key: i32,
        value: String,
    ) -> impl Future<Output = Result<Option<String>>> + Send {
        self.put(key, value)
    }
}

/// Collects listeners and then creates regions that notify them.
pub struct RegionFactory<K, V> {
    listeners: Vec<Arc<dyn CacheListener<K, V>>>,
}

impl<K, V> Default for RegionFactory<K, V> {
    fn default() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }
}

impl<K, V> RegionFactory<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_cache_listener(mut self, listener: Arc<dyn CacheListener<K, V>>) -> Self {
        self.listeners.push(listener);
        self
    }

    /// In-memory region carrying the registered listeners.
    pub fn create_local(self, name: impl Into<String>) -> MockRegion<K, V>
    where
        K: Eq + Hash + Clone,
        V: Clone,
    {
        let mut region = MockRegion::new(name);
        region.listeners = self.listeners;
        region
    }
}

impl RegionFactory<i32, String> {
    /// Caching proxy over the region `client` is bound to.
    pub fn create_caching_proxy<C, S>(self, client: RegionClient<C, S>) -> CachingProxyRegion<C, S>
    where
        C: ValueCodec,
        S: AsyncRead + AsyncWrite + Unpin + Send,
    {
        tracing::info!(
            "Created caching proxy for region {} with {} listener(s)",
            client.region_name(),
            self.listeners.len()
        );
        CachingProxyRegion {
            client,
            local: HashMap::new(),
            listeners: self.listeners,
        }
    }
}
