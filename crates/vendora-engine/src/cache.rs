//! Read-through cache collaborator.
//!
//! Used only for read-mostly tenant/product lookups outside the
//! transactional checkout path — checkout always reads live state.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use vendora_core::error::VendoraResult;

/// A get-or-fetch cache over values of type `V`.
pub trait ReadCache<V>: Send + Sync
where
    V: Clone + Send + Sync + 'static,
{
    fn get_or_fetch<F, Fut>(
        &self,
        key: &str,
        fetch: F,
    ) -> impl Future<Output = VendoraResult<V>> + Send
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = VendoraResult<V>> + Send;
}

/// A minimal in-process TTL cache.
pub struct MemoryCache<V> {
    ttl: Duration,
    entries: Mutex<HashMap<String, (Instant, V)>>,
}

impl<V> MemoryCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<V> ReadCache<V> for MemoryCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    async fn get_or_fetch<F, Fut>(&self, key: &str, fetch: F) -> VendoraResult<V>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = VendoraResult<V>> + Send,
    {
        // The lock is never held across an await.
        if let Ok(entries) = self.entries.lock()
            && let Some((stored_at, value)) = entries.get(key)
            && stored_at.elapsed() < self.ttl
        {
            return Ok(value.clone());
        }

        let value = fetch().await?;
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), (Instant::now(), value.clone()));
        }
        Ok(value)
    }
}
