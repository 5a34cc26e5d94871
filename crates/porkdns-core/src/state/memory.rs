// # Memory State Store
//
// In-memory implementation of StateStore.
//
// Tracked state lives only as long as the process. Useful for tests and
// for hosts that keep their own persistence and only need the engine for
// a single pass.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::Error;
use crate::traits::state_store::{StateStore, TrackedEntry};

/// In-memory state store implementation
///
/// # Example
///
/// ```rust,no_run
/// use porkdns_core::record::{DnsRecord, RecordSpec, RecordType};
/// use porkdns_core::state::MemoryStateStore;
/// use porkdns_core::traits::{StateStore, TrackedEntry};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = MemoryStateStore::new();
///
///     let record = DnsRecord::new("1", RecordSpec::new("example.com", RecordType::A, "192.0.2.1"));
///     store.put("apex", &TrackedEntry::record(record)).await?;
///
///     assert!(store.get("apex").await?.is_some());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStateStore {
    inner: Arc<RwLock<BTreeMap<String, TrackedEntry>>>,
}

impl MemoryStateStore {
    /// Create a new empty memory state store
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of entries in the store
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Check if the store is empty
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn get(&self, address: &str) -> Result<Option<TrackedEntry>, Error> {
        let guard = self.inner.read().await;
        Ok(guard.get(address).cloned())
    }

    async fn put(&self, address: &str, entry: &TrackedEntry) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        guard.insert(address.to_string(), entry.clone());
        Ok(())
    }

    async fn remove(&self, address: &str) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        guard.remove(address);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<String>, Error> {
        let guard = self.inner.read().await;
        Ok(guard.keys().cloned().collect())
    }

    async fn flush(&self) -> Result<(), Error> {
        Ok(())
    }
}
