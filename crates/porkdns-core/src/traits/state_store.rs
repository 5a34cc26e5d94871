// # State Store Trait
//
// Defines the interface for tracked-state persistence.
//
// ## Purpose
//
// The host remembers what it manages between runs:
// - The registrar id and last observed fields of each record
// - The last observed nameserver set of each managed domain
//
// Entries are keyed by the resource address used in the desired state.
//
// ## Implementations
//
// - In-memory: `MemoryStateStore`
// - File-based: `FileStateStore` (JSON, atomic writes, backup recovery)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::nameserver::NameServerSet;
use crate::record::DnsRecord;

/// A tracked resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "state", rename_all = "snake_case")]
pub enum TrackedResource {
    /// A DNS record
    Record(DnsRecord),
    /// The nameserver set of a domain
    NameServers(NameServerSet),
}

impl TrackedResource {
    /// Domain the resource belongs to
    pub fn domain(&self) -> &str {
        match self {
            TrackedResource::Record(record) => record.domain(),
            TrackedResource::NameServers(set) => &set.domain,
        }
    }
}

/// State entry for a tracked resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedEntry {
    /// Last observed state
    pub resource: TrackedResource,
    /// When the state was last written or refreshed
    pub refreshed_at: chrono::DateTime<chrono::Utc>,
}

impl TrackedEntry {
    /// Create an entry stamped with the current time
    pub fn new(resource: TrackedResource) -> Self {
        Self {
            resource,
            refreshed_at: chrono::Utc::now(),
        }
    }

    /// Entry for a record
    pub fn record(record: DnsRecord) -> Self {
        Self::new(TrackedResource::Record(record))
    }

    /// Entry for a nameserver set
    pub fn nameservers(set: NameServerSet) -> Self {
        Self::new(TrackedResource::NameServers(set))
    }
}

/// Trait for state store implementations
///
/// Implementations must be thread-safe and usable across async tasks.
/// A store only persists what it is given; deciding what to track is the
/// engine's job.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Get the entry at `address`
    ///
    /// # Returns
    ///
    /// - `Ok(Some(TrackedEntry))`: The entry
    /// - `Ok(None)`: Nothing tracked at this address
    /// - `Err(Error)`: Storage error
    async fn get(&self, address: &str) -> Result<Option<TrackedEntry>, crate::Error>;

    /// Create or replace the entry at `address`
    async fn put(&self, address: &str, entry: &TrackedEntry) -> Result<(), crate::Error>;

    /// Remove the entry at `address` (no-op when absent)
    async fn remove(&self, address: &str) -> Result<(), crate::Error>;

    /// List all tracked addresses, sorted
    async fn list(&self) -> Result<Vec<String>, crate::Error>;

    /// Persist any pending changes
    async fn flush(&self) -> Result<(), crate::Error>;
}
