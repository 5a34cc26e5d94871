// # Reconciler Capabilities
//
// The operations a host binds to its own lifecycle events. Nothing here
// depends on any particular host protocol; an adapter maps the host's
// create/read/update/delete/import calls onto these traits.

use async_trait::async_trait;

use crate::nameserver::NameServerSet;
use crate::record::{DnsRecord, RecordSpec};

/// Lifecycle operations for a single DNS record
#[async_trait]
pub trait RecordReconciler: Send + Sync {
    /// Create the record and return canonical state including its new id
    ///
    /// A failure means nothing is tracked locally, even if the registrar
    /// partially applied the request.
    async fn create(&self, desired: &RecordSpec) -> Result<DnsRecord, crate::Error>;

    /// Refresh tracked state from the registrar
    ///
    /// # Returns
    ///
    /// - `Ok(Some(record))`: the record exists; fields normalized
    /// - `Ok(None)`: the record is gone and should be dropped from tracked state
    /// - `Err(Error)`: any other failure; tracked state must be left as is
    async fn read(&self, domain: &str, id: &str) -> Result<Option<DnsRecord>, crate::Error>;

    /// Edit the record in place
    ///
    /// `desired.domain` must equal `domain`; a domain change is a replace
    /// and is rejected here.
    async fn update(
        &self,
        domain: &str,
        id: &str,
        desired: &RecordSpec,
    ) -> Result<DnsRecord, crate::Error>;

    /// Delete the record
    async fn delete(&self, domain: &str, id: &str) -> Result<(), crate::Error>;

    /// Adopt an existing record given `<domain>/<record-id>`
    async fn import(&self, composite_id: &str) -> Result<DnsRecord, crate::Error>;
}

/// Lifecycle operations for the nameserver set of a domain
#[async_trait]
pub trait NameServerReconciler: Send + Sync {
    /// Set the nameservers of `desired.domain` for the first time
    async fn create(&self, desired: &NameServerSet) -> Result<NameServerSet, crate::Error>;

    /// Read the current nameserver set
    async fn read(&self, domain: &str) -> Result<NameServerSet, crate::Error>;

    /// Replace the nameserver set
    async fn update(
        &self,
        domain: &str,
        desired: &NameServerSet,
    ) -> Result<NameServerSet, crate::Error>;

    /// Reset the domain to the registrar default nameservers
    async fn delete(&self, domain: &str) -> Result<(), crate::Error>;

    /// Adopt the current nameserver set of a domain
    async fn import(&self, domain: &str) -> Result<NameServerSet, crate::Error>;
}
