// # DNS Gateway Trait
//
// Defines the interface to the registrar's record and nameserver API.
//
// ## Implementations
//
// - Porkbun: `porkdns-provider-porkbun` crate
//
// ## Usage
//
// ```rust,ignore
// use porkdns_core::DnsGateway;
//
// #[tokio::main]
// async fn main() -> porkdns_core::Result<()> {
//     let gateway = /* DnsGateway implementation */;
//
//     gateway.ping().await?;
//     let record = gateway.get_record("example.com", "12345").await?;
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

use crate::record::{RecordPayload, RemoteRecord};

/// Trait for registrar gateway implementations
///
/// A gateway performs exactly one remote call per method and reports
/// the outcome through [`crate::Error`] kinds:
///
/// - a non-success `status` in the response body becomes
///   [`crate::Error::Api`] with the remote message passed through verbatim
/// - an empty result from [`DnsGateway::get_record`] becomes
///   [`crate::Error::NotFound`]
/// - HTTP status, connection, timeout and decoding failures become
///   transport errors and are never reported as not-found
///
/// Gateways hold no state besides their immutable endpoint and credential
/// configuration, never retry, and never log credentials.
#[async_trait]
pub trait DnsGateway: Send + Sync {
    /// Validate credentials with a no-op authenticated call
    async fn ping(&self) -> Result<(), crate::Error>;

    /// Create a record under `domain` and return the id the registrar assigned
    async fn create_record(
        &self,
        domain: &str,
        record: &RecordPayload,
    ) -> Result<String, crate::Error>;

    /// Retrieve one record by id
    ///
    /// # Returns
    ///
    /// - `Ok(RemoteRecord)`: the record with its fully-qualified name
    /// - `Err(Error::NotFound)`: the registrar returned no records
    /// - `Err(Error)`: any other failure
    async fn get_record(&self, domain: &str, id: &str) -> Result<RemoteRecord, crate::Error>;

    /// Overwrite every editable field of an existing record
    async fn edit_record(
        &self,
        domain: &str,
        id: &str,
        record: &RecordPayload,
    ) -> Result<(), crate::Error>;

    /// Delete a record
    async fn delete_record(&self, domain: &str, id: &str) -> Result<(), crate::Error>;

    /// Current nameservers of `domain`, in whatever order the registrar reports
    async fn get_name_servers(&self, domain: &str) -> Result<Vec<String>, crate::Error>;

    /// Replace the complete nameserver list of `domain`
    async fn update_name_servers(
        &self,
        domain: &str,
        nameservers: &[String],
    ) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

/// Helper trait for constructing gateways from configuration
pub trait GatewayFactory: Send + Sync {
    /// Create a DnsGateway instance from configuration
    fn create(
        &self,
        config: &crate::config::ProviderConfig,
    ) -> Result<Box<dyn DnsGateway>, crate::Error>;
}
