//! Record reconciliation
//!
//! [`plan_record`] decides what a single record needs; [`RecordManager`]
//! carries out each lifecycle operation against a [`DnsGateway`].

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::import::parse_record_import_id;
use crate::record::{DnsRecord, RecordPayload, RecordSpec};
use crate::traits::{DnsGateway, RecordReconciler};

/// What a record needs to converge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordAction {
    /// Not tracked yet: create it
    Create,
    /// Tracked and fields differ: edit in place
    Update,
    /// Tracked under another domain: delete the old record, create a new one
    Replace,
    /// Tracked but no longer declared: delete it
    Delete,
    /// Tracked state already matches
    NoOp,
}

/// Decide the action for one record
///
/// `prior` is the last observed state. Identity never changes through an
/// edit, so a domain change always plans a [`RecordAction::Replace`].
pub fn plan_record(desired: Option<&RecordSpec>, prior: Option<&DnsRecord>) -> RecordAction {
    match (desired, prior) {
        (Some(_), None) => RecordAction::Create,
        (None, Some(_)) => RecordAction::Delete,
        (None, None) => RecordAction::NoOp,
        (Some(desired), Some(prior)) => {
            if desired.domain != prior.spec.domain {
                RecordAction::Replace
            } else if *desired == prior.spec {
                RecordAction::NoOp
            } else {
                RecordAction::Update
            }
        }
    }
}

/// Record lifecycle operations over a gateway
#[derive(Clone)]
pub struct RecordManager {
    gateway: Arc<dyn DnsGateway>,
}

impl std::fmt::Debug for RecordManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordManager")
            .field("gateway", &self.gateway.provider_name())
            .finish()
    }
}

impl RecordManager {
    /// Create a manager over `gateway`
    pub fn new(gateway: Arc<dyn DnsGateway>) -> Self {
        Self { gateway }
    }

    /// Read-only lookup of an existing record
    ///
    /// Unlike [`RecordReconciler::read`], a missing record is an error here.
    pub async fn lookup(&self, domain: &str, id: &str) -> Result<DnsRecord> {
        debug!("Looking up DNS record {}/{}", domain, id);
        let remote = self.gateway.get_record(domain, id).await?;
        remote.into_record(domain)
    }
}

#[async_trait]
impl RecordReconciler for RecordManager {
    async fn create(&self, desired: &RecordSpec) -> Result<DnsRecord> {
        desired.validate()?;

        let payload = RecordPayload::from(desired);
        debug!(
            "Creating DNS record: domain={} name={:?} type={} content={}",
            desired.domain, desired.name, desired.record_type, desired.content
        );

        let id = self.gateway.create_record(&desired.domain, &payload).await?;

        info!("Created DNS record {}/{} ({})", desired.domain, id, desired.fqdn());
        Ok(DnsRecord::new(id, desired.clone()))
    }

    async fn read(&self, domain: &str, id: &str) -> Result<Option<DnsRecord>> {
        match self.gateway.get_record(domain, id).await {
            Ok(remote) => {
                if !crate::names::belongs_to(domain, &remote.name) {
                    info!(
                        "DNS record {}/{} reports name {} outside its domain",
                        domain, id, remote.name
                    );
                }
                remote.into_record(domain).map(Some)
            }
            Err(e) if e.is_not_found() => {
                warn!(
                    "DNS record {}/{} no longer exists remotely; dropping it",
                    domain, id
                );
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn update(&self, domain: &str, id: &str, desired: &RecordSpec) -> Result<DnsRecord> {
        desired.validate()?;
        if desired.domain != domain {
            return Err(Error::invalid_input(format!(
                "DNS record {}/{} cannot move to domain {} in place; replace it instead",
                domain, id, desired.domain
            )));
        }

        let payload = RecordPayload::from(desired);
        debug!(
            "Updating DNS record {}/{}: name={:?} type={} content={}",
            domain, id, desired.name, desired.record_type, desired.content
        );

        self.gateway.edit_record(domain, id, &payload).await?;

        info!("Updated DNS record {}/{}", domain, id);
        Ok(DnsRecord::new(id, desired.clone()))
    }

    async fn delete(&self, domain: &str, id: &str) -> Result<()> {
        debug!("Deleting DNS record {}/{}", domain, id);
        self.gateway.delete_record(domain, id).await?;
        info!("Deleted DNS record {}/{}", domain, id);
        Ok(())
    }

    async fn import(&self, composite_id: &str) -> Result<DnsRecord> {
        let key = parse_record_import_id(composite_id)?;

        match self.read(&key.domain, &key.id).await? {
            Some(record) => {
                info!("Imported DNS record {}", composite_id);
                Ok(record)
            }
            None => Err(Error::not_found(format!(
                "Cannot import non-existent DNS record {}",
                composite_id
            ))),
        }
    }
}
