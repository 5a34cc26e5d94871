//! Nameserver set reconciliation
//!
//! Every write is a full replacement in lexicographic order; no diff
//! against the previous set is ever computed or sent.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::import::parse_nameserver_import_id;
use crate::nameserver::NameServerSet;
use crate::traits::{DnsGateway, NameServerReconciler};

/// What a nameserver set needs to converge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameServerAction {
    /// Write the declared set
    Set,
    /// Domain changed: reset the old domain, then write the new one
    Replace,
    /// No longer declared: restore registrar defaults
    Reset,
    /// Tracked state already matches
    NoOp,
}

/// Decide the action for one nameserver set
pub fn plan_nameservers(
    desired: Option<&NameServerSet>,
    prior: Option<&NameServerSet>,
) -> NameServerAction {
    match (desired, prior) {
        (Some(_), None) => NameServerAction::Set,
        (None, Some(_)) => NameServerAction::Reset,
        (None, None) => NameServerAction::NoOp,
        (Some(desired), Some(prior)) => {
            if desired.domain != prior.domain {
                NameServerAction::Replace
            } else if desired == prior {
                NameServerAction::NoOp
            } else {
                NameServerAction::Set
            }
        }
    }
}

/// Nameserver lifecycle operations over a gateway
#[derive(Clone)]
pub struct NameServerManager {
    gateway: Arc<dyn DnsGateway>,
}

impl std::fmt::Debug for NameServerManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NameServerManager")
            .field("gateway", &self.gateway.provider_name())
            .finish()
    }
}

impl NameServerManager {
    /// Create a manager over `gateway`
    pub fn new(gateway: Arc<dyn DnsGateway>) -> Self {
        Self { gateway }
    }

    async fn write(&self, desired: &NameServerSet) -> Result<NameServerSet> {
        desired.validate()?;

        let nameservers = desired.wire_order();
        debug!(
            "Updating nameservers for {}: {:?}",
            desired.domain, nameservers
        );

        self.gateway
            .update_name_servers(&desired.domain, &nameservers)
            .await?;

        info!("Updated nameservers for {}", desired.domain);
        Ok(desired.clone())
    }
}

#[async_trait]
impl NameServerReconciler for NameServerManager {
    async fn create(&self, desired: &NameServerSet) -> Result<NameServerSet> {
        self.write(desired).await
    }

    async fn read(&self, domain: &str) -> Result<NameServerSet> {
        let nameservers = self.gateway.get_name_servers(domain).await?;
        debug!("Read {} nameserver(s) for {}", nameservers.len(), domain);
        Ok(NameServerSet::new(domain, nameservers))
    }

    async fn update(&self, domain: &str, desired: &NameServerSet) -> Result<NameServerSet> {
        if desired.domain != domain {
            return Err(Error::invalid_input(format!(
                "Nameservers of {} cannot move to domain {} in place; replace them instead",
                domain, desired.domain
            )));
        }
        self.write(desired).await
    }

    async fn delete(&self, domain: &str) -> Result<()> {
        debug!("Resetting nameservers for {} to registrar defaults", domain);

        let defaults = NameServerSet::registrar_default(domain).wire_order();
        self.gateway.update_name_servers(domain, &defaults).await?;

        info!("Reset nameservers for {} to registrar defaults", domain);
        Ok(())
    }

    async fn import(&self, domain: &str) -> Result<NameServerSet> {
        let domain = parse_nameserver_import_id(domain)?;
        let set = self.read(&domain).await?;
        info!("Imported nameservers for {}", domain);
        Ok(set)
    }
}
