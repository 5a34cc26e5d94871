//! Reconcilers and session setup
//!
//! A [`Session`] is the only way to obtain reconcilers: it probes the
//! gateway's credentials once, and a failed probe means no operation
//! can run at all.

pub mod nameservers;
pub mod record;

use std::sync::Arc;

use tracing::{error, info};

use crate::error::{Error, Result};
use crate::traits::DnsGateway;

pub use nameservers::{NameServerAction, NameServerManager, plan_nameservers};
pub use record::{RecordAction, RecordManager, plan_record};

/// An authenticated session against one gateway
#[derive(Clone)]
pub struct Session {
    gateway: Arc<dyn DnsGateway>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("gateway", &self.gateway.provider_name())
            .finish()
    }
}

impl Session {
    /// Ping the gateway and open a session
    ///
    /// Any ping failure, whatever its kind, is returned as a setup error.
    pub async fn establish(gateway: Arc<dyn DnsGateway>) -> Result<Self> {
        let provider = gateway.provider_name();

        if let Err(e) = gateway.ping().await {
            error!("Credential check against {} failed: {}", provider, e);
            return Err(Error::setup(format!(
                "Unable to create {} API client: {}",
                provider, e
            )));
        }

        info!("Connected to {} API", provider);
        Ok(Self { gateway })
    }

    /// Record reconciler bound to this session
    pub fn records(&self) -> RecordManager {
        RecordManager::new(Arc::clone(&self.gateway))
    }

    /// Nameserver reconciler bound to this session
    pub fn nameservers(&self) -> NameServerManager {
        NameServerManager::new(Arc::clone(&self.gateway))
    }

    /// Name of the underlying gateway provider
    pub fn provider_name(&self) -> &'static str {
        self.gateway.provider_name()
    }
}
