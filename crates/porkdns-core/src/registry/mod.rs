//! Plugin-based gateway registry
//!
//! The registry maps provider type names to gateway factories so a host
//! can build a gateway from configuration without naming concrete types.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use porkdns_core::registry::GatewayRegistry;
//! use porkdns_core::config::{Credentials, ProviderConfig};
//!
//! let registry = GatewayRegistry::new();
//! porkdns_provider_porkbun::register(&registry);
//!
//! let config = ProviderConfig::porkbun(Credentials::new("pk1_...", "sk1_..."));
//! let gateway = registry.create_gateway(&config)?;
//! ```

use crate::config::ProviderConfig;
use crate::error::{Error, Result};
use crate::traits::{DnsGateway, GatewayFactory};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Gateway registry for plugin-based gateway creation
///
/// ## Thread Safety
///
/// The registry uses interior mutability with RwLock, allowing concurrent
/// reads and exclusive writes.
#[derive(Default)]
pub struct GatewayRegistry {
    gateways: RwLock<HashMap<String, Box<dyn GatewayFactory>>>,
}

impl GatewayRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a gateway factory under `name`, replacing any previous one
    pub fn register_gateway(&self, name: impl Into<String>, factory: Box<dyn GatewayFactory>) {
        let mut gateways = self
            .gateways
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        gateways.insert(name.into(), factory);
    }

    /// Create a gateway from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn DnsGateway>)`: Created gateway
    /// - `Err(Error)`: Invalid configuration, or no factory registered for its type
    pub fn create_gateway(&self, config: &ProviderConfig) -> Result<Box<dyn DnsGateway>> {
        config.validate()?;

        let provider_type = config.type_name();
        let gateways = self
            .gateways
            .read()
            .unwrap_or_else(PoisonError::into_inner);

        let factory = gateways
            .get(provider_type)
            .ok_or_else(|| Error::config(format!("Unknown provider type: {}", provider_type)))?;

        factory.create(config)
    }

    /// List all registered provider types, sorted
    pub fn list_gateways(&self) -> Vec<String> {
        let gateways = self
            .gateways
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = gateways.keys().cloned().collect();
        names.sort();
        names
    }

    /// Check if a provider type is registered
    pub fn has_gateway(&self, name: &str) -> bool {
        let gateways = self
            .gateways
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        gateways.contains_key(name)
    }
}
