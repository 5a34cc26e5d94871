//! Nameserver set data model

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Registrar default nameservers, restored when a managed set is destroyed
pub const DEFAULT_NAMESERVERS: [&str; 4] = [
    "curitiba.ns.porkbun.com",
    "fortaleza.ns.porkbun.com",
    "maceio.ns.porkbun.com",
    "salvador.ns.porkbun.com",
];

/// The complete nameserver set of a domain
///
/// The domain is the identity; there is no separate id. The set is always
/// written as a whole, and iterating it yields the lexicographic wire order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameServerSet {
    /// Domain whose delegation is managed
    pub domain: String,

    /// Nameserver hostnames
    pub nameservers: BTreeSet<String>,
}

impl NameServerSet {
    /// Build a set from any collection of hostnames
    pub fn new<I, S>(domain: impl Into<String>, nameservers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            domain: domain.into(),
            nameservers: nameservers.into_iter().map(Into::into).collect(),
        }
    }

    /// The registrar default set for `domain`
    pub fn registrar_default(domain: impl Into<String>) -> Self {
        Self::new(domain, DEFAULT_NAMESERVERS)
    }

    /// Full replacement list in canonical order
    pub fn wire_order(&self) -> Vec<String> {
        self.nameservers.iter().cloned().collect()
    }

    /// True when this is exactly the registrar default set
    pub fn is_registrar_default(&self) -> bool {
        self.nameservers.len() == DEFAULT_NAMESERVERS.len()
            && DEFAULT_NAMESERVERS
                .iter()
                .all(|ns| self.nameservers.contains(*ns))
    }

    /// Check the set before any remote call
    pub fn validate(&self) -> Result<()> {
        if self.domain.trim().is_empty() {
            return Err(Error::invalid_input("Nameserver domain cannot be empty"));
        }
        if self.nameservers.is_empty() {
            return Err(Error::invalid_input(format!(
                "Nameserver set for {} cannot be empty",
                self.domain
            )));
        }
        if let Some(blank) = self.nameservers.iter().find(|ns| ns.trim().is_empty()) {
            return Err(Error::invalid_input(format!(
                "Nameserver set for {} contains a blank hostname: {:?}",
                self.domain, blank
            )));
        }
        Ok(())
    }
}
