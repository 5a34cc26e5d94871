//! Configuration types for porkdns
//!
//! - [`Credentials`]: API key pair, explicit values first, then environment
//! - [`ProviderConfig`]: which gateway to build and how
//! - [`DesiredState`]: the declared records and nameserver sets

use crate::nameserver::NameServerSet;
use crate::record::RecordSpec;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "PORKBUN_API_KEY";

/// Environment variable holding the secret API key
pub const SECRET_API_KEY_ENV: &str = "PORKBUN_SECRET_API_KEY";

/// Default API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.porkbun.com/api/json/v3";

/// Default upper bound on each remote call, in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Registrar API credentials
///
/// The Debug implementation never prints either key.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// API key
    pub api_key: String,
    /// Secret API key
    pub secret_api_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<REDACTED>")
            .field("secret_api_key", &"<REDACTED>")
            .finish()
    }
}

impl Credentials {
    /// Create credentials from explicit values
    pub fn new(api_key: impl Into<String>, secret_api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            secret_api_key: secret_api_key.into(),
        }
    }

    /// Resolve credentials from explicit values, falling back to the
    /// `PORKBUN_API_KEY` / `PORKBUN_SECRET_API_KEY` environment variables
    pub fn resolve(
        explicit_api_key: Option<String>,
        explicit_secret_api_key: Option<String>,
    ) -> Result<Self, crate::Error> {
        Self::resolve_with(
            |name| std::env::var(name).ok(),
            explicit_api_key,
            explicit_secret_api_key,
        )
    }

    /// Resolve credentials with an explicit variable lookup
    ///
    /// An explicit value always wins over the looked-up one, even when it
    /// is empty; an empty result for either key is an error naming it.
    pub fn resolve_with<F>(
        lookup: F,
        explicit_api_key: Option<String>,
        explicit_secret_api_key: Option<String>,
    ) -> Result<Self, crate::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = explicit_api_key
            .or_else(|| lookup(API_KEY_ENV))
            .unwrap_or_default();
        let secret_api_key = explicit_secret_api_key
            .or_else(|| lookup(SECRET_API_KEY_ENV))
            .unwrap_or_default();

        let credentials = Self::new(api_key, secret_api_key);
        credentials.validate()?;
        Ok(credentials)
    }

    /// Validate that both keys are present
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.api_key.is_empty() {
            return Err(crate::Error::config(format!(
                "Missing API key. Set the api_key value in the configuration \
                or use the {} environment variable.",
                API_KEY_ENV
            )));
        }
        if self.secret_api_key.is_empty() {
            return Err(crate::Error::config(format!(
                "Missing secret API key. Set the secret_api_key value in the configuration \
                or use the {} environment variable.",
                SECRET_API_KEY_ENV
            )));
        }
        Ok(())
    }
}

/// Gateway provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Porkbun JSON API
    Porkbun {
        /// API credentials
        credentials: Credentials,
        /// Override for the API endpoint
        #[serde(default)]
        base_url: Option<String>,
        /// Per-request timeout in seconds
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },

    /// Custom gateway
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl ProviderConfig {
    /// Porkbun configuration with default endpoint and timeout
    pub fn porkbun(credentials: Credentials) -> Self {
        ProviderConfig::Porkbun {
            credentials,
            base_url: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ProviderConfig::Porkbun {
                credentials,
                base_url,
                timeout_secs,
            } => {
                credentials.validate()?;
                if *timeout_secs == 0 {
                    return Err(crate::Error::config("Request timeout must be > 0"));
                }
                if let Some(url) = base_url
                    && !url.starts_with("https://")
                    && !url.starts_with("http://")
                {
                    return Err(crate::Error::config(format!(
                        "Base URL must use HTTP or HTTPS scheme. Got: {}",
                        url
                    )));
                }
                Ok(())
            }
            ProviderConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config(
                        "Custom provider factory cannot be empty",
                    ));
                }
                if config.is_null() {
                    return Err(crate::Error::config(
                        "Custom provider config cannot be null",
                    ));
                }
                Ok(())
            }
        }
    }

    /// Get the provider type name
    pub fn type_name(&self) -> &str {
        match self {
            ProviderConfig::Porkbun { .. } => "porkbun",
            ProviderConfig::Custom { factory, .. } => factory,
        }
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Declared state: every record and nameserver set the host wants to exist
///
/// Keys are resource addresses chosen by the host; they identify tracked
/// state between runs and never reach the registrar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesiredState {
    /// Records by address
    #[serde(default)]
    pub records: BTreeMap<String, RecordSpec>,

    /// Nameserver sets by address
    #[serde(default)]
    pub nameservers: BTreeMap<String, NameServerSet>,
}

impl DesiredState {
    /// Create an empty desired state
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record
    pub fn with_record(mut self, address: impl Into<String>, spec: RecordSpec) -> Self {
        self.records.insert(address.into(), spec);
        self
    }

    /// Add a nameserver set
    pub fn with_nameservers(mut self, address: impl Into<String>, set: NameServerSet) -> Self {
        self.nameservers.insert(address.into(), set);
        self
    }

    /// Parse a JSON manifest
    pub fn from_json(json: &str) -> Result<Self, crate::Error> {
        let state: DesiredState = serde_json::from_str(json)
            .map_err(|e| crate::Error::invalid_input(format!("Invalid manifest: {}", e)))?;
        state.validate()?;
        Ok(state)
    }

    /// Validate every entry
    pub fn validate(&self) -> Result<(), crate::Error> {
        for (address, spec) in &self.records {
            spec.validate().map_err(|e| {
                crate::Error::invalid_input(format!("records.{}: {}", address, e))
            })?;
        }

        let mut owners: HashMap<&str, &str> = HashMap::new();
        for (address, set) in &self.nameservers {
            set.validate().map_err(|e| {
                crate::Error::invalid_input(format!("nameservers.{}: {}", address, e))
            })?;
            if self.records.contains_key(address) {
                return Err(crate::Error::invalid_input(format!(
                    "Address '{}' is used by both a record and a nameserver set",
                    address
                )));
            }
            if let Some(previous) = owners.insert(set.domain.as_str(), address.as_str()) {
                return Err(crate::Error::invalid_input(format!(
                    "Nameservers for {} are declared twice ({} and {})",
                    set.domain, previous, address
                )));
            }
        }

        Ok(())
    }

    /// Total number of declared resources
    pub fn len(&self) -> usize {
        self.records.len() + self.nameservers.len()
    }

    /// True when nothing is declared
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True if `address` is declared as a record or as a nameserver set
    pub fn declares(&self, address: &str) -> bool {
        self.records.contains_key(address) || self.nameservers.contains_key(address)
    }
}
