// # Porkbun Gateway
//
// This crate provides the Porkbun JSON API v3 implementation of
// `DnsGateway` for porkdns.
//
// - One HTTP request per gateway call; no retries, no caching
// - Every request is a POST whose JSON body carries both credentials
// - Per-request timeout configured on the client (30 seconds by default)
// - Non-2xx statuses, network failures and undecodable bodies are
//   transport errors; a non-SUCCESS `status` is an API error carrying the
//   remote message verbatim; an empty record list is a not-found error
//
// ## Security Requirements
//
// - Credentials NEVER appear in logs or in Debug output
// - Request bodies are never logged
//
// ## API Reference
//
// - Ping: POST `/ping`
// - Records: POST `/dns/create/:domain`, `/dns/retrieve/:domain/:id`,
//   `/dns/edit/:domain/:id`, `/dns/delete/:domain/:id`
// - Nameservers: POST `/domain/getNs/:domain`, `/domain/updateNs/:domain`

mod wire;

use async_trait::async_trait;
use porkdns_core::config::{Credentials, DEFAULT_BASE_URL, ProviderConfig};
use porkdns_core::record::{RecordPayload, RemoteRecord};
use porkdns_core::registry::GatewayRegistry;
use porkdns_core::traits::{DnsGateway, GatewayFactory};
use porkdns_core::{Error, Result};
use serde::Serialize;
use std::time::Duration;

use wire::{ApiResponse, Auth, NameServerBody, RecordBody};

/// Name under which the gateway registers itself
pub const PROVIDER_NAME: &str = "porkbun";

/// Porkbun JSON API gateway
///
/// Holds immutable credentials and endpoint configuration; safe to share
/// across tasks.
pub struct PorkbunGateway {
    /// API credentials
    /// ⚠️ NEVER log these values
    credentials: Credentials,

    /// Endpoint without trailing slash
    base_url: String,

    /// Per-request timeout, kept for error messages
    timeout: Duration,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the credentials
impl std::fmt::Debug for PorkbunGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PorkbunGateway")
            .field("credentials", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl PorkbunGateway {
    /// Create a new Porkbun gateway
    ///
    /// # Parameters
    ///
    /// - `credentials`: API key and secret API key
    /// - `base_url`: Endpoint override; `None` uses the public API
    /// - `timeout`: Upper bound for each request
    pub fn new(
        credentials: Credentials,
        base_url: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        credentials.validate()?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::setup(format!("Failed to build HTTP client: {}", e)))?;

        let base_url = base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            credentials,
            base_url,
            timeout,
            client,
        })
    }

    /// Create a gateway from a `ProviderConfig::Porkbun`
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        match config {
            ProviderConfig::Porkbun {
                credentials,
                base_url,
                timeout_secs,
            } => Self::new(
                credentials.clone(),
                base_url.clone(),
                Duration::from_secs(*timeout_secs),
            ),
            _ => Err(Error::config("Invalid config for Porkbun provider")),
        }
    }

    /// Endpoint requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn auth(&self) -> Auth<'_> {
        Auth::from(&self.credentials)
    }

    /// POST `body` to `path` and decode a successful response
    ///
    /// `operation` names the call in error messages.
    async fn call<B: Serialize + ?Sized>(
        &self,
        operation: &str,
        path: &str,
        body: &B,
    ) -> Result<ApiResponse> {
        tracing::debug!("Porkbun API call: {} (POST {})", operation, path);

        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(operation, e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| self.transport_error(operation, e))?;

        if !status.is_success() {
            // Map HTTP status codes to specific messages; all of them are
            // transport failures
            return Err(match status.as_u16() {
                401 | 403 => Error::http(format!(
                    "{}: authentication failed. Status: {} - {}",
                    operation, status, text
                )),
                429 => Error::http(format!(
                    "{}: rate limit exceeded. Status: {} - {}",
                    operation, status, text
                )),
                500..=599 => Error::http(format!(
                    "{}: Porkbun server error (transient): {} - {}",
                    operation, status, text
                )),
                _ => Error::http(format!(
                    "{}: API returned status {}: {}",
                    operation, status, text
                )),
            });
        }

        let decoded: ApiResponse = serde_json::from_str(&text).map_err(|e| {
            Error::malformed(format!("{}: failed to parse response: {}", operation, e))
        })?;

        if !decoded.is_success() {
            tracing::debug!("Porkbun API rejected {}: {}", operation, decoded.status);
            return Err(Error::api(operation, decoded.failure_message()));
        }

        Ok(decoded)
    }

    fn transport_error(&self, operation: &str, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::timeout(format!(
                "{}: no response within {}s",
                operation,
                self.timeout.as_secs_f64()
            ))
        } else {
            Error::http(format!("{}: request failed: {}", operation, err))
        }
    }
}

#[async_trait]
impl DnsGateway for PorkbunGateway {
    async fn ping(&self) -> Result<()> {
        self.call("API ping", "/ping", &self.auth()).await?;
        Ok(())
    }

    async fn create_record(&self, domain: &str, payload: &RecordPayload) -> Result<String> {
        let body = RecordBody::new(&self.credentials, payload);
        let resp = self
            .call("create DNS record", &format!("/dns/create/{}", domain), &body)
            .await?;

        if resp.id.is_empty() {
            return Err(Error::malformed(
                "create DNS record: response carried no record id",
            ));
        }

        tracing::debug!("Porkbun assigned record id {} in {}", resp.id, domain);
        Ok(resp.id)
    }

    async fn get_record(&self, domain: &str, id: &str) -> Result<RemoteRecord> {
        let resp = self
            .call(
                "retrieve DNS record",
                &format!("/dns/retrieve/{}/{}", domain, id),
                &self.auth(),
            )
            .await?;

        resp.records
            .unwrap_or_default()
            .into_iter()
            .next()
            .map(RemoteRecord::from)
            .ok_or_else(|| Error::not_found(format!("DNS record {}/{} not found", domain, id)))
    }

    async fn edit_record(&self, domain: &str, id: &str, payload: &RecordPayload) -> Result<()> {
        let body = RecordBody::new(&self.credentials, payload);
        self.call("edit DNS record", &format!("/dns/edit/{}/{}", domain, id), &body)
            .await?;
        Ok(())
    }

    async fn delete_record(&self, domain: &str, id: &str) -> Result<()> {
        self.call(
            "delete DNS record",
            &format!("/dns/delete/{}/{}", domain, id),
            &self.auth(),
        )
        .await?;
        Ok(())
    }

    async fn get_name_servers(&self, domain: &str) -> Result<Vec<String>> {
        let resp = self
            .call(
                "get name servers",
                &format!("/domain/getNs/{}", domain),
                &self.auth(),
            )
            .await?;

        resp.ns.ok_or_else(|| {
            Error::malformed(format!("get name servers: response for {} has no ns list", domain))
        })
    }

    async fn update_name_servers(&self, domain: &str, nameservers: &[String]) -> Result<()> {
        let body = NameServerBody::new(&self.credentials, nameservers);
        self.call(
            "update name servers",
            &format!("/domain/updateNs/{}", domain),
            &body,
        )
        .await?;
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

/// Factory for creating Porkbun gateways
pub struct PorkbunFactory;

impl GatewayFactory for PorkbunFactory {
    fn create(&self, config: &ProviderConfig) -> Result<Box<dyn DnsGateway>> {
        Ok(Box::new(PorkbunGateway::from_config(config)?))
    }
}

/// Register the Porkbun gateway with a registry
///
/// # Example
///
/// ```rust
/// use porkdns_core::GatewayRegistry;
///
/// let registry = GatewayRegistry::new();
/// porkdns_provider_porkbun::register(&registry);
/// assert!(registry.has_gateway("porkbun"));
/// ```
pub fn register(registry: &GatewayRegistry) {
    registry.register_gateway(PROVIDER_NAME, Box::new(PorkbunFactory));
}
