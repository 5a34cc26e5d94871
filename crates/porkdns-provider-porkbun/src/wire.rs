// # Porkbun wire types
//
// Request bodies always carry both credential fields next to the
// operation-specific fields. Responses are loosely typed: ids, TTLs and
// priorities arrive as strings, numbers or null depending on the
// endpoint, and are normalized to strings here.

use porkdns_core::config::Credentials;
use porkdns_core::record::{RecordPayload, RemoteRecord};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Status value of a successful response
pub(crate) const STATUS_SUCCESS: &str = "SUCCESS";

/// Credential fields embedded in every request body
#[derive(Serialize)]
pub(crate) struct Auth<'a> {
    secretapikey: &'a str,
    apikey: &'a str,
}

impl<'a> From<&'a Credentials> for Auth<'a> {
    fn from(credentials: &'a Credentials) -> Self {
        Self {
            secretapikey: &credentials.secret_api_key,
            apikey: &credentials.api_key,
        }
    }
}

/// Body of `/dns/create` and `/dns/edit`
///
/// Empty optional fields are left out so the registrar applies its own
/// defaults.
#[derive(Serialize)]
pub(crate) struct RecordBody<'a> {
    #[serde(flatten)]
    auth: Auth<'a>,
    #[serde(skip_serializing_if = "is_empty")]
    name: &'a str,
    #[serde(rename = "type")]
    record_type: &'static str,
    content: &'a str,
    #[serde(skip_serializing_if = "is_empty")]
    ttl: &'a str,
    #[serde(skip_serializing_if = "is_empty")]
    prio: &'a str,
    #[serde(skip_serializing_if = "is_empty")]
    notes: &'a str,
}

impl<'a> RecordBody<'a> {
    pub(crate) fn new(credentials: &'a Credentials, payload: &'a RecordPayload) -> Self {
        Self {
            auth: Auth::from(credentials),
            name: &payload.name,
            record_type: payload.record_type.as_str(),
            content: &payload.content,
            ttl: &payload.ttl,
            prio: &payload.prio,
            notes: &payload.notes,
        }
    }
}

/// Body of `/domain/updateNs`
#[derive(Serialize)]
pub(crate) struct NameServerBody<'a> {
    #[serde(flatten)]
    auth: Auth<'a>,
    ns: &'a [String],
}

impl<'a> NameServerBody<'a> {
    pub(crate) fn new(credentials: &'a Credentials, nameservers: &'a [String]) -> Self {
        Self {
            auth: Auth::from(credentials),
            ns: nameservers,
        }
    }
}

/// Any response body
///
/// Only `status` is always present; the other fields depend on the
/// endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiResponse {
    pub status: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub message: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default)]
    pub records: Option<Vec<WireRecord>>,
    #[serde(default)]
    pub ns: Option<Vec<String>>,
}

impl ApiResponse {
    pub(crate) fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }

    /// Remote explanation of a failed status, verbatim
    pub(crate) fn failure_message(&self) -> String {
        if self.message.is_empty() {
            format!("status {}", self.status)
        } else {
            self.message.clone()
        }
    }
}

/// A record entry of `/dns/retrieve`
#[derive(Debug, Default, Deserialize)]
pub(crate) struct WireRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, rename = "type", deserialize_with = "lenient_string")]
    pub record_type: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub content: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub ttl: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub prio: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub notes: String,
}

impl From<WireRecord> for RemoteRecord {
    fn from(wire: WireRecord) -> Self {
        RemoteRecord {
            id: wire.id,
            name: wire.name,
            record_type: wire.record_type,
            content: wire.content,
            ttl: wire.ttl,
            prio: wire.prio,
            notes: wire.notes,
        }
    }
}

fn is_empty(value: &&str) -> bool {
    value.is_empty()
}

/// Accept a string, number, boolean or null; null becomes ""
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or number, got {}",
            other
        ))),
    }
}
