//! DNS record data model
//!
//! - [`RecordType`]: the closed set of record types the registrar accepts
//! - [`RecordSpec`]: declared (desired) record fields
//! - [`DnsRecord`]: canonical tracked state, a spec plus the remote id
//! - [`RecordPayload`]: the create/edit body handed to a gateway
//! - [`RemoteRecord`]: a record exactly as the gateway decoded it

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default TTL sent when none is declared (also the registrar minimum)
pub const DEFAULT_TTL: &str = "600";

/// Default priority sent when none is declared
pub const DEFAULT_PRIORITY: &str = "0";

/// DNS record type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RecordType {
    A,
    Mx,
    Cname,
    Alias,
    Txt,
    Ns,
    Aaaa,
    Srv,
    Tlsa,
    Caa,
    Https,
    Svcb,
}

impl RecordType {
    /// All supported record types, in registrar documentation order
    pub const ALL: [RecordType; 12] = [
        RecordType::A,
        RecordType::Mx,
        RecordType::Cname,
        RecordType::Alias,
        RecordType::Txt,
        RecordType::Ns,
        RecordType::Aaaa,
        RecordType::Srv,
        RecordType::Tlsa,
        RecordType::Caa,
        RecordType::Https,
        RecordType::Svcb,
    ];

    /// Wire name of the type
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Mx => "MX",
            RecordType::Cname => "CNAME",
            RecordType::Alias => "ALIAS",
            RecordType::Txt => "TXT",
            RecordType::Ns => "NS",
            RecordType::Aaaa => "AAAA",
            RecordType::Srv => "SRV",
            RecordType::Tlsa => "TLSA",
            RecordType::Caa => "CAA",
            RecordType::Https => "HTTPS",
            RecordType::Svcb => "SVCB",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = Error;

    /// Exact, case-sensitive match against the wire names
    fn from_str(s: &str) -> Result<Self> {
        RecordType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                let valid: Vec<&str> = RecordType::ALL.iter().map(|t| t.as_str()).collect();
                Error::invalid_input(format!(
                    "Unsupported record type '{}'. Valid types are: {}",
                    s,
                    valid.join(", ")
                ))
            })
    }
}

impl TryFrom<String> for RecordType {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<RecordType> for String {
    fn from(value: RecordType) -> Self {
        value.as_str().to_string()
    }
}

fn default_ttl() -> String {
    DEFAULT_TTL.to_string()
}

fn default_priority() -> String {
    DEFAULT_PRIORITY.to_string()
}

/// Declared state of a single DNS record
///
/// TTL and priority stay strings end to end; the registrar's fields are
/// string-typed and values are passed through without numeric checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSpec {
    /// Parent zone. Changing it means destroy-then-create.
    pub domain: String,

    /// Fragment relative to `domain`; `""` is the apex, `*` a wildcard
    #[serde(default)]
    pub name: String,

    /// Record type
    #[serde(rename = "type")]
    pub record_type: RecordType,

    /// Answer payload
    pub content: String,

    /// Time to live in seconds
    #[serde(default = "default_ttl")]
    pub ttl: String,

    /// Priority for types that use it
    #[serde(default = "default_priority", alias = "prio")]
    pub priority: String,

    /// Free-form notes
    #[serde(default)]
    pub notes: String,
}

impl RecordSpec {
    /// Create a spec with all optional fields defaulted
    pub fn new(
        domain: impl Into<String>,
        record_type: RecordType,
        content: impl Into<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            name: String::new(),
            record_type,
            content: content.into(),
            ttl: default_ttl(),
            priority: default_priority(),
            notes: String::new(),
        }
    }

    /// Create a spec from an untyped record type, validating it first
    pub fn parse(
        domain: impl Into<String>,
        record_type: &str,
        content: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self::new(domain, record_type.parse()?, content))
    }

    /// Set the subdomain fragment
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the TTL
    pub fn with_ttl(mut self, ttl: impl Into<String>) -> Self {
        self.ttl = ttl.into();
        self
    }

    /// Set the priority
    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = priority.into();
        self
    }

    /// Set the notes
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Check the fields that must hold before any remote call
    pub fn validate(&self) -> Result<()> {
        if self.domain.trim().is_empty() {
            return Err(Error::invalid_input("Record domain cannot be empty"));
        }
        if self.domain.contains('/') {
            return Err(Error::invalid_input(format!(
                "Record domain '{}' cannot contain '/'",
                self.domain
            )));
        }
        Ok(())
    }

    /// Fully-qualified name this spec resolves to
    pub fn fqdn(&self) -> String {
        crate::names::to_absolute(&self.domain, &self.name)
    }
}

/// Canonical tracked state of a record that exists remotely
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    /// Id assigned by the registrar at creation
    pub id: String,

    /// Record fields
    #[serde(flatten)]
    pub spec: RecordSpec,
}

impl DnsRecord {
    /// Pair a spec with the id the registrar assigned
    pub fn new(id: impl Into<String>, spec: RecordSpec) -> Self {
        Self { id: id.into(), spec }
    }

    /// Parent zone
    pub fn domain(&self) -> &str {
        &self.spec.domain
    }

    /// `<domain>/<id>`, the form accepted by record import
    pub fn composite_id(&self) -> String {
        format!("{}/{}", self.spec.domain, self.id)
    }
}

/// Body fields of a create or edit call
///
/// Identity (`domain`, `id`) is deliberately absent: it travels in the
/// request path and can never be changed by an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordPayload {
    pub name: String,
    pub record_type: RecordType,
    pub content: String,
    pub ttl: String,
    pub prio: String,
    pub notes: String,
}

impl From<&RecordSpec> for RecordPayload {
    fn from(spec: &RecordSpec) -> Self {
        Self {
            name: spec.name.clone(),
            record_type: spec.record_type,
            content: spec.content.clone(),
            ttl: spec.ttl.clone(),
            prio: spec.priority.clone(),
            notes: spec.notes.clone(),
        }
    }
}

/// A record as returned by the registrar, before normalization
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RemoteRecord {
    pub id: String,
    /// Fully-qualified name
    pub name: String,
    /// Untyped record type as sent by the remote side
    pub record_type: String,
    pub content: String,
    pub ttl: String,
    pub prio: String,
    pub notes: String,
}

impl RemoteRecord {
    /// Normalize into canonical state relative to `domain`
    pub fn into_record(self, domain: &str) -> Result<DnsRecord> {
        let record_type = self.record_type.parse::<RecordType>().map_err(|_| {
            Error::malformed(format!(
                "Record {} has unsupported type '{}'",
                self.id, self.record_type
            ))
        })?;

        Ok(DnsRecord {
            id: self.id,
            spec: RecordSpec {
                domain: domain.to_string(),
                name: crate::names::to_relative(domain, &self.name),
                record_type,
                content: self.content,
                ttl: self.ttl,
                priority: self.prio,
                notes: self.notes,
            },
        })
    }
}
