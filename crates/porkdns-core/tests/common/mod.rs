//! Test doubles and common utilities for contract tests
//!
//! [`FakeGateway`] keeps records and nameserver sets in memory, counts
//! calls, and can be scripted to fail a given operation.

#![allow(dead_code)]

use porkdns_core::error::{Error, Result};
use porkdns_core::names;
use porkdns_core::record::{RecordPayload, RemoteRecord};
use porkdns_core::traits::DnsGateway;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

pub const DOMAIN: &str = "example.com";
pub const OTHER_DOMAIN: &str = "example.net";

/// How a scripted operation should fail
#[derive(Debug, Clone)]
pub enum Failure {
    NotFound,
    Api(&'static str),
    Http(&'static str),
}

impl Failure {
    fn to_error(&self, operation: &str) -> Error {
        match self {
            Failure::NotFound => Error::not_found(format!("{}: no such resource", operation)),
            Failure::Api(msg) => Error::api(operation, *msg),
            Failure::Http(msg) => Error::http(*msg),
        }
    }
}

/// An in-memory gateway that tracks calls
#[derive(Default)]
pub struct FakeGateway {
    records: Mutex<BTreeMap<(String, String), RemoteRecord>>,
    nameservers: Mutex<HashMap<String, Vec<String>>>,
    next_id: AtomicU64,
    calls: Mutex<Vec<String>>,
    payloads: Mutex<Vec<RecordPayload>>,
    nameserver_writes: Mutex<Vec<(String, Vec<String>)>>,
    failures: Mutex<HashMap<&'static str, Failure>>,
}

impl FakeGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            next_id: AtomicU64::new(106926652),
            ..Default::default()
        })
    }

    /// Make every call of `operation` fail
    pub fn fail_on(&self, operation: &'static str, failure: Failure) {
        self.failures.lock().unwrap().insert(operation, failure);
    }

    /// Stop failing `operation`
    pub fn heal(&self, operation: &'static str) {
        self.failures.lock().unwrap().remove(operation);
    }

    /// Seed a record as if it already existed remotely
    pub fn seed_record(&self, domain: &str, record: RemoteRecord) {
        self.records
            .lock()
            .unwrap()
            .insert((domain.to_string(), record.id.clone()), record);
    }

    /// Remove a record behind the engine's back
    pub fn vanish_record(&self, domain: &str, id: &str) {
        self.records
            .lock()
            .unwrap()
            .remove(&(domain.to_string(), id.to_string()));
    }

    /// Seed the nameservers of a domain
    pub fn seed_nameservers(&self, domain: &str, nameservers: &[&str]) {
        self.nameservers.lock().unwrap().insert(
            domain.to_string(),
            nameservers.iter().map(|s| s.to_string()).collect(),
        );
    }

    /// Stored record, if any
    pub fn record(&self, domain: &str, id: &str) -> Option<RemoteRecord> {
        self.records
            .lock()
            .unwrap()
            .get(&(domain.to_string(), id.to_string()))
            .cloned()
    }

    pub fn record_count(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    /// Every call made, as `"<operation> <domain>"`
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of calls made to `operation`
    pub fn call_count(&self, operation: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.split(' ').next() == Some(operation))
            .count()
    }

    /// Payloads sent by create and edit, in order
    pub fn payloads(&self) -> Vec<RecordPayload> {
        self.payloads.lock().unwrap().clone()
    }

    /// Nameserver lists sent by update_name_servers, in order
    pub fn nameserver_writes(&self) -> Vec<(String, Vec<String>)> {
        self.nameserver_writes.lock().unwrap().clone()
    }

    fn enter(&self, operation: &'static str, domain: &str) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{} {}", operation, domain));

        match self.failures.lock().unwrap().get(operation) {
            Some(failure) => Err(failure.to_error(operation)),
            None => Ok(()),
        }
    }

    fn remote_from(domain: &str, id: &str, payload: &RecordPayload) -> RemoteRecord {
        let or_default = |value: &str, default: &str| {
            if value.is_empty() {
                default.to_string()
            } else {
                value.to_string()
            }
        };

        RemoteRecord {
            id: id.to_string(),
            name: names::to_absolute(domain, &payload.name),
            record_type: payload.record_type.to_string(),
            content: payload.content.clone(),
            ttl: or_default(&payload.ttl, "600"),
            prio: or_default(&payload.prio, "0"),
            notes: payload.notes.clone(),
        }
    }
}

#[async_trait::async_trait]
impl DnsGateway for FakeGateway {
    async fn ping(&self) -> Result<()> {
        self.enter("ping", "-")
    }

    async fn create_record(&self, domain: &str, payload: &RecordPayload) -> Result<String> {
        self.enter("create_record", domain)?;
        self.payloads.lock().unwrap().push(payload.clone());

        let id = self.next_id.fetch_add(1, Ordering::SeqCst).to_string();
        let remote = Self::remote_from(domain, &id, payload);
        self.records
            .lock()
            .unwrap()
            .insert((domain.to_string(), id.clone()), remote);
        Ok(id)
    }

    async fn get_record(&self, domain: &str, id: &str) -> Result<RemoteRecord> {
        self.enter("get_record", domain)?;
        self.record(domain, id)
            .ok_or_else(|| Error::not_found(format!("DNS record {} not found", id)))
    }

    async fn edit_record(&self, domain: &str, id: &str, payload: &RecordPayload) -> Result<()> {
        self.enter("edit_record", domain)?;
        self.payloads.lock().unwrap().push(payload.clone());

        let mut records = self.records.lock().unwrap();
        let key = (domain.to_string(), id.to_string());
        if !records.contains_key(&key) {
            return Err(Error::api("edit DNS record", "Invalid record ID."));
        }
        records.insert(key, Self::remote_from(domain, id, payload));
        Ok(())
    }

    async fn delete_record(&self, domain: &str, id: &str) -> Result<()> {
        self.enter("delete_record", domain)?;
        self.records
            .lock()
            .unwrap()
            .remove(&(domain.to_string(), id.to_string()));
        Ok(())
    }

    async fn get_name_servers(&self, domain: &str) -> Result<Vec<String>> {
        self.enter("get_name_servers", domain)?;
        Ok(self
            .nameservers
            .lock()
            .unwrap()
            .get(domain)
            .cloned()
            .unwrap_or_default())
    }

    async fn update_name_servers(&self, domain: &str, nameservers: &[String]) -> Result<()> {
        self.enter("update_name_servers", domain)?;
        self.nameserver_writes
            .lock()
            .unwrap()
            .push((domain.to_string(), nameservers.to_vec()));
        self.nameservers
            .lock()
            .unwrap()
            .insert(domain.to_string(), nameservers.to_vec());
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}

/// Gateway as the trait object the reconcilers take
pub fn as_gateway(fake: &Arc<FakeGateway>) -> Arc<dyn DnsGateway> {
    Arc::clone(fake) as Arc<dyn DnsGateway>
}
