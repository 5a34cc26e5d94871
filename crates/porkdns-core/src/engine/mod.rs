//! Reconciliation engine
//!
//! The ReconcileEngine is responsible for:
//! - Comparing declared state with tracked state
//! - Invoking the record and nameserver reconcilers once per resource
//! - Writing the resulting canonical state back to the StateStore
//! - Reporting one event per resource
//!
//! ## Architecture
//!
//! ```text
//!                    ┌────────────────┐
//!  DesiredState ───▶ │ ReconcileEngine│ ───▶ ApplyReport
//!                    └────────────────┘
//!                            │
//!         ┌──────────────────┼────────────────────┐
//!         ▼                  ▼                    ▼
//! ┌──────────────┐  ┌────────────────────┐  ┌─────────────┐
//! │RecordReconc. │  │NameServerReconciler│  │ StateStore  │
//! └──────────────┘  └────────────────────┘  └─────────────┘
//!         │                  │
//!         └───────┬──────────┘
//!                 ▼
//!           ┌──────────┐
//!           │DnsGateway│
//!           └──────────┘
//! ```
//!
//! ## Failure handling
//!
//! A failing resource is reported as [`EngineEvent::Failed`] and its
//! tracked state is left as it was; the pass continues with the next
//! resource. Only state-store failures abort a pass.

use std::fmt;

use tracing::{debug, error, info, warn};

use crate::config::DesiredState;
use crate::error::{Error, ErrorKind, Result};
use crate::nameserver::NameServerSet;
use crate::reconcile::{NameServerAction, RecordAction, Session, plan_nameservers, plan_record};
use crate::record::{DnsRecord, RecordSpec};
use crate::traits::{
    NameServerReconciler, RecordReconciler, StateStore, TrackedEntry, TrackedResource,
};

/// Events emitted by the ReconcileEngine, one per resource touched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Resource created remotely and now tracked
    Created { address: String, detail: String },

    /// Resource changed in place
    Updated { address: String, detail: String },

    /// Resource destroyed and recreated under a new domain
    Replaced { address: String, detail: String },

    /// Resource destroyed remotely and no longer tracked
    Deleted { address: String, detail: String },

    /// Tracked state already matched the declaration
    Unchanged { address: String },

    /// Tracked state updated from the registrar
    Refreshed { address: String },

    /// Resource vanished remotely and was dropped from tracked state
    Dropped { address: String },

    /// Existing resource adopted into tracked state
    Imported { address: String, detail: String },

    /// Operation failed; tracked state unchanged
    Failed {
        address: String,
        kind: ErrorKind,
        detail: String,
    },
}

impl EngineEvent {
    /// Address of the resource this event concerns
    pub fn address(&self) -> &str {
        match self {
            EngineEvent::Created { address, .. }
            | EngineEvent::Updated { address, .. }
            | EngineEvent::Replaced { address, .. }
            | EngineEvent::Deleted { address, .. }
            | EngineEvent::Unchanged { address }
            | EngineEvent::Refreshed { address }
            | EngineEvent::Dropped { address }
            | EngineEvent::Imported { address, .. }
            | EngineEvent::Failed { address, .. } => address,
        }
    }

    /// True for [`EngineEvent::Failed`]
    pub fn is_failure(&self) -> bool {
        matches!(self, EngineEvent::Failed { .. })
    }

    fn failed(address: &str, err: &Error) -> Self {
        EngineEvent::Failed {
            address: address.to_string(),
            kind: err.kind(),
            detail: err.to_string(),
        }
    }
}

impl fmt::Display for EngineEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineEvent::Created { address, detail } => {
                write!(f, "{}: created ({})", address, detail)
            }
            EngineEvent::Updated { address, detail } => {
                write!(f, "{}: updated ({})", address, detail)
            }
            EngineEvent::Replaced { address, detail } => {
                write!(f, "{}: replaced ({})", address, detail)
            }
            EngineEvent::Deleted { address, detail } => {
                write!(f, "{}: deleted ({})", address, detail)
            }
            EngineEvent::Unchanged { address } => write!(f, "{}: unchanged", address),
            EngineEvent::Refreshed { address } => write!(f, "{}: refreshed", address),
            EngineEvent::Dropped { address } => {
                write!(f, "{}: gone remotely, dropped from state", address)
            }
            EngineEvent::Imported { address, detail } => {
                write!(f, "{}: imported ({})", address, detail)
            }
            EngineEvent::Failed {
                address,
                kind,
                detail,
            } => write!(f, "{}: FAILED [{}] {}", address, kind, detail),
        }
    }
}

/// Outcome of one engine pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Events in the order resources were processed
    pub events: Vec<EngineEvent>,
}

impl ApplyReport {
    /// Events that represent failures
    pub fn failures(&self) -> Vec<&EngineEvent> {
        self.events.iter().filter(|e| e.is_failure()).collect()
    }

    /// True if any resource failed
    pub fn has_failures(&self) -> bool {
        self.events.iter().any(EngineEvent::is_failure)
    }

    /// Event recorded for `address`, if any
    pub fn event_for(&self, address: &str) -> Option<&EngineEvent> {
        self.events.iter().find(|e| e.address() == address)
    }

    fn push(&mut self, event: EngineEvent) {
        match &event {
            EngineEvent::Failed { .. } => error!("{}", event),
            EngineEvent::Unchanged { .. } | EngineEvent::Refreshed { .. } => debug!("{}", event),
            EngineEvent::Dropped { .. } => warn!("{}", event),
            _ => info!("{}", event),
        }
        self.events.push(event);
    }
}

/// Core reconciliation engine
///
/// The engine holds no state of its own between passes; everything it
/// knows about existing resources comes from the StateStore.
pub struct ReconcileEngine {
    records: Box<dyn RecordReconciler>,
    nameservers: Box<dyn NameServerReconciler>,
    state_store: Box<dyn StateStore>,
}

impl ReconcileEngine {
    /// Create an engine from explicit reconcilers
    pub fn new(
        records: Box<dyn RecordReconciler>,
        nameservers: Box<dyn NameServerReconciler>,
        state_store: Box<dyn StateStore>,
    ) -> Self {
        Self {
            records,
            nameservers,
            state_store,
        }
    }

    /// Create an engine using the reconcilers of an established session
    pub fn from_session(session: &Session, state_store: Box<dyn StateStore>) -> Self {
        Self::new(
            Box::new(session.records()),
            Box::new(session.nameservers()),
            state_store,
        )
    }

    /// Tracked state store
    pub fn state_store(&self) -> &dyn StateStore {
        self.state_store.as_ref()
    }

    /// Converge remote state to `desired`
    ///
    /// Declared resources are created, updated or replaced; tracked
    /// resources that are no longer declared are destroyed.
    pub async fn apply(&self, desired: &DesiredState) -> Result<ApplyReport> {
        desired.validate()?;
        info!("Applying {} declared resource(s)", desired.len());

        let mut report = ApplyReport::default();

        for (address, spec) in &desired.records {
            match self.tracked_record(address).await {
                Ok(prior) => {
                    self.converge_record(address, Some(spec), prior.as_ref(), &mut report)
                        .await?
                }
                Err(e) => report.push(EngineEvent::failed(address, &e)),
            }
        }

        for (address, set) in &desired.nameservers {
            match self.tracked_nameservers(address).await {
                Ok(prior) => {
                    self.converge_nameservers(address, Some(set), prior.as_ref(), &mut report)
                        .await?
                }
                Err(e) => report.push(EngineEvent::failed(address, &e)),
            }
        }

        // Addresses declared under either kind are never swept
        for address in self.state_store.list().await? {
            if desired.declares(&address) {
                continue;
            }
            let Some(entry) = self.state_store.get(&address).await? else {
                continue;
            };
            match entry.resource {
                TrackedResource::Record(prior) => {
                    self.converge_record(&address, None, Some(&prior), &mut report)
                        .await?
                }
                TrackedResource::NameServers(prior) => {
                    self.converge_nameservers(&address, None, Some(&prior), &mut report)
                        .await?
                }
            }
        }

        self.state_store.flush().await?;
        Ok(report)
    }

    /// Re-read every tracked resource from the registrar
    pub async fn refresh(&self) -> Result<ApplyReport> {
        let mut report = ApplyReport::default();

        for address in self.state_store.list().await? {
            let Some(entry) = self.state_store.get(&address).await? else {
                continue;
            };

            match entry.resource {
                TrackedResource::Record(prior) => {
                    match self.records.read(prior.domain(), &prior.id).await {
                        Ok(Some(current)) => {
                            self.state_store
                                .put(&address, &TrackedEntry::record(current))
                                .await?;
                            report.push(EngineEvent::Refreshed { address });
                        }
                        Ok(None) => {
                            self.state_store.remove(&address).await?;
                            report.push(EngineEvent::Dropped { address });
                        }
                        Err(e) => report.push(EngineEvent::failed(&address, &e)),
                    }
                }
                TrackedResource::NameServers(prior) => {
                    match self.nameservers.read(&prior.domain).await {
                        Ok(current) => {
                            self.state_store
                                .put(&address, &TrackedEntry::nameservers(current))
                                .await?;
                            report.push(EngineEvent::Refreshed { address });
                        }
                        Err(e) => report.push(EngineEvent::failed(&address, &e)),
                    }
                }
            }
        }

        self.state_store.flush().await?;
        Ok(report)
    }

    /// Destroy every tracked resource
    pub async fn destroy(&self) -> Result<ApplyReport> {
        let mut report = ApplyReport::default();

        for address in self.state_store.list().await? {
            let Some(entry) = self.state_store.get(&address).await? else {
                continue;
            };
            match entry.resource {
                TrackedResource::Record(prior) => {
                    self.converge_record(&address, None, Some(&prior), &mut report)
                        .await?
                }
                TrackedResource::NameServers(prior) => {
                    self.converge_nameservers(&address, None, Some(&prior), &mut report)
                        .await?
                }
            }
        }

        self.state_store.flush().await?;
        Ok(report)
    }

    /// Adopt an existing record, given `<domain>/<record-id>`, under `address`
    pub async fn import_record(&self, address: &str, composite_id: &str) -> Result<DnsRecord> {
        self.ensure_untracked(address).await?;

        let record = self.records.import(composite_id).await?;
        self.state_store
            .put(address, &TrackedEntry::record(record.clone()))
            .await?;
        self.state_store.flush().await?;

        info!("{}", EngineEvent::Imported {
            address: address.to_string(),
            detail: composite_id.to_string(),
        });
        Ok(record)
    }

    /// Adopt the nameserver set of `domain` under `address`
    pub async fn import_nameservers(&self, address: &str, domain: &str) -> Result<NameServerSet> {
        self.ensure_untracked(address).await?;

        let set = self.nameservers.import(domain).await?;
        self.state_store
            .put(address, &TrackedEntry::nameservers(set.clone()))
            .await?;
        self.state_store.flush().await?;

        info!("{}", EngineEvent::Imported {
            address: address.to_string(),
            detail: domain.to_string(),
        });
        Ok(set)
    }

    async fn ensure_untracked(&self, address: &str) -> Result<()> {
        if self.state_store.get(address).await?.is_some() {
            return Err(Error::invalid_input(format!(
                "Address '{}' is already tracked; remove it before importing",
                address
            )));
        }
        Ok(())
    }

    /// Tracked record at `address`; a nameserver entry there is a conflict
    async fn tracked_record(&self, address: &str) -> Result<Option<DnsRecord>> {
        match self.state_store.get(address).await? {
            None => Ok(None),
            Some(TrackedEntry {
                resource: TrackedResource::Record(record),
                ..
            }) => Ok(Some(record)),
            Some(_) => Err(Error::invalid_input(format!(
                "Address '{}' already tracks a nameserver set",
                address
            ))),
        }
    }

    /// Tracked nameserver set at `address`; a record entry there is a conflict
    async fn tracked_nameservers(&self, address: &str) -> Result<Option<NameServerSet>> {
        match self.state_store.get(address).await? {
            None => Ok(None),
            Some(TrackedEntry {
                resource: TrackedResource::NameServers(set),
                ..
            }) => Ok(Some(set)),
            Some(_) => Err(Error::invalid_input(format!(
                "Address '{}' already tracks a DNS record",
                address
            ))),
        }
    }

    /// Run the planned record action
    ///
    /// Remote failures become report events; only state-store errors
    /// are returned.
    async fn converge_record(
        &self,
        address: &str,
        desired: Option<&RecordSpec>,
        prior: Option<&DnsRecord>,
        report: &mut ApplyReport,
    ) -> Result<()> {
        let action = plan_record(desired, prior);
        debug!("{}: planned {:?}", address, action);

        match (action, desired, prior) {
            (RecordAction::Create, Some(desired), _) => match self.records.create(desired).await {
                Ok(record) => {
                    let detail = record.composite_id();
                    self.state_store
                        .put(address, &TrackedEntry::record(record))
                        .await?;
                    report.push(EngineEvent::Created {
                        address: address.to_string(),
                        detail,
                    });
                }
                Err(e) => report.push(EngineEvent::failed(address, &e)),
            },
            (RecordAction::Update, Some(desired), Some(prior)) => {
                match self.records.update(prior.domain(), &prior.id, desired).await {
                    Ok(record) => {
                        let detail = record.composite_id();
                        self.state_store
                            .put(address, &TrackedEntry::record(record))
                            .await?;
                        report.push(EngineEvent::Updated {
                            address: address.to_string(),
                            detail,
                        });
                    }
                    Err(e) => report.push(EngineEvent::failed(address, &e)),
                }
            }
            (RecordAction::Replace, Some(desired), Some(prior)) => {
                if let Err(e) = self.records.delete(prior.domain(), &prior.id).await {
                    report.push(EngineEvent::failed(address, &e));
                    return Ok(());
                }
                self.state_store.remove(address).await?;

                match self.records.create(desired).await {
                    Ok(record) => {
                        let detail =
                            format!("{} -> {}", prior.composite_id(), record.composite_id());
                        self.state_store
                            .put(address, &TrackedEntry::record(record))
                            .await?;
                        report.push(EngineEvent::Replaced {
                            address: address.to_string(),
                            detail,
                        });
                    }
                    Err(e) => report.push(EngineEvent::failed(address, &e)),
                }
            }
            (RecordAction::Delete, _, Some(prior)) => {
                match self.records.delete(prior.domain(), &prior.id).await {
                    Ok(()) => {
                        self.state_store.remove(address).await?;
                        report.push(EngineEvent::Deleted {
                            address: address.to_string(),
                            detail: prior.composite_id(),
                        });
                    }
                    Err(e) => report.push(EngineEvent::failed(address, &e)),
                }
            }
            _ => report.push(EngineEvent::Unchanged {
                address: address.to_string(),
            }),
        }

        Ok(())
    }

    /// Run the planned nameserver action
    async fn converge_nameservers(
        &self,
        address: &str,
        desired: Option<&NameServerSet>,
        prior: Option<&NameServerSet>,
        report: &mut ApplyReport,
    ) -> Result<()> {
        let action = plan_nameservers(desired, prior);
        debug!("{}: planned {:?}", address, action);

        match (action, desired, prior) {
            (NameServerAction::Set, Some(desired), prior) => {
                let result = match prior {
                    Some(prior) => self.nameservers.update(&prior.domain, desired).await,
                    None => self.nameservers.create(desired).await,
                };
                match result {
                    Ok(set) => {
                        let detail = set.domain.clone();
                        self.state_store
                            .put(address, &TrackedEntry::nameservers(set))
                            .await?;
                        let address = address.to_string();
                        report.push(if prior.is_some() {
                            EngineEvent::Updated { address, detail }
                        } else {
                            EngineEvent::Created { address, detail }
                        });
                    }
                    Err(e) => report.push(EngineEvent::failed(address, &e)),
                }
            }
            (NameServerAction::Replace, Some(desired), Some(prior)) => {
                if let Err(e) = self.nameservers.delete(&prior.domain).await {
                    report.push(EngineEvent::failed(address, &e));
                    return Ok(());
                }
                self.state_store.remove(address).await?;

                match self.nameservers.create(desired).await {
                    Ok(set) => {
                        let detail = format!("{} -> {}", prior.domain, set.domain);
                        self.state_store
                            .put(address, &TrackedEntry::nameservers(set))
                            .await?;
                        report.push(EngineEvent::Replaced {
                            address: address.to_string(),
                            detail,
                        });
                    }
                    Err(e) => report.push(EngineEvent::failed(address, &e)),
                }
            }
            (NameServerAction::Reset, _, Some(prior)) => {
                match self.nameservers.delete(&prior.domain).await {
                    Ok(()) => {
                        self.state_store.remove(address).await?;
                        report.push(EngineEvent::Deleted {
                            address: address.to_string(),
                            detail: format!("{} reset to registrar defaults", prior.domain),
                        });
                    }
                    Err(e) => report.push(EngineEvent::failed(address, &e)),
                }
            }
            _ => report.push(EngineEvent::Unchanged {
                address: address.to_string(),
            }),
        }

        Ok(())
    }
}
