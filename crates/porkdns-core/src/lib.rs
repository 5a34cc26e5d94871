// # porkdns-core
//
// Core library for reconciling registrar-hosted DNS records and
// nameserver sets against a declared configuration.
//
// ## Architecture Overview
//
// - **DnsGateway**: Trait for the registrar's record and nameserver API
// - **RecordReconciler / NameServerReconciler**: Lifecycle capabilities
//   (create, read, update, delete, import) for each resource kind
// - **Session**: Credential probe that hands out reconcilers
// - **StateStore**: Trait for persisting tracked resources between runs
// - **ReconcileEngine**: Drives apply, refresh, destroy and import passes
// - **GatewayRegistry**: Plugin-based registry for gateway implementations
//
// Gateways live in their own crates (see `porkdns-provider-porkbun`) and
// register themselves with the registry; nothing in this crate performs
// network I/O.

pub mod config;
pub mod engine;
pub mod error;
pub mod import;
pub mod names;
pub mod nameserver;
pub mod reconcile;
pub mod record;
pub mod registry;
pub mod state;
pub mod traits;

// Re-export core types for convenience
pub use config::{Credentials, DesiredState, ProviderConfig};
pub use engine::{ApplyReport, EngineEvent, ReconcileEngine};
pub use error::{Error, ErrorKind, Result};
pub use nameserver::NameServerSet;
pub use reconcile::Session;
pub use record::{DnsRecord, RecordSpec, RecordType};
pub use registry::GatewayRegistry;
pub use state::{FileStateStore, MemoryStateStore};
pub use traits::{DnsGateway, NameServerReconciler, RecordReconciler, StateStore};
