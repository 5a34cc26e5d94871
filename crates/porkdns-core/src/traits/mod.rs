//! Core traits for porkdns
//!
//! - [`DnsGateway`]: Talk to the registrar API
//! - [`RecordReconciler`] / [`NameServerReconciler`]: Lifecycle capabilities exposed to hosts
//! - [`StateStore`]: Tracked-state persistence

pub mod gateway;
pub mod reconciler;
pub mod state_store;

pub use gateway::{DnsGateway, GatewayFactory};
pub use reconciler::{NameServerReconciler, RecordReconciler};
pub use state_store::{StateStore, TrackedEntry, TrackedResource};
