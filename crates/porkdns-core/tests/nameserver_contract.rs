//! Contract Test: Nameserver sets
//!
//! Constraints verified:
//! - Every write sends the complete set in lexicographic order
//! - Declaration order never changes the payload
//! - Delete restores exactly the four registrar defaults
//! - Empty sets are rejected before any call

mod common;

use common::*;
use porkdns_core::ErrorKind;
use porkdns_core::nameserver::{DEFAULT_NAMESERVERS, NameServerSet};
use porkdns_core::reconcile::NameServerManager;
use porkdns_core::traits::NameServerReconciler;

fn manager(fake: &std::sync::Arc<FakeGateway>) -> NameServerManager {
    NameServerManager::new(as_gateway(fake))
}

#[tokio::test]
async fn create_sends_sorted_full_list() {
    let fake = FakeGateway::new();

    let set = NameServerSet::new(
        DOMAIN,
        ["ns2.host.net", "ns1.host.net", "a.ns.cloud.example"],
    );
    let written = manager(&fake).create(&set).await.unwrap();
    assert_eq!(written, set);

    assert_eq!(fake.nameserver_writes(), vec![(
        DOMAIN.to_string(),
        vec![
            "a.ns.cloud.example".to_string(),
            "ns1.host.net".to_string(),
            "ns2.host.net".to_string(),
        ],
    )]);
}

#[tokio::test]
async fn declaration_order_does_not_change_payload() {
    let fake = FakeGateway::new();
    let nameservers = manager(&fake);

    nameservers
        .create(&NameServerSet::new(DOMAIN, ["ns2.host.net", "ns1.host.net"]))
        .await
        .unwrap();
    nameservers
        .update(
            DOMAIN,
            &NameServerSet::new(DOMAIN, ["ns1.host.net", "ns2.host.net"]),
        )
        .await
        .unwrap();

    let writes = fake.nameserver_writes();
    assert_eq!(writes.len(), 2);
    assert_eq!(writes[0], writes[1]);
}

#[tokio::test]
async fn read_collapses_remote_order() {
    let fake = FakeGateway::new();
    fake.seed_nameservers(DOMAIN, &["ns2.host.net", "ns1.host.net"]);

    let read = manager(&fake).read(DOMAIN).await.unwrap();
    assert_eq!(read, NameServerSet::new(DOMAIN, ["ns1.host.net", "ns2.host.net"]));
}

#[tokio::test]
async fn delete_restores_registrar_defaults() {
    let fake = FakeGateway::new();
    let nameservers = manager(&fake);

    nameservers
        .create(&NameServerSet::new(DOMAIN, ["ns1.host.net"]))
        .await
        .unwrap();
    nameservers.delete(DOMAIN).await.unwrap();

    let (domain, last) = fake.nameserver_writes().pop().unwrap();
    assert_eq!(domain, DOMAIN);
    assert_eq!(last, vec![
        "curitiba.ns.porkbun.com".to_string(),
        "fortaleza.ns.porkbun.com".to_string(),
        "maceio.ns.porkbun.com".to_string(),
        "salvador.ns.porkbun.com".to_string(),
    ]);
    assert_eq!(last.len(), DEFAULT_NAMESERVERS.len());

    let read = nameservers.read(DOMAIN).await.unwrap();
    assert!(read.is_registrar_default());
}

#[tokio::test]
async fn empty_set_rejected_before_any_call() {
    let fake = FakeGateway::new();

    let empty = NameServerSet::new(DOMAIN, Vec::<String>::new());
    let err = manager(&fake).create(&empty).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(fake.calls().is_empty());
}

#[tokio::test]
async fn update_rejects_domain_change() {
    let fake = FakeGateway::new();

    let err = manager(&fake)
        .update(
            DOMAIN,
            &NameServerSet::new(OTHER_DOMAIN, ["ns1.host.net"]),
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(fake.calls().is_empty());
}

#[tokio::test]
async fn remote_failure_propagates() {
    let fake = FakeGateway::new();
    fake.fail_on("update_name_servers", Failure::Api("Domain is not opted in to API access."));

    let err = manager(&fake)
        .create(&NameServerSet::new(DOMAIN, ["ns1.host.net"]))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Remote);
    assert!(err.to_string().contains("Domain is not opted in to API access."));
}

#[tokio::test]
async fn import_reads_current_set() {
    let fake = FakeGateway::new();
    fake.seed_nameservers(DOMAIN, &["ns1.host.net", "ns2.host.net"]);

    let imported = manager(&fake).import(DOMAIN).await.unwrap();
    assert_eq!(imported.domain, DOMAIN);
    assert_eq!(imported.wire_order(), vec!["ns1.host.net", "ns2.host.net"]);
}

#[tokio::test]
async fn import_rejects_path_like_domain() {
    let fake = FakeGateway::new();

    let err = manager(&fake).import("example.com/1").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(fake.calls().is_empty());
}
