//! Contract Test: Reconcile Cycle
//!
//! Constraints verified:
//! - Matching addresses never reach the provider (idempotence)
//! - Differing addresses produce exactly one update with the discovered address
//! - Zero or several candidates are errors, never silently resolved
//!
//! If this test fails, the reconciler is either mutating DNS when it should
//! not, or guessing between ambiguous results.

mod common;

use common::*;
use syncip_core::traits::A_RECORD;
use syncip_core::{Address, CycleOutcome, Error, Outcome};

#[tokio::test]
async fn matching_addresses_make_no_provider_calls() {
    // Scenario A
    let log = CallLog::default();
    let provider = MockDnsProvider::with_records(1, "203.0.113.5", &log).into_arc();
    let reconciler = reconciler(
        StaticDiscovery::ok("203.0.113.5", &log),
        StaticResolver::returning(&["203.0.113.5"], &log),
        provider.clone(),
    );

    let outcome = reconciler.reconcile().await.expect("cycle succeeds");

    assert_eq!(
        outcome,
        CycleOutcome::NoChange {
            address: Address::from("203.0.113.5")
        }
    );
    assert_eq!(log.calls(), vec!["discover", "resolve"]);
    assert_eq!(provider.update_call_count(), 0);
}

#[tokio::test]
async fn idempotence_holds_for_many_equal_pairs() {
    for ip in ["203.0.113.5", "198.51.100.1", "10.0.0.1", "2001:db8::1"] {
        let log = CallLog::default();
        let provider = MockDnsProvider::with_records(1, ip, &log).into_arc();
        let reconciler = reconciler(
            StaticDiscovery::ok(ip, &log),
            StaticResolver::returning(&[ip], &log),
            provider.clone(),
        );

        let result = reconciler.reconcile().await;
        assert_eq!(Outcome::of(&result), Outcome::NoChange, "pair {ip}");
        assert_eq!(log.count("locate"), 0, "pair {ip}");
        assert_eq!(provider.update_call_count(), 0, "pair {ip}");
    }
}

#[tokio::test]
async fn equivalent_spellings_are_not_a_change() {
    let log = CallLog::default();
    let provider = MockDnsProvider::with_records(1, "2001:db8::1", &log).into_arc();
    let reconciler = reconciler(
        StaticDiscovery::ok("2001:0db8:0000:0000:0000:0000:0000:0001\n", &log),
        StaticResolver::returning(&["2001:db8::1"], &log),
        provider.clone(),
    );

    let result = reconciler.reconcile().await;
    assert_eq!(Outcome::of(&result), Outcome::NoChange);
    assert_eq!(provider.update_call_count(), 0);
}

#[tokio::test]
async fn differing_addresses_update_the_record() {
    // Scenario B
    let log = CallLog::default();
    let provider = MockDnsProvider::with_records(1, "203.0.113.5", &log).into_arc();
    let reconciler = reconciler(
        StaticDiscovery::ok("203.0.113.9", &log),
        StaticResolver::returning(&["203.0.113.5"], &log),
        provider.clone(),
    );

    let outcome = reconciler.reconcile().await.expect("cycle succeeds");

    assert_eq!(
        outcome,
        CycleOutcome::Updated {
            previous: Address::from("203.0.113.5"),
            current: Address::from("203.0.113.9"),
            record_id: "rec-1".to_string(),
        }
    );
    assert_eq!(log.calls(), vec!["discover", "resolve", "locate", "update"]);

    let updates = provider.updates();
    assert_eq!(updates.len(), 1, "exactly one update call");
    let (record, content) = &updates[0];
    assert_eq!(record.id, "rec-1");
    assert_eq!(record.record_type, A_RECORD);
    assert_eq!(record.name, FQDN);
    assert_eq!(content.canonical(), "203.0.113.9");
}

#[tokio::test]
async fn resolver_is_queried_for_the_fqdn() {
    let log = CallLog::default();
    let resolver = StaticResolver::returning(&["203.0.113.5"], &log);
    let reconciler = reconciler(
        StaticDiscovery::ok("203.0.113.5", &log),
        resolver.clone(),
        MockDnsProvider::with_records(1, "203.0.113.5", &log).into_arc(),
    );

    reconciler.reconcile().await.unwrap();
    assert_eq!(resolver.last_query().as_deref(), Some(FQDN));
}

#[tokio::test]
async fn multiple_a_records_abort_before_update() {
    // Scenario D
    let log = CallLog::default();
    let provider = MockDnsProvider::with_records(2, "203.0.113.5", &log).into_arc();
    let reconciler = reconciler(
        StaticDiscovery::ok("203.0.113.9", &log),
        StaticResolver::returning(&["203.0.113.5"], &log),
        provider.clone(),
    );

    let err = reconciler.reconcile().await.unwrap_err();

    match err {
        Error::RecordLookup(message) => {
            assert!(message.contains("multiple A records found"), "{message}");
        }
        other => panic!("expected RecordLookup, got {other:?}"),
    }
    assert_eq!(provider.update_call_count(), 0);
}

#[tokio::test]
async fn missing_a_record_aborts_before_update() {
    let log = CallLog::default();
    let provider = MockDnsProvider::with_records(0, "203.0.113.5", &log).into_arc();
    let reconciler = reconciler(
        StaticDiscovery::ok("203.0.113.9", &log),
        StaticResolver::returning(&["203.0.113.5"], &log),
        provider.clone(),
    );

    let err = reconciler.reconcile().await.unwrap_err();

    assert!(matches!(err, Error::RecordLookup(ref m) if m.contains("no A records found")));
    assert_eq!(provider.update_call_count(), 0);
}

#[tokio::test]
async fn ambiguous_resolution_is_an_error() {
    let log = CallLog::default();
    let provider = MockDnsProvider::with_records(1, "203.0.113.5", &log).into_arc();
    let reconciler = reconciler(
        StaticDiscovery::ok("203.0.113.5", &log),
        StaticResolver::returning(&["203.0.113.5", "203.0.113.6"], &log),
        provider.clone(),
    );

    let err = reconciler.reconcile().await.unwrap_err();

    assert!(matches!(err, Error::Resolution(ref m) if m.contains("ambiguous")));
    assert_eq!(log.calls(), vec!["discover", "resolve"]);
}

#[tokio::test]
async fn cycles_are_independent() {
    // The same reconciler run twice performs the full lookup both times
    let log = CallLog::default();
    let provider = MockDnsProvider::with_records(1, "203.0.113.5", &log).into_arc();
    let reconciler = reconciler(
        StaticDiscovery::ok("203.0.113.9", &log),
        StaticResolver::returning(&["203.0.113.5"], &log),
        provider.clone(),
    );

    reconciler.reconcile().await.unwrap();
    reconciler.reconcile().await.unwrap();

    assert_eq!(log.count("locate"), 2, "record is looked up again every cycle");
    assert_eq!(provider.update_call_count(), 2);
}
