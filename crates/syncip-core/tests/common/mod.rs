//! Test doubles and common utilities for reconcile contract tests
//!
//! Every double appends its step name to a shared [`CallLog`] so tests can
//! assert both how many external calls happened and in which order.

#![allow(dead_code)]

use syncip_core::error::{Error, Result};
use syncip_core::traits::{DnsProvider, HostResolver, IpDiscovery, RecordRef};
use syncip_core::{Address, ProviderConfig, Reconciler, SyncConfig};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const FQDN: &str = "home.example.com";

/// Ordered record of external calls made during a test
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<&'static str>>>);

impl CallLog {
    pub fn push(&self, step: &'static str) {
        self.0.lock().unwrap().push(step);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, step: &str) -> usize {
        self.0.lock().unwrap().iter().filter(|s| **s == step).count()
    }
}

/// Discovery double returning a fixed answer
pub struct StaticDiscovery {
    answer: std::result::Result<String, String>,
    log: CallLog,
}

impl StaticDiscovery {
    pub fn ok(ip: &str, log: &CallLog) -> Arc<Self> {
        Arc::new(Self {
            answer: Ok(ip.to_string()),
            log: log.clone(),
        })
    }

    pub fn failing(message: &str, log: &CallLog) -> Arc<Self> {
        Arc::new(Self {
            answer: Err(message.to_string()),
            log: log.clone(),
        })
    }
}

#[async_trait::async_trait]
impl IpDiscovery for StaticDiscovery {
    async fn current_ip(&self) -> Result<Address> {
        self.log.push("discover");
        match &self.answer {
            Ok(ip) => Ok(Address::from(ip.as_str())),
            Err(message) => Err(Error::discovery(message.clone())),
        }
    }
}

/// Resolver double returning a fixed list of addresses
pub struct StaticResolver {
    answer: std::result::Result<Vec<String>, String>,
    log: CallLog,
    last_query: Mutex<Option<String>>,
}

impl StaticResolver {
    pub fn returning(ips: &[&str], log: &CallLog) -> Arc<Self> {
        Arc::new(Self {
            answer: Ok(ips.iter().map(|s| s.to_string()).collect()),
            log: log.clone(),
            last_query: Mutex::new(None),
        })
    }

    pub fn failing(message: &str, log: &CallLog) -> Arc<Self> {
        Arc::new(Self {
            answer: Err(message.to_string()),
            log: log.clone(),
            last_query: Mutex::new(None),
        })
    }

    pub fn last_query(&self) -> Option<String> {
        self.last_query.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl HostResolver for StaticResolver {
    async fn lookup_host(&self, fqdn: &str) -> Result<Vec<Address>> {
        self.log.push("resolve");
        *self.last_query.lock().unwrap() = Some(fqdn.to_string());
        match &self.answer {
            Ok(ips) => Ok(ips.iter().map(|ip| Address::from(ip.as_str())).collect()),
            Err(message) => Err(Error::resolution(message.clone())),
        }
    }
}

/// A mock DnsProvider that tracks calls
pub struct MockDnsProvider {
    records: Vec<RecordRef>,
    fail_lookup: bool,
    fail_update: bool,
    log: CallLog,
    update_call_count: AtomicUsize,
    updates: Mutex<Vec<(RecordRef, Address)>>,
}

impl MockDnsProvider {
    /// Provider holding `count` A records for [`FQDN`], all pointing at `content`
    pub fn with_records(count: usize, content: &str, log: &CallLog) -> Self {
        let records = (0..count)
            .map(|i| RecordRef::a(format!("rec-{}", i + 1), FQDN, content))
            .collect();
        Self {
            records,
            fail_lookup: false,
            fail_update: false,
            log: log.clone(),
            update_call_count: AtomicUsize::new(0),
            updates: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_lookup(mut self) -> Self {
        self.fail_lookup = true;
        self
    }

    pub fn failing_update(mut self) -> Self {
        self.fail_update = true;
        self
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Get the number of times update_record() was called
    pub fn update_call_count(&self) -> usize {
        self.update_call_count.load(Ordering::SeqCst)
    }

    /// Every (record, content) pair passed to update_record()
    pub fn updates(&self) -> Vec<(RecordRef, Address)> {
        self.updates.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn list_a_records(&self, fqdn: &str) -> Result<Vec<RecordRef>> {
        self.log.push("locate");
        if self.fail_lookup {
            return Err(Error::record_lookup("provider unavailable"));
        }
        Ok(self
            .records
            .iter()
            .filter(|r| r.name == fqdn)
            .cloned()
            .collect())
    }

    async fn update_record(&self, record: &RecordRef, address: &Address) -> Result<()> {
        self.log.push("update");
        self.update_call_count.fetch_add(1, Ordering::SeqCst);
        self.updates
            .lock()
            .unwrap()
            .push((record.clone(), address.clone()));
        if self.fail_update {
            return Err(Error::update("provider rejected the update"));
        }
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Helper to create a minimal SyncConfig managing [`FQDN`]
pub fn minimal_config() -> SyncConfig {
    SyncConfig::new(
        "example.com",
        ProviderConfig::Custom {
            factory: "mock".to_string(),
            config: serde_json::json!({}),
        },
    )
    .with_record_name("home")
    .with_interval(Duration::from_millis(20))
}

/// Build a reconciler from the given doubles
pub fn reconciler(
    discovery: Arc<dyn IpDiscovery>,
    resolver: Arc<dyn HostResolver>,
    provider: Arc<dyn DnsProvider>,
) -> Reconciler {
    Reconciler::new(discovery, resolver, provider, Arc::new(minimal_config()))
}
