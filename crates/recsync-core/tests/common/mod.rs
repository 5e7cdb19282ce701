//! Test doubles and common utilities for engine contract tests
//!
//! This module provides minimal test doubles that record every call the
//! engine makes, so tests can assert on exactly which remote calls happened.

#![allow(dead_code)]

use recsync_core::error::{Error, Result};
use recsync_core::traits::{DnsProviderClient, ObservedRecord, StackOutputLookup, ZoneId};
use recsync_core::{DesiredRecord, StaticOutputLookup, SyncConfig};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const DOMAIN: &str = "example.com";
pub const ZONE: &str = "zone-123";
pub const STACK: &str = "svc-prod";

/// One call received by [`MockDnsProvider`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    GetZone(String),
    GetRecord { record_type: String, name: String },
    Create(DesiredRecord),
    Update { id: String, record: DesiredRecord },
    Delete { id: String },
    List,
}

impl ProviderCall {
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            ProviderCall::Create(_) | ProviderCall::Update { .. } | ProviderCall::Delete { .. }
        )
    }
}

/// A mock DnsProviderClient backed by an in-memory zone
pub struct MockDnsProvider {
    /// Records keyed by (type, name)
    records: Arc<Mutex<HashMap<(String, String), ObservedRecord>>>,
    /// Every call, in order
    calls: Arc<Mutex<Vec<ProviderCall>>>,
    /// Record names whose calls fail with a transport error
    failing_names: Arc<Mutex<HashSet<String>>>,
    /// Record names whose create/update/delete calls fail
    failing_mutations: Arc<Mutex<HashSet<String>>>,
    /// Whether zone lookup fails
    zone_fails: Arc<Mutex<bool>>,
    /// Artificial latency per call
    delay: Arc<Mutex<Option<Duration>>>,
    /// Artificial latency for calls touching one record name
    slow_names: Arc<Mutex<HashMap<String, Duration>>>,
    /// Sequence for generated record ids
    next_id: Arc<AtomicUsize>,
}

impl MockDnsProvider {
    pub fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            failing_names: Arc::new(Mutex::new(HashSet::new())),
            failing_mutations: Arc::new(Mutex::new(HashSet::new())),
            zone_fails: Arc::new(Mutex::new(false)),
            delay: Arc::new(Mutex::new(None)),
            slow_names: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(AtomicUsize::new(1)),
        }
    }

    /// Create a new MockDnsProvider that shares state with an existing one
    pub fn sharing_state_with(other: &Self) -> Self {
        Self {
            records: Arc::clone(&other.records),
            calls: Arc::clone(&other.calls),
            failing_names: Arc::clone(&other.failing_names),
            failing_mutations: Arc::clone(&other.failing_mutations),
            zone_fails: Arc::clone(&other.zone_fails),
            delay: Arc::clone(&other.delay),
            slow_names: Arc::clone(&other.slow_names),
            next_id: Arc::clone(&other.next_id),
        }
    }

    /// Seed an existing record; returns its id
    pub fn seed(&self, record_type: &str, name: &str, content: &str) -> String {
        let id = format!("rec-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let record = ObservedRecord {
            id: id.clone(),
            record_type: record_type.to_string(),
            name: name.to_string(),
            content: content.to_string(),
            ttl: Some(300),
            proxied: Some(false),
            priority: None,
        };
        self.records
            .lock()
            .unwrap()
            .insert((record_type.to_string(), name.to_string()), record);
        id
    }

    /// Make every call touching `name` fail
    pub fn fail_for(&self, name: &str) {
        self.failing_names.lock().unwrap().insert(name.to_string());
    }

    /// Make only create/update/delete calls touching `name` fail
    pub fn fail_mutations_for(&self, name: &str) {
        self.failing_mutations
            .lock()
            .unwrap()
            .insert(name.to_string());
    }

    /// Make zone lookup fail
    pub fn fail_zone_lookup(&self) {
        *self.zone_fails.lock().unwrap() = true;
    }

    /// Delay every call
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    /// Delay calls touching `name`
    pub fn slow_for(&self, name: &str, delay: Duration) {
        self.slow_names
            .lock()
            .unwrap()
            .insert(name.to_string(), delay);
    }

    /// All calls so far
    pub fn calls(&self) -> Vec<ProviderCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Create/update/delete calls so far
    pub fn mutations(&self) -> Vec<ProviderCall> {
        self.calls().into_iter().filter(|c| c.is_mutation()).collect()
    }

    /// Number of zone lookups so far
    pub fn zone_lookup_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, ProviderCall::GetZone(_)))
            .count()
    }

    /// Current content of a record, if it exists
    pub fn content_of(&self, record_type: &str, name: &str) -> Option<String> {
        self.records
            .lock()
            .unwrap()
            .get(&(record_type.to_string(), name.to_string()))
            .map(|r| r.content.clone())
    }

    async fn enter(&self, call: ProviderCall, name: Option<&str>) -> Result<()> {
        let mutation = call.is_mutation();
        self.calls.lock().unwrap().push(call);

        let slow = name.and_then(|n| self.slow_names.lock().unwrap().get(n).copied());
        let delay = slow.or(*self.delay.lock().unwrap());
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(name) = name
            && self.failing_names.lock().unwrap().contains(name)
        {
            return Err(Error::transport(Some(500), format!("injected failure for {}", name)));
        }
        if let Some(name) = name
            && mutation
            && self.failing_mutations.lock().unwrap().contains(name)
        {
            return Err(Error::transport(
                Some(400),
                format!("injected write failure for {}", name),
            ));
        }
        Ok(())
    }

    fn name_of(&self, record_id: &str) -> Option<String> {
        self.records
            .lock()
            .unwrap()
            .values()
            .find(|r| r.id == record_id)
            .map(|r| r.name.clone())
    }
}

#[async_trait::async_trait]
impl DnsProviderClient for MockDnsProvider {
    async fn get_zone_id(&self, domain: &str) -> Result<ZoneId> {
        self.enter(ProviderCall::GetZone(domain.to_string()), None)
            .await?;
        if *self.zone_fails.lock().unwrap() {
            return Err(Error::transport(Some(403), "Authentication error"));
        }
        Ok(ZoneId::new(ZONE))
    }

    async fn get_record(
        &self,
        zone_id: &ZoneId,
        record_type: &str,
        name: &str,
    ) -> Result<Option<ObservedRecord>> {
        assert_eq!(zone_id.as_str(), ZONE);
        self.enter(
            ProviderCall::GetRecord {
                record_type: record_type.to_string(),
                name: name.to_string(),
            },
            Some(name),
        )
        .await?;
        Ok(self
            .records
            .lock()
            .unwrap()
            .get(&(record_type.to_string(), name.to_string()))
            .cloned())
    }

    async fn create_record(&self, zone_id: &ZoneId, record: &DesiredRecord) -> Result<()> {
        assert_eq!(zone_id.as_str(), ZONE);
        self.enter(ProviderCall::Create(record.clone()), Some(&record.name))
            .await?;
        self.seed(&record.record_type, &record.name, &record.content);
        Ok(())
    }

    async fn update_record(
        &self,
        zone_id: &ZoneId,
        record_id: &str,
        record: &DesiredRecord,
    ) -> Result<()> {
        assert_eq!(zone_id.as_str(), ZONE);
        self.enter(
            ProviderCall::Update {
                id: record_id.to_string(),
                record: record.clone(),
            },
            Some(&record.name),
        )
        .await?;
        let mut records = self.records.lock().unwrap();
        let existing = records
            .values_mut()
            .find(|r| r.id == record_id)
            .ok_or_else(|| Error::transport(Some(404), "Record does not exist"))?;
        existing.content = record.content.clone();
        existing.ttl = Some(record.ttl);
        Ok(())
    }

    async fn delete_record(&self, zone_id: &ZoneId, record_id: &str) -> Result<()> {
        assert_eq!(zone_id.as_str(), ZONE);
        let name = self.name_of(record_id);
        self.enter(
            ProviderCall::Delete {
                id: record_id.to_string(),
            },
            name.as_deref(),
        )
        .await?;
        self.records.lock().unwrap().retain(|_, r| r.id != record_id);
        Ok(())
    }

    async fn list_records(&self, zone_id: &ZoneId) -> Result<Vec<ObservedRecord>> {
        assert_eq!(zone_id.as_str(), ZONE);
        self.enter(ProviderCall::List, None).await?;
        let mut records: Vec<ObservedRecord> =
            self.records.lock().unwrap().values().cloned().collect();
        records.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(records)
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// A StackOutputLookup that counts calls
pub struct CountingOutputLookup {
    inner: StaticOutputLookup,
    calls: Arc<AtomicUsize>,
}

impl CountingOutputLookup {
    pub fn new(inner: StaticOutputLookup) -> Self {
        Self {
            inner,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Handle on the call counter that survives boxing the lookup
    pub fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait::async_trait]
impl StackOutputLookup for CountingOutputLookup {
    async fn get_output(&self, stack_name: &str, output_key: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.get_output(stack_name, output_key).await
    }
}

/// Helper to create a minimal SyncConfig for testing
pub fn minimal_config(records: Vec<DesiredRecord>) -> SyncConfig {
    let mut config = SyncConfig::new(DOMAIN, "test-token").with_stack_name(STACK);
    config.records = records;
    config
}

/// An A record with TTL 300
pub fn a_record(name: &str, content: &str) -> DesiredRecord {
    DesiredRecord::new("A", name, content).with_ttl(300)
}
