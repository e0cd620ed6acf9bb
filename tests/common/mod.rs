#![allow(dead_code)]

use agrisync::{ActorId, EngineConfig, RemoteError, RemoteStore, Table, TenantId};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tempfile::TempDir;

pub const TEST_ACTOR: &str = "field-officer-7";
pub const TEST_TENANT: &str = "coop-nakuru";

pub fn test_actor() -> ActorId {
    ActorId::new(TEST_ACTOR.into()).expect("actor id")
}

pub fn test_tenant() -> TenantId {
    TenantId::new(TEST_TENANT.into()).expect("tenant id")
}

/// File-backed engine config over a fresh temp directory. The directory
/// guard must outlive the engine.
pub fn file_config() -> (EngineConfig, TempDir) {
    let dir = TempDir::new().expect("temp dir");
    let config = config_for(&dir);
    (config, dir)
}

pub fn config_for(dir: &TempDir) -> EngineConfig {
    let db_path = dir.path().join("agrisync.db");
    let mut config = EngineConfig::default();
    config.database.url = format!("sqlite://{}?mode=rwc", db_path.display());
    config.database.max_connections = 1;
    config
}

/// In-process stand-in for the remote store. Counts calls per operation and
/// can be armed to fail the next N calls transiently.
#[derive(Default)]
pub struct MockRemoteStore {
    pub inserts: AtomicUsize,
    pub updates: AtomicUsize,
    pub deletes: AtomicUsize,
    transient_failures: AtomicUsize,
    fail_on_calls: Mutex<HashSet<usize>>,
    calls: Mutex<Vec<(String, Table, String)>>,
}

impl MockRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next `n` remote calls fail with a transient error.
    pub fn fail_transiently(&self, n: usize) {
        self.transient_failures.store(n, Ordering::SeqCst);
    }

    /// The nth remote call overall (1-based) fails with a transient error.
    pub fn fail_on_call(&self, n: usize) {
        self.fail_on_calls.lock().expect("fail set").insert(n);
    }

    pub fn call_log(&self) -> Vec<(String, Table, String)> {
        self.calls.lock().expect("call log").clone()
    }

    fn admit(&self, op: &str, table: Table, id: &str) -> Result<(), RemoteError> {
        let call_number = {
            let mut calls = self.calls.lock().expect("call log");
            calls.push((op.to_string(), table, id.to_string()));
            calls.len()
        };

        if self.fail_on_calls.lock().expect("fail set").remove(&call_number) {
            return Err(RemoteError::Transient("connection reset".into()));
        }

        let remaining = self.transient_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.transient_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(RemoteError::Transient("connection reset".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for MockRemoteStore {
    async fn insert(&self, table: Table, record: &Value) -> Result<Value, RemoteError> {
        let id = record["id"].as_str().unwrap_or_default().to_string();
        self.admit("insert", table, &id)?;
        self.inserts.fetch_add(1, Ordering::SeqCst);
        let mut canonical = record.clone();
        if let Some(map) = canonical.as_object_mut() {
            map.insert("serverConfirmed".into(), json!(true));
        }
        Ok(canonical)
    }

    async fn update(&self, table: Table, id: &str, partial: &Value) -> Result<Value, RemoteError> {
        self.admit("update", table, id)?;
        self.updates.fetch_add(1, Ordering::SeqCst);
        let mut canonical = partial.clone();
        if let Some(map) = canonical.as_object_mut() {
            map.insert("id".into(), json!(id));
            map.insert("serverConfirmed".into(), json!(true));
        }
        Ok(canonical)
    }

    async fn delete(&self, table: Table, id: &str) -> Result<(), RemoteError> {
        self.admit("delete", table, id)?;
        self.deletes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn select_all(&self, _table: Table) -> Result<Vec<Value>, RemoteError> {
        Ok(Vec::new())
    }
}
