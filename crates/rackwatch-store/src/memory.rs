//! In-memory inventory store for tests and local runs.
//!
//! Mirrors the REST backend's observable behavior and adds the hooks the
//! sweep tests need: injected read/write failures and a log of write
//! order.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::{StoreError, StoreResult};
use crate::store::{InventoryStore, UpdateFields};
use crate::types::{ServerId, ServerRecord, SweepSnapshot};

#[derive(Default)]
struct Inner {
    records: Vec<ServerRecord>,
    /// Ids in the order mutations were applied.
    write_log: Vec<ServerId>,
    /// Total mutations attempted so far (including the failing one).
    write_attempts: usize,
    fail_reads: bool,
    /// 1-based index of the write attempt that should fail.
    fail_write_at: Option<usize>,
}

/// Shared, clonable in-memory store.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<ServerRecord>) -> Self {
        let store = Self::new();
        store.inner.lock().unwrap().records = records;
        store
    }

    /// Make every subsequent read fail.
    pub fn fail_reads(&self) {
        self.inner.lock().unwrap().fail_reads = true;
    }

    /// Make the `n`-th write attempt (1-based) fail.
    pub fn fail_write_at(&self, n: usize) {
        self.inner.lock().unwrap().fail_write_at = Some(n);
    }

    /// Ids of applied writes, in order.
    pub fn write_log(&self) -> Vec<ServerId> {
        self.inner.lock().unwrap().write_log.clone()
    }

    /// Snapshot of all records.
    pub fn records(&self) -> Vec<ServerRecord> {
        self.inner.lock().unwrap().records.clone()
    }

    /// Look up one record by id.
    pub fn get(&self, id: &str) -> Option<ServerRecord> {
        self.inner
            .lock()
            .unwrap()
            .records
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }
}

fn apply(record: &mut ServerRecord, fields: &UpdateFields) {
    if let Some(provider) = &fields.provider {
        record.provider = provider.clone();
    }
    if let Some(category) = fields.category {
        record.category = category;
    }
    if let Some(status) = fields.status {
        record.status = status;
    }
    if let Some(ip_data) = &fields.ip_data {
        record.ip_data = ip_data.clone();
    }
    if let Some(global_domains) = &fields.global_domains {
        record.global_domains = global_domains.clone();
    }
    if let Some(updated_at) = fields.updated_at {
        record.updated_at = updated_at;
    }
}

impl Inner {
    fn check_write(&mut self) -> StoreResult<()> {
        self.write_attempts += 1;
        if self.fail_write_at == Some(self.write_attempts) {
            return Err(StoreError::Write("injected write failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl InventoryStore for MemoryStore {
    async fn list(&self) -> StoreResult<Vec<ServerRecord>> {
        let inner = self.inner.lock().unwrap();
        if inner.fail_reads {
            return Err(StoreError::Read("injected read failure".to_string()));
        }
        Ok(inner.records.clone())
    }

    async fn select_for_sweep(&self) -> StoreResult<Vec<SweepSnapshot>> {
        let inner = self.inner.lock().unwrap();
        if inner.fail_reads {
            return Err(StoreError::Read("injected read failure".to_string()));
        }
        Ok(inner
            .records
            .iter()
            .map(|r| SweepSnapshot {
                id: r.id.clone(),
                status: r.status,
                ip_data: r.ip_data.clone(),
            })
            .collect())
    }

    async fn insert(&self, records: &[ServerRecord]) -> StoreResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.check_write()?;
        for record in records {
            if inner.records.iter().any(|r| r.id == record.id) {
                return Err(StoreError::Write(format!(
                    "duplicate id: {}",
                    record.id
                )));
            }
            inner.write_log.push(record.id.clone());
            inner.records.push(record.clone());
        }
        Ok(())
    }

    async fn update(&self, id: &str, fields: UpdateFields) -> StoreResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.check_write()?;
        match inner.records.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                apply(record, &fields);
                inner.write_log.push(id.to_string());
                Ok(())
            }
            None => Err(StoreError::Write(format!("no such record: {id}"))),
        }
    }

    async fn update_many(&self, ids: &[ServerId], fields: UpdateFields) -> StoreResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.check_write()?;
        for id in ids {
            if let Some(record) = inner.records.iter_mut().find(|r| &r.id == id) {
                apply(record, &fields);
                inner.write_log.push(id.clone());
            }
        }
        Ok(())
    }

    async fn delete(&self, ids: &[ServerId]) -> StoreResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.check_write()?;
        inner.records.retain(|r| !ids.contains(&r.id));
        for id in ids {
            inner.write_log.push(id.clone());
        }
        Ok(())
    }
}
