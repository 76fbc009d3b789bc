//! The `InventoryStore` trait — the seam between Rackwatch and the
//! hosted table.
//!
//! Everything that reads or mutates inventory (sweep engine, API
//! handlers, migration) takes an `Arc<dyn InventoryStore>` so tests can
//! substitute [`crate::MemoryStore`] for the REST backend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreResult;
use crate::types::{Category, IpEntry, ServerId, ServerRecord, ServerStatus, SweepSnapshot};

/// Partial update of a server row. Absent fields are left untouched.
///
/// Serializes to exactly the PATCH body the hosted table expects.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UpdateFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ServerStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_data: Option<Vec<IpEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global_domains: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl UpdateFields {
    /// The write-back shape used by the sweep: status + timestamp only.
    pub fn status_change(status: ServerStatus, at: DateTime<Utc>) -> Self {
        Self {
            status: Some(status),
            updated_at: Some(at),
            ..Self::default()
        }
    }

    /// True when no field is set (nothing to write).
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge `newer` over `self`, keeping `self`'s values where `newer`
    /// is absent. Used by the autosave coalescer.
    pub fn merge(&mut self, newer: UpdateFields) {
        if newer.provider.is_some() {
            self.provider = newer.provider;
        }
        if newer.category.is_some() {
            self.category = newer.category;
        }
        if newer.status.is_some() {
            self.status = newer.status;
        }
        if newer.ip_data.is_some() {
            self.ip_data = newer.ip_data;
        }
        if newer.global_domains.is_some() {
            self.global_domains = newer.global_domains;
        }
        if newer.updated_at.is_some() {
            self.updated_at = newer.updated_at;
        }
    }
}

/// Read/write access to the `servers` table.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// All rows, full projection.
    async fn list(&self) -> StoreResult<Vec<ServerRecord>>;

    /// The sweep projection: `id, status, ip_data` only.
    async fn select_for_sweep(&self) -> StoreResult<Vec<SweepSnapshot>>;

    /// Insert new rows.
    async fn insert(&self, records: &[ServerRecord]) -> StoreResult<()>;

    /// Partial update of a single row, matched by id.
    async fn update(&self, id: &str, fields: UpdateFields) -> StoreResult<()>;

    /// Partial update applied to several rows at once (bulk mutation).
    async fn update_many(&self, ids: &[ServerId], fields: UpdateFields) -> StoreResult<()>;

    /// Delete rows by id.
    async fn delete(&self, ids: &[ServerId]) -> StoreResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_change_serializes_only_two_fields() {
        let at = Utc::now();
        let fields = UpdateFields::status_change(ServerStatus::Down, at);
        let json = serde_json::to_value(&fields).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 2);
        assert_eq!(obj["status"], "Down");
        assert!(obj.contains_key("updated_at"));
    }

    #[test]
    fn default_is_empty() {
        assert!(UpdateFields::default().is_empty());
        assert!(!UpdateFields::status_change(ServerStatus::Active, Utc::now()).is_empty());
    }

    #[test]
    fn merge_keeps_earlier_values_for_absent_fields() {
        let mut base = UpdateFields {
            provider: Some("OVH".to_string()),
            status: Some(ServerStatus::Down),
            ..Default::default()
        };
        base.merge(UpdateFields {
            status: Some(ServerStatus::Active),
            ..Default::default()
        });
        assert_eq!(base.provider.as_deref(), Some("OVH"));
        assert_eq!(base.status, Some(ServerStatus::Active));
    }
}
