//! Legacy import: the pre-multi-IP `servers.json` export carried a
//! single `ip` string per server. Each row becomes a record whose
//! `ip_data` holds one generated entry (or none when `ip` was blank).

use std::path::Path;

use anyhow::Context;
use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, info};

use rackwatch_store::{Category, InventoryStore, IpEntry, ServerRecord, ServerStatus};

/// One row of the legacy export.
#[derive(Debug, Deserialize)]
pub struct LegacyServer {
    pub id: String,
    pub provider: String,
    pub category: Category,
    pub status: ServerStatus,
    #[serde(default)]
    pub ip: String,
}

/// Map a legacy row into the current record shape.
///
/// `index` keeps generated IP-entry ids unique within one import batch.
pub fn convert(legacy: LegacyServer, index: usize, now: chrono::DateTime<Utc>) -> ServerRecord {
    let ip_data = if legacy.ip.is_empty() {
        Vec::new()
    } else {
        vec![IpEntry {
            id: format!("ip_{}_{index}", now.timestamp_millis()),
            address: legacy.ip,
            use_global: true,
            custom_domains: String::new(),
        }]
    };
    ServerRecord {
        id: legacy.id,
        provider: legacy.provider,
        category: legacy.category,
        status: legacy.status,
        ip_data,
        global_domains: String::new(),
        created_at: now,
        updated_at: now,
    }
}

/// Read the legacy file and insert all rows. Returns the imported count.
pub async fn import_legacy(
    store: &dyn InventoryStore,
    path: &Path,
) -> anyhow::Result<usize> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("could not read {}", path.display()))?;
    let legacy: Vec<LegacyServer> =
        serde_json::from_str(&raw).context("legacy export is not valid JSON")?;

    info!(count = legacy.len(), "found servers to migrate");

    let now = Utc::now();
    let records: Vec<ServerRecord> = legacy
        .into_iter()
        .enumerate()
        .map(|(index, row)| {
            debug!(id = %row.id, "migrating server");
            convert(row, index, now)
        })
        .collect();

    store.insert(&records).await?;
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use rackwatch_store::MemoryStore;

    fn legacy(id: &str, ip: &str) -> LegacyServer {
        LegacyServer {
            id: id.to_string(),
            provider: "OVH".to_string(),
            category: Category::Production,
            status: ServerStatus::Active,
            ip: ip.to_string(),
        }
    }

    #[test]
    fn convert_builds_single_ip_entry() {
        let now = Utc::now();
        let record = convert(legacy("srv-1", "192.0.2.5"), 0, now);

        assert_eq!(record.ip_data.len(), 1);
        let entry = &record.ip_data[0];
        assert_eq!(entry.address, "192.0.2.5");
        assert!(entry.use_global);
        assert!(entry.custom_domains.is_empty());
        assert!(entry.id.starts_with("ip_"));
        assert_eq!(record.global_domains, "");
        assert_eq!(record.created_at, now);
    }

    #[test]
    fn convert_blank_ip_yields_no_entries() {
        let record = convert(legacy("srv-1", ""), 0, Utc::now());
        assert!(record.ip_data.is_empty());
    }

    #[test]
    fn convert_generates_distinct_entry_ids() {
        let now = Utc::now();
        let a = convert(legacy("srv-1", "192.0.2.1"), 0, now);
        let b = convert(legacy("srv-2", "192.0.2.2"), 1, now);
        assert_ne!(a.ip_data[0].id, b.ip_data[0].id);
    }

    #[tokio::test]
    async fn import_inserts_all_rows() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"id":"srv-1","provider":"OVH","category":"Production","status":"Active","ip":"192.0.2.1"}},
                {{"id":"srv-2","provider":"Hetzner","category":"Issues","status":"Down","ip":""}},
                {{"id":"srv-3","provider":"Contabo","category":"To Return","status":"Timed Out"}}
            ]"#
        )
        .unwrap();

        let store = MemoryStore::new();
        let imported = import_legacy(&store, file.path()).await.unwrap();

        assert_eq!(imported, 3);
        assert_eq!(store.get("srv-1").unwrap().ip_data.len(), 1);
        assert!(store.get("srv-2").unwrap().ip_data.is_empty());

        let srv3 = store.get("srv-3").unwrap();
        assert!(srv3.ip_data.is_empty());
        assert_eq!(srv3.status, ServerStatus::TimedOut);
        assert_eq!(srv3.category, Category::ToReturn);
    }

    #[tokio::test]
    async fn import_missing_file_errors() {
        let store = MemoryStore::new();
        let err = import_legacy(&store, Path::new("/nonexistent/servers.json"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("could not read"));
    }
}
