//! Debounced autosave.
//!
//! The UI fires a write per keystroke; the debouncer coalesces rapid
//! edits to the same record into a single store write once the edits go
//! quiet for 500 ms. Each new edit cancels the pending flush for that
//! record and reschedules it; edits to different records are independent.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use rackwatch_store::{InventoryStore, UpdateFields};

struct PendingEdit {
    /// Merged fields from every edit since the last flush.
    fields: UpdateFields,
    /// The scheduled flush; aborted and replaced on each new edit.
    flush: JoinHandle<()>,
    /// Bumped per reschedule so a stale flush can't consume newer edits.
    generation: u64,
}

/// Per-record cancel-and-reschedule write coalescer.
pub struct Debouncer {
    store: Arc<dyn InventoryStore>,
    quiet_period: Duration,
    pending: Mutex<HashMap<String, PendingEdit>>,
}

impl Debouncer {
    pub fn new(store: Arc<dyn InventoryStore>, quiet_period: Duration) -> Arc<Self> {
        Arc::new(Self {
            store,
            quiet_period,
            pending: Mutex::new(HashMap::new()),
        })
    }

    /// Record an edit and (re)schedule its flush.
    pub async fn submit(self: &Arc<Self>, id: &str, fields: UpdateFields) {
        if fields.is_empty() {
            return;
        }
        let mut pending = self.pending.lock().await;

        let generation = match pending.remove(id) {
            Some(edit) => {
                edit.flush.abort();
                let mut merged = edit.fields;
                merged.merge(fields);
                let generation = edit.generation + 1;
                pending.insert(
                    id.to_string(),
                    PendingEdit {
                        fields: merged,
                        flush: self.schedule_flush(id.to_string(), generation),
                        generation,
                    },
                );
                generation
            }
            None => {
                pending.insert(
                    id.to_string(),
                    PendingEdit {
                        fields,
                        flush: self.schedule_flush(id.to_string(), 0),
                        generation: 0,
                    },
                );
                0
            }
        };
        debug!(%id, generation, "autosave scheduled");
    }

    fn schedule_flush(self: &Arc<Self>, id: String, generation: u64) -> JoinHandle<()> {
        let debouncer = self.clone();
        let quiet = self.quiet_period;
        tokio::spawn(async move {
            tokio::time::sleep(quiet).await;
            debouncer.flush(&id, generation).await;
        })
    }

    /// Write out the pending edit for `id` if it is still the scheduled one.
    async fn flush(&self, id: &str, generation: u64) {
        let fields = {
            let mut pending = self.pending.lock().await;
            match pending.get(id) {
                Some(edit) if edit.generation == generation => {
                    pending.remove(id).map(|edit| edit.fields)
                }
                _ => None,
            }
        };
        let Some(fields) = fields else { return };

        if let Err(e) = self.store.update(id, fields).await {
            error!(%id, error = %e, "autosave write failed");
        } else {
            debug!(%id, "autosave flushed");
        }
    }

    /// Flush every pending edit immediately (shutdown path).
    pub async fn flush_all(&self) {
        let drained: Vec<(String, UpdateFields)> = {
            let mut pending = self.pending.lock().await;
            pending
                .drain()
                .map(|(id, edit)| {
                    edit.flush.abort();
                    (id, edit.fields)
                })
                .collect()
        };
        for (id, fields) in drained {
            if let Err(e) = self.store.update(&id, fields).await {
                error!(%id, error = %e, "autosave flush failed");
            }
        }
    }

    /// Number of records with edits waiting to flush.
    pub async fn pending_count(&self) -> usize {
        self.pending.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rackwatch_store::{Category, MemoryStore, ServerRecord, ServerStatus};

    const QUIET: Duration = Duration::from_millis(500);

    fn record(id: &str) -> ServerRecord {
        let t = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        ServerRecord {
            id: id.to_string(),
            provider: "OVH".to_string(),
            category: Category::New,
            status: ServerStatus::Active,
            ip_data: vec![],
            global_domains: String::new(),
            created_at: t,
            updated_at: t,
        }
    }

    fn provider(name: &str) -> UpdateFields {
        UpdateFields {
            provider: Some(name.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn flushes_after_quiet_period() {
        let store = MemoryStore::with_records(vec![record("a")]);
        let debouncer = Debouncer::new(Arc::new(store.clone()), QUIET);

        debouncer.submit("a", provider("Hetzner")).await;
        assert_eq!(debouncer.pending_count().await, 1);
        assert!(store.write_log().is_empty());

        tokio::time::sleep(QUIET + Duration::from_millis(50)).await;

        assert_eq!(store.write_log(), vec!["a".to_string()]);
        assert_eq!(store.get("a").unwrap().provider, "Hetzner");
        assert_eq!(debouncer.pending_count().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_edits_coalesce_into_one_write() {
        let store = MemoryStore::with_records(vec![record("a")]);
        let debouncer = Debouncer::new(Arc::new(store.clone()), QUIET);

        debouncer.submit("a", provider("Hetzner")).await;
        tokio::time::sleep(Duration::from_millis(200)).await;
        debouncer
            .submit(
                "a",
                UpdateFields {
                    status: Some(ServerStatus::Down),
                    ..Default::default()
                },
            )
            .await;
        tokio::time::sleep(Duration::from_millis(400)).await;

        // 600 ms since the first edit, 400 ms since the second: the first
        // timer was cancelled, nothing flushed yet.
        assert!(store.write_log().is_empty());

        tokio::time::sleep(Duration::from_millis(200)).await;

        // One write carrying both fields.
        assert_eq!(store.write_log(), vec!["a".to_string()]);
        let rec = store.get("a").unwrap();
        assert_eq!(rec.provider, "Hetzner");
        assert_eq!(rec.status, ServerStatus::Down);
    }

    #[tokio::test(start_paused = true)]
    async fn records_debounce_independently() {
        let store = MemoryStore::with_records(vec![record("a"), record("b")]);
        let debouncer = Debouncer::new(Arc::new(store.clone()), QUIET);

        debouncer.submit("a", provider("Hetzner")).await;
        debouncer.submit("b", provider("Contabo")).await;
        tokio::time::sleep(QUIET + Duration::from_millis(50)).await;

        assert_eq!(store.write_log().len(), 2);
        assert_eq!(store.get("a").unwrap().provider, "Hetzner");
        assert_eq!(store.get("b").unwrap().provider, "Contabo");
    }

    #[tokio::test(start_paused = true)]
    async fn edit_after_flush_schedules_fresh_write() {
        let store = MemoryStore::with_records(vec![record("a")]);
        let debouncer = Debouncer::new(Arc::new(store.clone()), QUIET);

        debouncer.submit("a", provider("Hetzner")).await;
        tokio::time::sleep(QUIET + Duration::from_millis(50)).await;
        debouncer.submit("a", provider("Contabo")).await;
        tokio::time::sleep(QUIET + Duration::from_millis(50)).await;

        assert_eq!(store.write_log(), vec!["a".to_string(), "a".to_string()]);
        assert_eq!(store.get("a").unwrap().provider, "Contabo");
    }

    #[tokio::test(start_paused = true)]
    async fn flush_all_writes_without_waiting() {
        let store = MemoryStore::with_records(vec![record("a"), record("b")]);
        let debouncer = Debouncer::new(Arc::new(store.clone()), QUIET);

        debouncer.submit("a", provider("Hetzner")).await;
        debouncer.submit("b", provider("Contabo")).await;
        debouncer.flush_all().await;

        assert_eq!(store.write_log().len(), 2);
        assert_eq!(debouncer.pending_count().await, 0);

        // The aborted timers must not double-write.
        tokio::time::sleep(QUIET * 2).await;
        assert_eq!(store.write_log().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_fields_are_ignored() {
        let store = MemoryStore::with_records(vec![record("a")]);
        let debouncer = Debouncer::new(Arc::new(store.clone()), QUIET);

        debouncer.submit("a", UpdateFields::default()).await;
        assert_eq!(debouncer.pending_count().await, 0);
    }
}
