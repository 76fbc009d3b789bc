//! The sweep engine: fetch, probe, diff, write back.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use rackwatch_store::{InventoryStore, ServerId, ServerStatus, UpdateFields};

use crate::error::SweepError;
use crate::probe::Prober;

/// Maximum probes in flight across one sweep.
pub const MAX_IN_FLIGHT: usize = 10;

/// Response message when at least one record was eligible.
pub const MSG_COMPLETE: &str = "Ping operation complete";
/// Response message for an empty inventory.
pub const MSG_NO_SERVERS: &str = "No servers available to ping.";

/// Summary of one sweep, returned to the manual trigger and logged by
/// the scheduled one.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SweepReport {
    pub message: String,
    pub updated: usize,
}

/// A computed status that differs from the stored one.
struct Outcome {
    id: ServerId,
    new_status: ServerStatus,
}

/// Run one full sweep over the inventory.
///
/// Probes run under a 10-permit semaphore and race freely; write-backs
/// are sequential in fetch order, and the first write failure aborts the
/// sweep (earlier writes stay applied — no rollback, no retry).
pub async fn run_sweep(
    store: &dyn InventoryStore,
    prober: Arc<dyn Prober>,
) -> Result<SweepReport, SweepError> {
    let snapshots = store
        .select_for_sweep()
        .await
        .map_err(|e| SweepError::StoreRead(e.to_string()))?;

    if snapshots.is_empty() {
        info!("no servers available to ping");
        return Ok(SweepReport {
            message: MSG_NO_SERVERS.to_string(),
            updated: 0,
        });
    }

    debug!(records = snapshots.len(), "sweep starting");

    let semaphore = Arc::new(Semaphore::new(MAX_IN_FLIGHT));
    let mut probes: Vec<Option<JoinHandle<Option<bool>>>> =
        Vec::with_capacity(snapshots.len());

    for snapshot in &snapshots {
        // Skip rule: no IP entries, or an empty first address.
        let Some(address) = snapshot.primary_address() else {
            probes.push(None);
            continue;
        };
        let address = address.to_string();
        let semaphore = semaphore.clone();
        let prober = prober.clone();
        probes.push(Some(tokio::spawn(async move {
            // The semaphore lives for the whole sweep and is never closed.
            let _permit = semaphore.acquire_owned().await.ok()?;
            Some(prober.probe(&address).await)
        })));
    }

    // Collect in fetch order regardless of completion order.
    let mut outcomes: Vec<Outcome> = Vec::new();
    for (snapshot, handle) in snapshots.iter().zip(probes) {
        let Some(handle) = handle else { continue };
        let reachable = match handle.await {
            Ok(Some(reachable)) => reachable,
            Ok(None) => continue,
            Err(e) => {
                error!(id = %snapshot.id, error = %e, "probe task failed");
                continue;
            }
        };
        let new_status = if reachable {
            ServerStatus::Active
        } else {
            ServerStatus::Down
        };
        if new_status != snapshot.status {
            outcomes.push(Outcome {
                id: snapshot.id.clone(),
                new_status,
            });
        }
    }

    for outcome in &outcomes {
        store
            .update(
                &outcome.id,
                UpdateFields::status_change(outcome.new_status, Utc::now()),
            )
            .await
            .map_err(|e| SweepError::StoreWrite(e.to_string()))?;
        debug!(id = %outcome.id, status = outcome.new_status.label(), "status updated");
    }

    info!(updated = outcomes.len(), "sweep complete");
    Ok(SweepReport {
        message: MSG_COMPLETE.to_string(),
        updated: outcomes.len(),
    })
}
