//! rackwatch-scheduler — the time-based sweep trigger.
//!
//! Equivalent of cron `0 9,21 * * *`: one sweep at 09:00 and one at
//! 21:00 UTC daily. There is no caller to answer to; the report (or the
//! failure) goes to the operational log and nowhere else. Overlap with a
//! manually triggered sweep is not coordinated — both may write.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Days, Utc};
use tokio::sync::watch;
use tracing::{debug, error, info};

use rackwatch_store::InventoryStore;
use rackwatch_sweep::{run_sweep, Prober};

/// UTC hours at which the sweep fires.
pub const FIRE_HOURS: [u32; 2] = [9, 21];

/// The next scheduled fire time strictly after `after`.
///
/// Strictness keeps a sweep that lands exactly on a boundary from firing
/// twice.
pub fn next_fire_time(after: DateTime<Utc>) -> DateTime<Utc> {
    let date = after.date_naive();
    (0..=1)
        .flat_map(|days| {
            let day = date + Days::new(days);
            FIRE_HOURS
                .iter()
                .filter_map(move |&hour| day.and_hms_opt(hour, 0, 0))
        })
        .map(|naive| naive.and_utc())
        .find(|t| *t > after)
        // Two days always contain a boundary; this is never reached.
        .unwrap_or_else(|| after + chrono::Duration::hours(12))
}

/// Runs the sweep on the fixed schedule until shut down.
pub struct SweepScheduler {
    store: Arc<dyn InventoryStore>,
    prober: Arc<dyn Prober>,
}

impl SweepScheduler {
    pub fn new(store: Arc<dyn InventoryStore>, prober: Arc<dyn Prober>) -> Self {
        Self { store, prober }
    }

    /// The schedule loop. Intended to be spawned; exits when the
    /// shutdown signal flips.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        loop {
            let now = Utc::now();
            let next = next_fire_time(now);
            let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
            info!(next = %next, "next scheduled sweep");

            tokio::select! {
                _ = tokio::time::sleep(wait) => {
                    info!("starting scheduled sweep");
                    match run_sweep(&*self.store, self.prober.clone()).await {
                        Ok(report) => {
                            info!(updated = report.updated, message = %report.message,
                                "scheduled sweep finished");
                        }
                        Err(e) => error!(error = %e, "scheduled sweep failed"),
                    }
                }
                _ = shutdown.changed() => {
                    debug!("scheduler shutting down");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rackwatch_store::MemoryStore;

    struct NeverUpProber;

    #[async_trait::async_trait]
    impl Prober for NeverUpProber {
        async fn probe(&self, _address: &str) -> bool {
            false
        }
    }

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, h, m, s).unwrap()
    }

    #[test]
    fn before_morning_fires_at_nine() {
        assert_eq!(next_fire_time(at(3, 15, 0)), at(9, 0, 0));
    }

    #[test]
    fn midday_fires_at_twenty_one() {
        assert_eq!(next_fire_time(at(9, 0, 1)), at(21, 0, 0));
        assert_eq!(next_fire_time(at(14, 30, 0)), at(21, 0, 0));
    }

    #[test]
    fn late_evening_rolls_to_next_morning() {
        let next = next_fire_time(at(21, 0, 1));
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 5, 11, 9, 0, 0).unwrap());
    }

    #[test]
    fn exact_boundary_is_not_refired() {
        assert_eq!(next_fire_time(at(9, 0, 0)), at(21, 0, 0));
        let next = next_fire_time(at(21, 0, 0));
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 5, 11, 9, 0, 0).unwrap());
    }

    #[test]
    fn month_boundary_rolls_over() {
        let after = Utc.with_ymd_and_hms(2024, 1, 31, 22, 0, 0).unwrap();
        assert_eq!(
            next_fire_time(after),
            Utc.with_ymd_and_hms(2024, 2, 1, 9, 0, 0).unwrap()
        );
    }

    #[tokio::test]
    async fn scheduler_stops_on_shutdown_signal() {
        let scheduler = SweepScheduler::new(
            Arc::new(MemoryStore::new()),
            Arc::new(NeverUpProber),
        );
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(scheduler.run(shutdown_rx));
        shutdown_tx.send(true).unwrap();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("scheduler did not stop")
            .unwrap();
    }
}
