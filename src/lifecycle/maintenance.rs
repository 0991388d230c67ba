//! Periodic housekeeping: expire old rate-limit records and retry binding for orders that
//! found no round at submission time.

use crate::allocation::{OrderRoundBinder, RateLimiter};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub expired_records: usize,
    pub orders_bound: usize,
}

#[derive(Clone)]
pub struct MaintenanceSweep {
    rate_limiter: RateLimiter,
    binder: OrderRoundBinder,
}

impl MaintenanceSweep {
    pub fn new(rate_limiter: RateLimiter, binder: OrderRoundBinder) -> Self {
        Self {
            rate_limiter,
            binder,
        }
    }

    /// One pass. A failed binding pass is logged and reported as zero.
    pub async fn run_once(&self) -> SweepReport {
        let expired_records = self.rate_limiter.cleanup_old_records();
        let orders_bound = match self.binder.assign_unassigned_orders().await {
            Ok(bound) => bound,
            Err(e) => {
                warn!(error = %e, "Unassigned-order sweep failed");
                0
            }
        };
        SweepReport {
            expired_records,
            orders_bound,
        }
    }

    /// Runs a pass every `interval` until `shutdown` flips to `true` or its sender is dropped.
    pub async fn run(self, interval: Duration, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately.
        ticker.tick().await;
        info!(interval_secs = interval.as_secs(), "Maintenance sweep started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let report = self.run_once().await;
                    info!(?report, "Maintenance sweep");
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        info!("Maintenance sweep stopped");
    }
}
