//! Fixed-delay poll loop: run a cycle, sleep, repeat until shutdown.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use tokio::{sync::watch, time::sleep};
use tracing::{error, info};

use crate::{metrics::Metrics, rebalancer::Rebalancer};

/// Source of the current unix time, in seconds.
pub trait Clock: Send + Sync {
    fn now(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

pub struct Scheduler {
    rebalancer: Arc<Rebalancer>,
    interval: Duration,
    metrics: Metrics,
}

impl Scheduler {
    pub fn new(rebalancer: Arc<Rebalancer>, interval: Duration) -> Self {
        Self {
            rebalancer,
            interval,
            metrics: Metrics::new(),
        }
    }

    /// Run until `shutdown` flips to `true` (or its sender is dropped).
    /// Returns the number of completed cycles.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> u64 {
        let mut cycles = 0u64;

        loop {
            if *shutdown.borrow() {
                break;
            }

            self.run_cycle().await;
            cycles += 1;

            tokio::select! {
                _ = sleep(self.interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!(cycles, "Scheduler stopped");
        cycles
    }

    /// One cycle in its own task so a panic is logged instead of ending the loop.
    async fn run_cycle(&self) {
        let started = Instant::now();
        let rebalancer = self.rebalancer.clone();

        match tokio::spawn(async move { rebalancer.run_cycle().await }).await {
            Ok(summary) => info!(
                pools = summary.pools,
                undeployed = summary.undeployed,
                not_due = summary.not_due,
                rebalanced = summary.rebalanced,
                failed = summary.failed,
                "Cycle complete"
            ),
            Err(e) if e.is_panic() => error!(error = %e, "Cycle panicked"),
            Err(e) => error!(error = %e, "Cycle task failed"),
        }

        self.metrics.record_cycle(started.elapsed());
    }
}
