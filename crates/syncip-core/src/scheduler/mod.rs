//! Periodic driver for the [`Reconciler`]
//!
//! One cycle per tick, never two at once. A cycle that overruns the tick
//! period delays the next tick instead of queueing extra ones. Shutdown is a
//! `watch` channel: flipping it to `true` (or dropping the sender) stops the
//! loop between ticks and also cancels a cycle that is still in flight.

use crate::error::Result;
use crate::metrics::SyncMetrics;
use crate::reconciler::{CycleOutcome, Outcome, Reconciler};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

/// Create a shutdown channel for [`Scheduler::run_until`]
pub fn shutdown_channel() -> (watch::Sender<bool>, watch::Receiver<bool>) {
    watch::channel(false)
}

/// Resolve once shutdown has been requested or the sender is gone
pub async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stop| *stop).await;
}

/// Runs the reconciler on a fixed period
pub struct Scheduler {
    reconciler: Reconciler,
    interval: Duration,
    metrics: Arc<SyncMetrics>,
}

impl Scheduler {
    /// Create a scheduler using the reconciler's configured interval
    pub fn new(reconciler: Reconciler, metrics: Arc<SyncMetrics>) -> Self {
        let interval = reconciler.config().interval;
        Self {
            reconciler,
            interval,
            metrics,
        }
    }

    /// Override the tick period
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Run one counted and logged cycle
    ///
    /// Cycle errors are returned for inspection but are never fatal.
    pub async fn run_cycle(&self) -> Result<CycleOutcome> {
        self.metrics.cycle_started();
        let result = self.reconciler.reconcile().await;
        self.metrics.cycle_finished(&result);

        match &result {
            Ok(outcome) => debug!(
                "Cycle finished: {} ({:?})",
                Outcome::of(&result).as_str(),
                outcome
            ),
            Err(e) => error!("Reconcile cycle failed: {}", e),
        }

        result
    }

    /// Tick until shutdown is requested
    ///
    /// The first cycle runs immediately.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Clean shutdown
    pub async fn run_until(&self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        info!(
            "Starting syncip scheduler for {} (interval: {:?})",
            self.reconciler.config().fqdn(),
            self.interval
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;

                _ = shutdown_requested(&mut shutdown) => {
                    info!("Shutdown signal received, stopping scheduler");
                    break;
                }

                _ = ticker.tick() => {
                    tokio::select! {
                        biased;

                        _ = shutdown_requested(&mut shutdown) => {
                            info!("Shutdown signal received during cycle, cancelling it");
                            break;
                        }

                        _ = self.run_cycle() => {}
                    }
                }
            }
        }

        Ok(())
    }
}
