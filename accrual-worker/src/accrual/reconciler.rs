//! Reconciliation loop
//!
//! Every tick: fetch the oldest eligible orders, claim each one in the
//! in-flight registry and hand it to the worker pool. Orders that are already
//! claimed belong to an earlier cycle and are skipped.

use std::sync::Arc;
use std::time::Duration;

use shared::Order;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::pipeline::{OrderResolver, Resolution};
use super::registry::{Claim, ClaimStore};
use crate::core::{PoolError, Task, TaskQueue};
use crate::storage::OrderStore;

/// Shortest accepted poll period; `tokio::time::interval` rejects zero
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Poll cadence and batch size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub batch_limit: usize,
}

impl PollSettings {
    /// `interval` is clamped to [`MIN_POLL_INTERVAL`]
    pub fn new(interval: Duration, batch_limit: usize) -> Self {
        Self {
            interval: interval.max(MIN_POLL_INTERVAL),
            batch_limit,
        }
    }
}

impl Default for PollSettings {
    fn default() -> Self {
        Self::new(Duration::from_secs(5), 1000)
    }
}

/// Outcome counters of one poll cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Eligible orders returned by storage
    pub fetched: usize,
    /// Claimed and queued
    pub dispatched: usize,
    /// Already in flight
    pub skipped: usize,
    /// Claimed but refused by the pool (claim released)
    pub rejected: usize,
}

#[derive(Clone)]
pub struct Reconciler {
    orders: Arc<dyn OrderStore>,
    resolver: Arc<OrderResolver>,
    claims: Arc<dyn ClaimStore>,
    queue: Arc<dyn TaskQueue>,
    settings: PollSettings,
    shutdown: CancellationToken,
}

impl Reconciler {
    pub fn new(
        orders: Arc<dyn OrderStore>,
        resolver: Arc<OrderResolver>,
        claims: Arc<dyn ClaimStore>,
        queue: Arc<dyn TaskQueue>,
        settings: PollSettings,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            orders,
            resolver,
            claims,
            queue,
            settings,
            shutdown,
        }
    }

    /// Tick until the shutdown token fires
    pub async fn run(self) {
        let period = self.settings.interval.max(MIN_POLL_INTERVAL);
        tracing::info!(
            interval = ?period,
            batch_limit = self.settings.batch_limit,
            "Accrual reconciler started"
        );

        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await; // skip immediate tick

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    tracing::info!("Accrual reconciler received shutdown signal");
                    break;
                }
                _ = ticker.tick() => {
                    let report = self.run_cycle().await;
                    if report.fetched > 0 {
                        tracing::debug!(
                            fetched = report.fetched,
                            dispatched = report.dispatched,
                            skipped = report.skipped,
                            rejected = report.rejected,
                            "Reconciliation cycle finished"
                        );
                    }
                }
            }
        }
    }

    /// One poll cycle. A storage failure skips the cycle.
    pub async fn run_cycle(&self) -> CycleReport {
        let orders = match self
            .orders
            .find_eligible_for_processing(self.settings.batch_limit)
            .await
        {
            Ok(orders) => orders,
            Err(e) => {
                tracing::error!(error = %e, "Failed to fetch orders for processing");
                return CycleReport::default();
            }
        };

        let mut report = CycleReport {
            fetched: orders.len(),
            ..CycleReport::default()
        };

        for order in orders {
            let Some(claim) = Claim::acquire(&self.claims, &order.order_number) else {
                report.skipped += 1;
                continue;
            };

            let order_number = order.order_number.clone();
            // A refused task is dropped inside submit, releasing its claim.
            match self.queue.submit(self.order_task(order, claim), &self.shutdown).await {
                Ok(()) => report.dispatched += 1,
                Err(PoolError::Cancelled) => {
                    report.rejected += 1;
                    tracing::debug!(order_number = %order_number, "Dispatch cancelled by shutdown");
                    break;
                }
                Err(e) => {
                    report.rejected += 1;
                    tracing::warn!(order_number = %order_number, error = %e, "Failed to dispatch order");
                }
            }
        }

        report
    }

    fn order_task(&self, order: Order, claim: Claim) -> Task {
        let resolver = Arc::clone(&self.resolver);
        let cancel = self.shutdown.clone();

        Box::pin(async move {
            let _claim = claim;
            let order_number = order.order_number.clone();

            match resolver.resolve(order, &cancel).await {
                Ok(Resolution::Applied { status, .. }) => {
                    tracing::debug!(order_number = %order_number, status = %status, "Order resolved");
                    Ok(())
                }
                Ok(_) => Ok(()),
                Err(e) if e.is_cancelled() => {
                    tracing::debug!(order_number = %order_number, "Order resolution cancelled");
                    Ok(())
                }
                Err(e) => Err(anyhow::Error::new(e)),
            }
        })
    }
}
