//! Accrual service wiring
//!
//! Owns the registry and worker pool and builds the reconciler over them.

use std::sync::Arc;

use accrual_client::AccrualApi;
use tokio_util::sync::CancellationToken;

use super::pipeline::OrderResolver;
use super::reconciler::{PollSettings, Reconciler};
use super::registry::{ClaimStore, InFlightRegistry};
use super::transition::RetryPolicy;
use crate::core::{BackgroundTasks, Config, TaskKind, TaskQueue, WorkerPool};
use crate::storage::{BalanceStore, OrderStore};

pub struct AccrualService {
    pool: Arc<WorkerPool>,
    registry: Arc<InFlightRegistry>,
    reconciler: Reconciler,
}

impl AccrualService {
    /// Build from process configuration. Spawns the pool workers.
    pub fn new(
        config: &Config,
        client: Arc<dyn AccrualApi>,
        orders: Arc<dyn OrderStore>,
        balances: Arc<dyn BalanceStore>,
        shutdown: CancellationToken,
    ) -> Self {
        Self::with_settings(
            config.poll_settings(),
            config.retry_policy(),
            config.worker_count,
            config.queue_capacity,
            client,
            orders,
            balances,
            shutdown,
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn with_settings(
        settings: PollSettings,
        policy: RetryPolicy,
        workers: usize,
        queue_capacity: usize,
        client: Arc<dyn AccrualApi>,
        orders: Arc<dyn OrderStore>,
        balances: Arc<dyn BalanceStore>,
        shutdown: CancellationToken,
    ) -> Self {
        let pool = Arc::new(WorkerPool::new(workers, queue_capacity));
        let registry = Arc::new(InFlightRegistry::new());
        let resolver = Arc::new(OrderResolver::new(client, orders.clone(), balances, policy));

        let reconciler = Reconciler::new(
            orders,
            resolver,
            registry.clone() as Arc<dyn ClaimStore>,
            pool.clone() as Arc<dyn TaskQueue>,
            settings,
            shutdown,
        );

        Self {
            pool,
            registry,
            reconciler,
        }
    }

    /// Register the reconciliation loop as a periodic background task
    pub fn start(&self, tasks: &mut BackgroundTasks) {
        tasks.spawn(
            "accrual_reconciler",
            TaskKind::Periodic,
            self.reconciler.clone().run(),
        );
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    pub fn registry(&self) -> &InFlightRegistry {
        &self.registry
    }

    /// Stop intake and wait for queued tasks to drain
    pub async fn shutdown(&self) {
        self.pool.close();
        self.pool.join().await;
    }
}
