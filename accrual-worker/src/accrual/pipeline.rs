//! Order resolution pipeline
//!
//! Drives one order through the state machine in [`super::transition`]:
//! query the authority, back off or throttle as told, then write the
//! decision. The balance is credited before the order row is written, and a
//! balance failure aborts the order write.

use std::sync::Arc;
use std::time::Duration;

use accrual_client::AccrualApi;
use rust_decimal::Decimal;
use shared::{AccrualDecision, Balance, Order, OrderStatus, UserId};
use tokio_util::sync::CancellationToken;

use super::error::ResolveError;
use super::transition::{RetryPolicy, Transition, next_transition};
use crate::storage::{BalanceStore, OrderStore};

/// How a resolution ended without error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Decision written to storage; `accrual` is the amount credited, if any
    Applied {
        status: OrderStatus,
        accrual: Option<Decimal>,
    },
    /// Rate limited; nothing written, a later cycle picks the order up again
    Throttled { delay: Duration },
    /// Order already terminal; authority not consulted
    AlreadyFinal { status: OrderStatus },
}

pub struct OrderResolver {
    client: Arc<dyn AccrualApi>,
    orders: Arc<dyn OrderStore>,
    balances: Arc<dyn BalanceStore>,
    policy: RetryPolicy,
}

impl OrderResolver {
    pub fn new(
        client: Arc<dyn AccrualApi>,
        orders: Arc<dyn OrderStore>,
        balances: Arc<dyn BalanceStore>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            client,
            orders,
            balances,
            policy,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Resolve one order against the authority
    ///
    /// Cancellation is checked before every attempt and interrupts backoff and
    /// throttle sleeps. An authority call already in flight is not aborted.
    pub async fn resolve(
        &self,
        order: Order,
        cancel: &CancellationToken,
    ) -> Result<Resolution, ResolveError> {
        if order.status.is_terminal() {
            tracing::debug!(order_number = %order.order_number, status = %order.status, "Order already final, skipping");
            return Ok(Resolution::AlreadyFinal {
                status: order.status,
            });
        }

        let mut attempt = 0;
        loop {
            if cancel.is_cancelled() {
                return Err(ResolveError::Cancelled);
            }
            attempt += 1;

            let outcome = self.client.fetch(&order.order_number).await;
            match next_transition(&self.policy, &order.order_number, attempt, outcome) {
                Transition::Retry { delay, reason } => {
                    tracing::warn!(
                        order_number = %order.order_number,
                        attempt,
                        reason = %reason,
                        delay = ?delay,
                        "Accrual not available yet, retrying"
                    );
                    sleep_or_cancel(delay, cancel).await?;
                }
                Transition::Throttle { delay } => {
                    tracing::warn!(
                        order_number = %order.order_number,
                        delay = ?delay,
                        "Rate limit detected, backing off"
                    );
                    sleep_or_cancel(delay, cancel).await?;
                    return Ok(Resolution::Throttled { delay });
                }
                Transition::Decide(decision) => return self.apply(order, decision).await,
                Transition::Fail(err) => return Err(err),
            }
        }
    }

    async fn apply(
        &self,
        mut order: Order,
        decision: AccrualDecision,
    ) -> Result<Resolution, ResolveError> {
        match &decision.status {
            OrderStatus::Processed => {}
            OrderStatus::Registered => {
                tracing::info!(order_number = %order.order_number, "Order registered, accrual pending");
            }
            OrderStatus::Processing => {
                tracing::debug!(order_number = %order.order_number, "Order still processing");
            }
            OrderStatus::Invalid => {
                tracing::info!(order_number = %order.order_number, "Order rejected by accrual system");
            }
            other => {
                tracing::warn!(order_number = %order.order_number, status = %other, "Unrecognized accrual status, storing as reported");
            }
        }

        let credited = decision.accrual();
        order.status = decision.status;
        if let Some(amount) = credited {
            order.accrual = amount;
            self.credit_balance(order.user_id, amount).await?;
        }

        self.orders
            .update_order(&order)
            .await
            .map_err(|source| ResolveError::Storage {
                order_number: order.order_number.clone(),
                source,
            })?;

        tracing::info!(
            order_number = %order.order_number,
            status = %order.status,
            accrual = %order.accrual,
            "Order updated"
        );
        Ok(Resolution::Applied {
            status: order.status,
            accrual: credited,
        })
    }

    /// Read-modify-write of the user's balance; no retry at this layer
    async fn credit_balance(&self, user_id: UserId, amount: Decimal) -> Result<Balance, ResolveError> {
        let balance_error = |source| ResolveError::Balance { user_id, source };

        let current = self
            .balances
            .get_balance(user_id)
            .await
            .map_err(balance_error)?;
        let updated = self
            .balances
            .set_balance(user_id, current.credited(amount))
            .await
            .map_err(balance_error)?;

        tracing::info!(
            user_id,
            accrual = %amount,
            balance = %updated.current_balance,
            "Balance credited"
        );
        Ok(updated)
    }
}

async fn sleep_or_cancel(delay: Duration, cancel: &CancellationToken) -> Result<(), ResolveError> {
    tokio::select! {
        _ = cancel.cancelled() => Err(ResolveError::Cancelled),
        _ = tokio::time::sleep(delay) => Ok(()),
    }
}
