//! Poll cycles through the full service: registry, pool and pipeline

mod common;

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use accrual_worker::accrual::{AccrualService, ClaimStore, CycleReport, PollSettings, RetryPolicy};
use accrual_worker::core::BackgroundTasks;
use rust_decimal_macros::dec;
use shared::OrderStatus;
use tokio_util::sync::CancellationToken;

use common::{RecordingStore, RoutingClient, decided, processed, seeded_store};

const FIRST: &str = "79927398713";
const SECOND: &str = "12345678903";
const THIRD: &str = "4561261212345467";

fn store() -> Arc<RecordingStore> {
    Arc::new(RecordingStore::new(seeded_store(
        &[(1, dec!(0)), (2, dec!(100))],
        &[(FIRST, 1, 10), (SECOND, 2, 20), (THIRD, 1, 30)],
    )))
}

fn client() -> RoutingClient {
    RoutingClient::new()
        .route(FIRST, processed(FIRST, 500.5))
        .route(SECOND, processed(SECOND, 20.0))
        .route(THIRD, decided(THIRD, "INVALID"))
}

fn service(
    client: Arc<RoutingClient>,
    store: &Arc<RecordingStore>,
    settings: PollSettings,
    shutdown: CancellationToken,
) -> AccrualService {
    AccrualService::with_settings(
        settings,
        RetryPolicy::new(3, Duration::from_millis(10)),
        2,
        2,
        client,
        store.clone(),
        store.clone(),
        shutdown,
    )
}

#[tokio::test]
async fn cycle_dispatches_and_resolves_eligible_orders() {
    let store = store();
    let client = Arc::new(client());
    let service = service(client.clone(), &store, PollSettings::default(), CancellationToken::new());

    let report = service.reconciler().run_cycle().await;
    assert_eq!(
        report,
        CycleReport {
            fetched: 3,
            dispatched: 3,
            skipped: 0,
            rejected: 0,
        }
    );

    service.shutdown().await;

    assert_eq!(store.inner.get_order(FIRST).unwrap().status, OrderStatus::Processed);
    assert_eq!(store.inner.get_order(SECOND).unwrap().accrual, dec!(20));
    assert_eq!(store.inner.get_order(THIRD).unwrap().status, OrderStatus::Invalid);
    assert_eq!(store.inner.balance(1).unwrap().current_balance, dec!(500.5));
    assert_eq!(store.inner.balance(2).unwrap().current_balance, dec!(120));
    assert_eq!(client.total_calls(), 3);
    // Every task released its claim
    assert!(service.registry().is_empty());
}

#[tokio::test]
async fn batch_limit_takes_oldest_first() {
    let store = store();
    let client = Arc::new(client());
    let settings = PollSettings::new(Duration::from_secs(5), 1);
    let service = service(client.clone(), &store, settings, CancellationToken::new());

    let report = service.reconciler().run_cycle().await;
    service.shutdown().await;

    assert_eq!(report.fetched, 1);
    assert_eq!(client.calls_for(FIRST), 1);
    assert_eq!(client.total_calls(), 1);
    assert_eq!(store.inner.get_order(THIRD).unwrap().status, OrderStatus::New);
}

#[tokio::test]
async fn overlapping_cycles_do_not_dispatch_twice() {
    let store = store();
    let gate = CancellationToken::new();
    let client = Arc::new(client().gated(gate.clone()));
    let service = service(client.clone(), &store, PollSettings::default(), CancellationToken::new());

    let first = service.reconciler().run_cycle().await;
    assert_eq!(first.dispatched, 3);
    assert_eq!(service.registry().len(), 3);

    // Previous batch still in flight
    let second = service.reconciler().run_cycle().await;
    assert_eq!(second.fetched, 3);
    assert_eq!(second.dispatched, 0);
    assert_eq!(second.skipped, 3);

    gate.cancel();
    service.shutdown().await;

    assert_eq!(client.calls_for(FIRST), 1);
    assert_eq!(store.inner.balance(1).unwrap().current_balance, dec!(500.5));
    assert_eq!(store.balance_writes.load(Ordering::SeqCst), 2);
    assert!(service.registry().is_empty());
}

#[tokio::test]
async fn claim_is_released_after_failed_task() {
    let store = store();
    // No routes: every order answers 204 until the attempt budget runs out
    let client = Arc::new(RoutingClient::new());
    let service = service(client.clone(), &store, PollSettings::default(), CancellationToken::new());

    service.reconciler().run_cycle().await;
    service.shutdown().await;

    assert_eq!(client.calls_for(FIRST), 3);
    assert!(service.registry().is_empty());
    assert!(service.registry().try_claim(FIRST));
    assert_eq!(store.inner.get_order(FIRST).unwrap().status, OrderStatus::New);
}

#[tokio::test]
async fn storage_failure_skips_cycle() {
    let store = store();
    store.fail_eligible.store(true, Ordering::SeqCst);
    let client = Arc::new(client());
    let service = service(client.clone(), &store, PollSettings::default(), CancellationToken::new());

    let report = service.reconciler().run_cycle().await;
    service.shutdown().await;

    assert_eq!(report, CycleReport::default());
    assert_eq!(client.total_calls(), 0);
}

#[tokio::test]
async fn cancelled_dispatch_releases_claim() {
    let store = store();
    let shutdown = CancellationToken::new();
    let client = Arc::new(client());
    let service = service(client.clone(), &store, PollSettings::default(), shutdown.clone());
    shutdown.cancel();

    let report = service.reconciler().run_cycle().await;
    service.shutdown().await;

    assert_eq!(report.dispatched, 0);
    assert_eq!(report.rejected, 1);
    assert!(service.registry().is_empty());
    assert_eq!(client.total_calls(), 0);
}

#[tokio::test]
async fn closed_pool_rejects_and_releases_claims() {
    let store = store();
    let client = Arc::new(client());
    let service = service(client.clone(), &store, PollSettings::default(), CancellationToken::new());
    service.shutdown().await;

    let report = service.reconciler().run_cycle().await;

    assert_eq!(report.fetched, 3);
    assert_eq!(report.rejected, 3);
    assert!(service.registry().is_empty());
    assert_eq!(client.total_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn run_loop_ticks_after_interval_until_shutdown() {
    let store = store();
    let client = Arc::new(client());
    let mut tasks = BackgroundTasks::new();
    let settings = PollSettings::new(Duration::from_secs(5), 1000);
    let service = service(client.clone(), &store, settings, tasks.shutdown_token());

    service.start(&mut tasks);
    assert_eq!(tasks.len(), 1);

    // First cycle fires one full interval after start
    tokio::time::sleep(Duration::from_secs(4)).await;
    assert_eq!(store.eligible_calls.load(Ordering::SeqCst), 0);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(store.eligible_calls.load(Ordering::SeqCst), 1);

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(store.eligible_calls.load(Ordering::SeqCst), 2);

    tasks.shutdown().await;
    service.shutdown().await;

    assert_eq!(store.inner.balance(1).unwrap().current_balance, dec!(500.5));
    assert_eq!(client.calls_for(FIRST), 1);
}

#[tokio::test(start_paused = true)]
async fn zero_poll_interval_still_ticks() {
    let store = store();
    let client = Arc::new(client());
    let mut tasks = BackgroundTasks::new();
    let settings = PollSettings::new(Duration::ZERO, 1000);
    let service = service(client.clone(), &store, settings, tasks.shutdown_token());

    service.start(&mut tasks);
    tokio::time::sleep(Duration::from_millis(300)).await;

    assert!(store.eligible_calls.load(Ordering::SeqCst) > 0);

    tasks.shutdown().await;
    service.shutdown().await;

    assert_eq!(store.inner.balance(1).unwrap().current_balance, dec!(500.5));
    assert_eq!(client.calls_for(FIRST), 1);
}
