//! The accrual poller.
//!
//! Freshly registered orders land on a queue and a small pool of workers polls the accrual
//! service for each of them until a terminal result comes back. Orders that are not resolved yet
//! are re-queued at the fixed poll interval; failed polls back off exponentially, capped at
//! [`PollerConfig::max_backoff`]. A 429 from the accrual service pauses every worker until the
//! advertised `Retry-After` deadline has passed.
//!
//! The queue is in-memory only. [`enqueue_backlog`] re-seeds it from storage at startup, so orders
//! that were in flight when the server went down are picked up again.
use std::{cmp::min, sync::Arc, time::Duration};

use log::*;
use loyalty_engine::{
    db_types::{OrderNumber, OrderStatus},
    traits::LedgerError,
    OrderFlowApi,
    SqliteDatabase,
};
use lp_common::Points;
use tokio::{
    sync::{mpsc, Mutex, RwLock},
    task::JoinHandle,
    time::{sleep, Instant},
};

use crate::accrual::{AccrualClientError, AccrualSource, RemoteStatus};

const QUEUE_DEPTH: usize = 1024;

#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Delay before re-polling an order the accrual service has not resolved yet. Also the base
    /// unit for failure backoff delays.
    pub poll_interval: Duration,
    pub workers: usize,
    pub max_backoff: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self { poll_interval: Duration::from_secs(1), workers: 4, max_backoff: Duration::from_secs(60) }
    }
}

#[derive(Debug, Clone)]
struct QueueItem {
    number: OrderNumber,
    attempt: u32,
}

impl QueueItem {
    fn next_attempt(self) -> Self {
        Self { attempt: self.attempt.saturating_add(1), ..self }
    }

    /// A successful poll wipes the failure count, so the next backoff starts from scratch.
    fn fresh(self) -> Self {
        Self { attempt: 0, ..self }
    }
}

/// Cheap-to-clone handle for submitting orders to the polling queue.
#[derive(Clone)]
pub struct PollerHandle {
    tx: mpsc::Sender<QueueItem>,
}

impl PollerHandle {
    pub async fn enqueue(&self, number: OrderNumber) {
        if let Err(e) = self.tx.send(QueueItem { number, attempt: 0 }).await {
            error!("📡️ The polling queue is closed. Order [{}] will only be picked up at the next restart.", e.0.number);
        }
    }

    /// A handle that silently discards everything submitted to it. Used where the endpoints are
    /// exercised without a live poller behind them.
    pub fn sink() -> Self {
        let (tx, mut rx) = mpsc::channel(QUEUE_DEPTH);
        tokio::spawn(async move { while rx.recv().await.is_some() {} });
        Self { tx }
    }
}

struct WorkerContext<S> {
    api: OrderFlowApi<SqliteDatabase>,
    source: S,
    config: PollerConfig,
    tx: mpsc::Sender<QueueItem>,
    rx: Arc<Mutex<mpsc::Receiver<QueueItem>>>,
    pause_until: Arc<RwLock<Option<Instant>>>,
}

/// Starts the polling workers. Do not await the returned handles, they run until the queue closes.
pub fn start_poller<S: AccrualSource>(
    db: SqliteDatabase,
    source: S,
    config: PollerConfig,
) -> (PollerHandle, Vec<JoinHandle<()>>) {
    let (tx, rx) = mpsc::channel(QUEUE_DEPTH);
    let rx = Arc::new(Mutex::new(rx));
    let pause_until = Arc::new(RwLock::new(None::<Instant>));
    let workers = config.workers.max(1);
    let mut handles = Vec::with_capacity(workers);
    for worker_id in 0..workers {
        let ctx = WorkerContext {
            api: OrderFlowApi::new(db.clone()),
            source: source.clone(),
            config: config.clone(),
            tx: tx.clone(),
            rx: Arc::clone(&rx),
            pause_until: Arc::clone(&pause_until),
        };
        handles.push(tokio::spawn(run_worker(worker_id, ctx)));
    }
    info!("📡️ Accrual poller started with {workers} workers");
    (PollerHandle { tx }, handles)
}

/// Re-seeds the polling queue with every order that has not reached a terminal state.
pub async fn enqueue_backlog(api: &OrderFlowApi<SqliteDatabase>, poller: &PollerHandle) -> Result<usize, LedgerError> {
    let orders = api.unresolved_orders().await?;
    let count = orders.len();
    for order in orders {
        poller.enqueue(order.number).await;
    }
    if count > 0 {
        info!("📡️ Re-queued {count} unresolved orders for polling");
    }
    Ok(count)
}

async fn run_worker<S: AccrualSource>(worker_id: usize, ctx: WorkerContext<S>) {
    loop {
        let item = { ctx.rx.lock().await.recv().await };
        let Some(item) = item else {
            debug!("📡️ Worker {worker_id} shutting down. The polling queue is closed.");
            return;
        };
        wait_while_paused(&ctx.pause_until).await;
        process_item(worker_id, &ctx, item).await;
    }
}

async fn wait_while_paused(pause_until: &Arc<RwLock<Option<Instant>>>) {
    loop {
        let deadline = *pause_until.read().await;
        match deadline {
            Some(d) if d > Instant::now() => tokio::time::sleep_until(d).await,
            _ => return,
        }
    }
}

async fn process_item<S: AccrualSource>(worker_id: usize, ctx: &WorkerContext<S>, item: QueueItem) {
    let number = item.number.clone();
    // First pickup moves the order out of Registered. Re-queued items are already Processing.
    match ctx.api.start_processing(&number).await {
        Ok(_) => debug!("📡️ Worker {worker_id} picked up order [{number}]"),
        Err(LedgerError::InvalidTransition { from: OrderStatus::Processing, .. }) => {},
        Err(LedgerError::InvalidTransition { from, .. }) => {
            debug!("📡️ Order [{number}] is already {from}. Dropping it from the queue.");
            return;
        },
        Err(LedgerError::OrderNotFound(_)) => {
            warn!("📡️ Order [{number}] vanished from storage. Dropping it from the queue.");
            return;
        },
        Err(e) => {
            error!("📡️ Could not mark order [{number}] as processing. {e}");
            requeue(ctx, item.next_attempt(), ctx.config.poll_interval);
            return;
        },
    }
    match ctx.source.order_status(&number).await {
        Ok(update) => match update.status {
            RemoteStatus::Processed => {
                commit_result(ctx, item, OrderStatus::Processed, update.accrual.unwrap_or_default()).await
            },
            RemoteStatus::Invalid => commit_result(ctx, item, OrderStatus::Invalid, Points::default()).await,
            RemoteStatus::Registered | RemoteStatus::Processing => {
                trace!("📡️ Order [{number}] is still {:?} remotely. Polling again in {:?}", update.status, ctx.config.poll_interval);
                requeue(ctx, item.fresh(), ctx.config.poll_interval);
            },
        },
        Err(AccrualClientError::NotRegistered) => {
            trace!("📡️ The accrual service has not seen order [{number}] yet. Polling again shortly.");
            requeue(ctx, item.fresh(), ctx.config.poll_interval);
        },
        Err(AccrualClientError::RateLimited { retry_after }) => {
            warn!("📡️ The accrual service is rate limiting us. Pausing all polling for {}s.", retry_after.as_secs());
            *ctx.pause_until.write().await = Some(Instant::now() + retry_after);
            requeue(ctx, item, retry_after);
        },
        Err(e) => {
            let delay = backoff_delay(&ctx.config, item.attempt);
            warn!("📡️ Poll for order [{number}] failed, retrying in {delay:?}. {e}");
            requeue(ctx, item.next_attempt(), delay);
        },
    }
}

async fn commit_result<S: AccrualSource>(
    ctx: &WorkerContext<S>,
    item: QueueItem,
    status: OrderStatus,
    accrual: Points,
) {
    match ctx.api.complete_order(&item.number, status, accrual).await {
        Ok(order) => info!("📡️ Order [{}] resolved as {status} with accrual {}", order.number, order.accrual),
        Err(LedgerError::InvalidTransition { from, to }) => {
            // Another worker or a previous run got there first. The stale result is discarded.
            debug!("📡️ Discarding poll result for order [{}]: cannot move {from} to {to}.", item.number);
        },
        Err(e) => {
            let delay = backoff_delay(&ctx.config, item.attempt);
            error!("📡️ Could not commit the result for order [{}], retrying in {delay:?}. {e}", item.number);
            requeue(ctx, item.next_attempt(), delay);
        },
    }
}

fn requeue<S: AccrualSource>(ctx: &WorkerContext<S>, item: QueueItem, delay: Duration) {
    let tx = ctx.tx.clone();
    tokio::spawn(async move {
        sleep(delay).await;
        if tx.send(item).await.is_err() {
            debug!("📡️ The polling queue closed while a retry was pending.");
        }
    });
}

fn backoff_delay(config: &PollerConfig, attempt: u32) -> Duration {
    let factor = 2u32.saturating_pow(attempt.min(16));
    min(config.poll_interval.saturating_mul(factor), config.max_backoff)
}
