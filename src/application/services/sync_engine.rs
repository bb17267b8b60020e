use crate::application::ports::connectivity::ConnectivityMonitor;
use crate::application::ports::queue_store::DurableQueueStore;
use crate::application::ports::remote::RemoteGateway;
use crate::domain::entities::quote::{Quote, QuoteDraft};
use crate::domain::entities::PendingWrite;
use crate::shared::error::AppError;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Drain attempts per entry before it is dropped and reported as a
/// permanent failure.
pub const MAX_SYNC_ATTEMPTS: u32 = 3;

/// Result of a single write request.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOutcome {
    /// The backend acknowledged the quote and assigned it an identity.
    Created(Quote),
    /// Accepted locally while offline; will be replayed on reconnect.
    Queued { local_id: Uuid },
    /// The request was cancelled. Non-fatal by contract.
    Aborted,
}

/// Outcome of one reconnect drain pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncReport {
    pub synced_count: u32,
    pub failed_count: u32,
    pub pending_count: u32,
    /// Entries that exhausted their retry budget and were removed.
    pub dropped: Vec<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct SyncEngineStatus {
    pub is_syncing: bool,
    pub last_sync: Option<DateTime<Utc>>,
    pub sync_errors: u32,
}

/// Orchestrates every read-or-write routing decision: online writes go to
/// the gateway, offline writes are queued durably, and an Offline→Online
/// transition replays the queue in FIFO order exactly once per pass.
pub struct SyncEngine {
    monitor: Arc<dyn ConnectivityMonitor>,
    store: Arc<dyn DurableQueueStore>,
    gateway: Arc<dyn RemoteGateway>,
    /// Critical section around every queue read-modify-write; a drain and
    /// a concurrent offline append must not interleave.
    queue_lock: Mutex<()>,
    status: RwLock<SyncEngineStatus>,
    /// Set when a drain is requested while one is already running; the
    /// running drain consumes it and runs another pass before going idle.
    rerun_requested: AtomicBool,
    cancel: CancellationToken,
}

impl SyncEngine {
    pub fn new(
        monitor: Arc<dyn ConnectivityMonitor>,
        store: Arc<dyn DurableQueueStore>,
        gateway: Arc<dyn RemoteGateway>,
    ) -> Self {
        Self {
            monitor,
            store,
            gateway,
            queue_lock: Mutex::new(()),
            status: RwLock::new(SyncEngineStatus::default()),
            rerun_requested: AtomicBool::new(false),
            cancel: CancellationToken::new(),
        }
    }

    pub async fn status(&self) -> SyncEngineStatus {
        self.status.read().await.clone()
    }

    /// Cancel the watcher and any drain in flight.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Route a quote-creation request.
    ///
    /// Online: call the gateway; a failure other than cancellation is
    /// user-visible and propagates, never silently queued. Offline: append
    /// to the durable queue. Identical payloads written twice while
    /// offline produce two independent entries; deduplication is a
    /// user-level concern.
    pub async fn write(
        &self,
        draft: QuoteDraft,
        cancel: &CancellationToken,
    ) -> Result<WriteOutcome, AppError> {
        if self.monitor.current().is_effective() {
            match self.gateway.create_quote(&draft, cancel).await {
                Ok(quote) => {
                    info!(quote_id = %quote.id, "quote created online");
                    Ok(WriteOutcome::Created(quote))
                }
                Err(AppError::Aborted) => {
                    warn!("quote creation aborted");
                    Ok(WriteOutcome::Aborted)
                }
                Err(err) => Err(err),
            }
        } else {
            let write = PendingWrite::new(draft);
            let local_id = write.local_id();
            {
                let _guard = self.queue_lock.lock().await;
                self.store.append(write).await?;
            }
            info!(%local_id, "quote queued offline");
            // Connectivity can return between the routing check and the
            // append: a drain pass holds the queue lock for its whole
            // duration and the watch channel coalesces a blip's Online
            // edge away. Re-check and drain so the entry does not sit
            // queued while the device is online.
            if self.monitor.current().is_effective() {
                if let Err(err) = self.on_reconnect().await {
                    warn!(%local_id, %err, "post-append drain failed, entry stays queued");
                }
            }
            Ok(WriteOutcome::Queued { local_id })
        }
    }

    /// Number of writes waiting for replay.
    pub async fn pending_count(&self) -> Result<usize, AppError> {
        Ok(self.store.load_all().await?.len())
    }

    /// Snapshot of the pending queue in FIFO order.
    pub async fn pending_writes(&self) -> Result<Vec<PendingWrite>, AppError> {
        self.store.load_all().await
    }

    /// Replay the pending queue against the backend.
    ///
    /// Runs at most once at a time: a call that arrives while a drain is
    /// in progress returns an empty report immediately and flags the
    /// running drain to make another pass before going idle. Entries are
    /// attempted in FIFO order; each success is removed from the durable
    /// queue right away, so a crash mid-drain neither loses an
    /// acknowledged entry nor re-submits one. A failed entry stays queued
    /// with its attempt recorded and is retried on later passes until
    /// `MAX_SYNC_ATTEMPTS`, after which it is dropped and reported.
    /// Cancellation stops the pass and leaves the remainder queued.
    pub async fn on_reconnect(&self) -> Result<SyncReport, AppError> {
        let mut total = SyncReport::default();
        loop {
            {
                let mut status = self.status.write().await;
                if status.is_syncing {
                    self.rerun_requested.store(true, Ordering::SeqCst);
                    return Ok(SyncReport::default());
                }
                status.is_syncing = true;
            }

            let result = self.drain_until_idle(&mut total).await;

            {
                let mut status = self.status.write().await;
                status.is_syncing = false;
                status.last_sync = Some(Utc::now());
                if result.is_err() {
                    status.sync_errors += 1;
                }
            }
            result?;

            // A rerun request that raced the is_syncing handoff above
            // would otherwise go unserviced.
            if !self.rerun_requested.swap(false, Ordering::SeqCst)
                || self.cancel.is_cancelled()
                || !self.monitor.current().is_effective()
            {
                return Ok(total);
            }
        }
    }

    /// Drain passes until none can make further progress. A single pass
    /// is not enough: entries appended while the pass held the queue lock
    /// (a connectivity blip mid-drain routes writes to the queue, and the
    /// blip's Online edge coalesces away on the watch channel) would
    /// otherwise sit queued until some future reconnect.
    async fn drain_until_idle(&self, total: &mut SyncReport) -> Result<(), AppError> {
        loop {
            let (report, leftover) = self.drain_queue().await?;
            total.synced_count += report.synced_count;
            total.failed_count += report.failed_count;
            total.dropped.extend(report.dropped);
            total.pending_count = report.pending_count;

            let rerun = self.rerun_requested.swap(false, Ordering::SeqCst);
            if self.cancel.is_cancelled() || !self.monitor.current().is_effective() {
                return Ok(());
            }

            let queue = self.store.load_all().await?;
            total.pending_count = queue.len() as u32;
            if queue.is_empty() {
                return Ok(());
            }
            let has_new = queue
                .iter()
                .any(|write| !leftover.contains(&write.local_id()));
            if !has_new && !rerun {
                return Ok(());
            }
        }
    }

    async fn drain_queue(&self) -> Result<(SyncReport, Vec<Uuid>), AppError> {
        let _guard = self.queue_lock.lock().await;

        let queue = self.store.load_all().await?;
        if queue.is_empty() {
            return Ok((SyncReport::default(), Vec::new()));
        }
        info!(pending = queue.len(), "draining offline queue");

        let mut remaining = queue.clone();
        let mut report = SyncReport::default();

        for entry in &queue {
            let local_id = entry.local_id();
            match self.gateway.create_quote(entry.draft(), &self.cancel).await {
                Ok(quote) => {
                    remaining.retain(|w| w.local_id() != local_id);
                    // The backend has already acked this entry; failing to
                    // remove it here means the next pass re-submits it and
                    // creates a server-side duplicate. Retry the removal
                    // once before bailing.
                    if let Err(err) = self.store.replace_all(remaining.clone()).await {
                        warn!(%local_id, quote_id = %quote.id, %err,
                            "failed to remove acked entry, retrying removal");
                        if let Err(err) = self.store.replace_all(remaining.clone()).await {
                            error!(%local_id, quote_id = %quote.id, %err,
                                "acked entry still queued and will be re-submitted next pass");
                            return Err(err);
                        }
                    }
                    report.synced_count += 1;
                    info!(%local_id, quote_id = %quote.id, "queued quote synced");
                }
                Err(AppError::Aborted) => {
                    warn!(%local_id, "drain aborted; remaining entries stay queued");
                    break;
                }
                Err(err) => {
                    report.failed_count += 1;
                    error!(%local_id, %err, "failed to sync queued quote");
                    if let Some(failed) = remaining.iter_mut().find(|w| w.local_id() == local_id) {
                        failed.record_attempt();
                        if failed.attempts() >= MAX_SYNC_ATTEMPTS {
                            error!(%local_id, attempts = failed.attempts(), "retry budget exhausted, dropping entry");
                            remaining.retain(|w| w.local_id() != local_id);
                            report.dropped.push(local_id);
                        }
                    }
                    self.store.replace_all(remaining.clone()).await?;
                }
            }
        }

        report.pending_count = remaining.len() as u32;
        let leftover = remaining.iter().map(|write| write.local_id()).collect();
        Ok((report, leftover))
    }

    /// Drive `on_reconnect` from connectivity transitions: one drain per
    /// Offline→Online edge, detected on effective connectivity.
    pub fn spawn_reconnect_watcher(self: &Arc<Self>) -> JoinHandle<()> {
        let engine = Arc::clone(self);
        tokio::spawn(async move {
            let mut rx = engine.monitor.subscribe();
            let mut was_online = rx.borrow().is_effective();
            loop {
                tokio::select! {
                    _ = engine.cancel.cancelled() => break,
                    changed = rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
                let online = rx.borrow_and_update().is_effective();
                if online && !was_online {
                    match engine.on_reconnect().await {
                        Ok(report) => info!(
                            synced = report.synced_count,
                            failed = report.failed_count,
                            pending = report.pending_count,
                            "reconnect drain finished"
                        ),
                        Err(err) => error!(%err, "reconnect drain failed"),
                    }
                }
                was_online = online;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::queue_store::OFFLINE_QUEUE_KEY;
    use crate::domain::entities::quote::{CustomerInfo, QuoteItem};
    use crate::domain::value_objects::{ConnectivityState, QuoteStatus};
    use crate::infrastructure::connectivity::NetInfoMonitor;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::collections::HashMap;
    use std::collections::VecDeque;
    use std::time::Duration;

    struct MemoryStore {
        queue: Mutex<Vec<PendingWrite>>,
        cached: Mutex<HashMap<String, Value>>,
    }

    impl MemoryStore {
        fn new() -> Self {
            Self {
                queue: Mutex::new(Vec::new()),
                cached: Mutex::new(HashMap::new()),
            }
        }
    }

    #[async_trait]
    impl DurableQueueStore for MemoryStore {
        async fn append(&self, write: PendingWrite) -> Result<(), AppError> {
            self.queue.lock().await.push(write);
            Ok(())
        }

        async fn load_all(&self) -> Result<Vec<PendingWrite>, AppError> {
            Ok(self.queue.lock().await.clone())
        }

        async fn replace_all(&self, writes: Vec<PendingWrite>) -> Result<(), AppError> {
            *self.queue.lock().await = writes;
            Ok(())
        }

        async fn get_cached(&self, key: &str) -> Result<Option<Value>, AppError> {
            Ok(self.cached.lock().await.get(key).cloned())
        }

        async fn set_cached(&self, key: &str, value: Value) -> Result<(), AppError> {
            self.cached.lock().await.insert(key.to_string(), value);
            Ok(())
        }
    }

    #[derive(Default)]
    struct ScriptedGateway {
        create_results: Mutex<VecDeque<Result<Quote, AppError>>>,
        created: Mutex<Vec<QuoteDraft>>,
        delay: Option<Duration>,
    }

    impl ScriptedGateway {
        fn push(&self, result: Result<Quote, AppError>) {
            self.create_results.try_lock().unwrap().push_back(result);
        }

        async fn created_drafts(&self) -> Vec<QuoteDraft> {
            self.created.lock().await.clone()
        }
    }

    #[async_trait]
    impl RemoteGateway for ScriptedGateway {
        async fn create_quote(
            &self,
            draft: &QuoteDraft,
            _cancel: &CancellationToken,
        ) -> Result<Quote, AppError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            let scripted = self.create_results.lock().await.pop_front();
            let result = scripted.unwrap_or_else(|| Ok(make_quote("q-default", draft)));
            if result.is_ok() {
                self.created.lock().await.push(draft.clone());
            }
            result
        }

        async fn list_quotes(
            &self,
            _page: u32,
            _cancel: &CancellationToken,
        ) -> Result<crate::domain::entities::QuotePage, AppError> {
            unimplemented!("not used by sync engine tests")
        }

        async fn list_products(
            &self,
            _cancel: &CancellationToken,
        ) -> Result<Vec<crate::domain::entities::Product>, AppError> {
            unimplemented!("not used by sync engine tests")
        }
    }

    fn make_quote(id: &str, draft: &QuoteDraft) -> Quote {
        Quote {
            id: id.to_string(),
            collection_id: String::new(),
            collection_name: "quotes".to_string(),
            created: "2026-08-01 10:00:00.000Z".to_string(),
            updated: "2026-08-01 10:00:00.000Z".to_string(),
            customer_info: draft.customer_info.clone(),
            description: draft.description.clone().unwrap_or_default(),
            status: draft.status.clone(),
            items: draft.items.clone(),
            subtotal: draft.subtotal,
            total_tax: draft.total_tax,
            total: draft.total,
            valid_until: draft.valid_until.clone(),
        }
    }

    fn draft(customer: &str, price: f64) -> QuoteDraft {
        QuoteDraft::new(
            CustomerInfo {
                name: customer.to_string(),
                ..CustomerInfo::default()
            },
            QuoteStatus::Sent,
            vec![QuoteItem::new("Widget", price, 1)],
            "2026-09-26T00:00:00Z",
        )
    }

    struct Harness {
        engine: Arc<SyncEngine>,
        monitor: Arc<NetInfoMonitor>,
        store: Arc<MemoryStore>,
        gateway: Arc<ScriptedGateway>,
    }

    fn setup(initial: ConnectivityState) -> Harness {
        setup_with_gateway(initial, ScriptedGateway::default())
    }

    fn setup_with_gateway(initial: ConnectivityState, gateway: ScriptedGateway) -> Harness {
        let monitor = Arc::new(NetInfoMonitor::new());
        monitor.sensor_handle().report(initial);
        let store = Arc::new(MemoryStore::new());
        let gateway = Arc::new(gateway);
        let engine = Arc::new(SyncEngine::new(
            monitor.clone(),
            store.clone(),
            gateway.clone(),
        ));
        Harness {
            engine,
            monitor,
            store,
            gateway,
        }
    }

    #[tokio::test]
    async fn offline_writes_queue_in_fifo_order() {
        let h = setup(ConnectivityState::offline());
        let token = CancellationToken::new();

        for name in ["first", "second", "third"] {
            let outcome = h.engine.write(draft(name, 10.0), &token).await.unwrap();
            assert!(matches!(outcome, WriteOutcome::Queued { .. }));
        }

        let queue = h.store.load_all().await.unwrap();
        assert_eq!(queue.len(), 3);
        let names: Vec<_> = queue
            .iter()
            .map(|w| w.draft().customer_info.name.clone())
            .collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn online_write_returns_created_quote() {
        let h = setup(ConnectivityState::online());
        h.gateway.push(Ok(make_quote("q1", &draft("a", 10.0))));

        let outcome = h
            .engine
            .write(draft("a", 10.0), &CancellationToken::new())
            .await
            .unwrap();

        match outcome {
            WriteOutcome::Created(quote) => assert_eq!(quote.id, "q1"),
            other => panic!("expected Created, got {other:?}"),
        }
        assert!(h.store.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn online_failure_propagates_without_queuing() {
        let h = setup(ConnectivityState::online());
        h.gateway.push(Err(AppError::Remote {
            status: 500,
            status_text: "Internal Server Error".into(),
        }));

        let result = h
            .engine
            .write(draft("a", 10.0), &CancellationToken::new())
            .await;

        assert!(matches!(result, Err(AppError::Remote { status: 500, .. })));
        assert!(h.store.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn aborted_online_write_is_absorbed() {
        let h = setup(ConnectivityState::online());
        h.gateway.push(Err(AppError::Aborted));

        let outcome = h
            .engine
            .write(draft("a", 10.0), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(outcome, WriteOutcome::Aborted);
        assert!(h.store.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn reconnect_drains_fifo_and_empties_queue() {
        let h = setup(ConnectivityState::offline());
        let token = CancellationToken::new();
        h.engine.write(draft("first", 100.0), &token).await.unwrap();
        h.engine.write(draft("second", 50.0), &token).await.unwrap();

        h.monitor.sensor_handle().report(ConnectivityState::online());
        let report = h.engine.on_reconnect().await.unwrap();

        assert_eq!(report.synced_count, 2);
        assert_eq!(report.failed_count, 0);
        assert_eq!(report.pending_count, 0);
        assert!(h.store.load_all().await.unwrap().is_empty());

        let names: Vec<_> = h
            .gateway
            .created_drafts()
            .await
            .iter()
            .map(|d| d.customer_info.name.clone())
            .collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn failed_entry_is_retained_with_attempt_recorded() {
        let h = setup(ConnectivityState::offline());
        let token = CancellationToken::new();
        h.engine.write(draft("one", 1.0), &token).await.unwrap();
        h.engine.write(draft("two", 2.0), &token).await.unwrap();
        h.engine.write(draft("three", 3.0), &token).await.unwrap();

        let failing = draft("two", 2.0);
        h.gateway.push(Ok(make_quote("q1", &draft("one", 1.0))));
        h.gateway.push(Err(AppError::Network("connection reset".into())));
        h.gateway.push(Ok(make_quote("q3", &failing)));

        h.monitor.sensor_handle().report(ConnectivityState::online());
        let report = h.engine.on_reconnect().await.unwrap();

        assert_eq!(report.synced_count, 2);
        assert_eq!(report.failed_count, 1);
        assert_eq!(report.pending_count, 1);
        assert!(report.dropped.is_empty());

        let queue = h.store.load_all().await.unwrap();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].draft().customer_info.name, "two");
        assert_eq!(queue[0].attempts(), 1);
    }

    #[tokio::test]
    async fn entry_dropped_after_retry_budget_exhausted() {
        let h = setup(ConnectivityState::offline());
        let token = CancellationToken::new();
        h.engine.write(draft("stubborn", 9.0), &token).await.unwrap();

        h.monitor.sensor_handle().report(ConnectivityState::online());
        let mut last = SyncReport::default();
        for _ in 0..MAX_SYNC_ATTEMPTS {
            h.gateway.push(Err(AppError::Remote {
                status: 400,
                status_text: "Bad Request".into(),
            }));
            last = h.engine.on_reconnect().await.unwrap();
        }

        assert_eq!(last.dropped.len(), 1);
        assert_eq!(last.pending_count, 0);
        assert!(h.store.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn aborted_drain_leaves_queue_intact() {
        let h = setup(ConnectivityState::offline());
        let token = CancellationToken::new();
        h.engine.write(draft("one", 1.0), &token).await.unwrap();
        h.engine.write(draft("two", 2.0), &token).await.unwrap();

        h.monitor.sensor_handle().report(ConnectivityState::online());
        h.gateway.push(Err(AppError::Aborted));
        let report = h.engine.on_reconnect().await.unwrap();

        assert_eq!(report.synced_count, 0);
        assert_eq!(report.pending_count, 2);
        assert_eq!(h.store.load_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn reconnect_pass_is_not_reentrant() {
        let gateway = ScriptedGateway {
            delay: Some(Duration::from_millis(100)),
            ..ScriptedGateway::default()
        };
        let h = setup_with_gateway(ConnectivityState::offline(), gateway);
        let token = CancellationToken::new();
        h.engine.write(draft("slow", 5.0), &token).await.unwrap();

        h.monitor.sensor_handle().report(ConnectivityState::online());
        let first = {
            let engine = h.engine.clone();
            tokio::spawn(async move { engine.on_reconnect().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        // Second invocation while the first pass is still running.
        let second = h.engine.on_reconnect().await.unwrap();
        assert_eq!(second, SyncReport::default());

        let first = first.await.unwrap().unwrap();
        assert_eq!(first.synced_count, 1);
        assert!(h.store.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn watcher_drains_on_offline_to_online_edge() {
        let h = setup(ConnectivityState::offline());
        let token = CancellationToken::new();
        h.engine.write(draft("queued", 7.0), &token).await.unwrap();

        let watcher = h.engine.spawn_reconnect_watcher();
        h.monitor.sensor_handle().report(ConnectivityState::online());

        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        loop {
            if h.store.load_all().await.unwrap().is_empty() {
                break;
            }
            assert!(
                tokio::time::Instant::now() < deadline,
                "watcher never drained the queue"
            );
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        h.engine.shutdown();
        let _ = watcher.await;
    }

    struct FlakyStore {
        inner: MemoryStore,
        replace_failures: Mutex<u32>,
    }

    impl FlakyStore {
        fn new() -> Self {
            Self {
                inner: MemoryStore::new(),
                replace_failures: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl DurableQueueStore for FlakyStore {
        async fn append(&self, write: PendingWrite) -> Result<(), AppError> {
            self.inner.append(write).await
        }

        async fn load_all(&self) -> Result<Vec<PendingWrite>, AppError> {
            self.inner.load_all().await
        }

        async fn replace_all(&self, writes: Vec<PendingWrite>) -> Result<(), AppError> {
            let mut failures = self.replace_failures.lock().await;
            if *failures > 0 {
                *failures -= 1;
                return Err(AppError::Storage("disk full".into()));
            }
            self.inner.replace_all(writes).await
        }

        async fn get_cached(&self, key: &str) -> Result<Option<Value>, AppError> {
            self.inner.get_cached(key).await
        }

        async fn set_cached(&self, key: &str, value: Value) -> Result<(), AppError> {
            self.inner.set_cached(key, value).await
        }
    }

    #[tokio::test]
    async fn write_queued_during_drain_is_drained_while_still_online() {
        let gateway = ScriptedGateway {
            delay: Some(Duration::from_millis(100)),
            ..ScriptedGateway::default()
        };
        let h = setup_with_gateway(ConnectivityState::offline(), gateway);
        let token = CancellationToken::new();
        h.engine.write(draft("first", 1.0), &token).await.unwrap();

        h.monitor.sensor_handle().report(ConnectivityState::online());
        let first_pass = {
            let engine = h.engine.clone();
            tokio::spawn(async move { engine.on_reconnect().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        // Connectivity blips away mid-drain; the write routes to the
        // queue, and the blip's Online edge coalesces before anyone
        // observes it.
        h.monitor.sensor_handle().report(ConnectivityState::offline());
        let second_write = {
            let engine = h.engine.clone();
            tokio::spawn(async move {
                engine
                    .write(draft("second", 2.0), &CancellationToken::new())
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        h.monitor.sensor_handle().report(ConnectivityState::online());

        let outcome = second_write.await.unwrap().unwrap();
        assert!(matches!(outcome, WriteOutcome::Queued { .. }));
        first_pass.await.unwrap().unwrap();

        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        while !h.store.load_all().await.unwrap().is_empty() {
            assert!(
                tokio::time::Instant::now() < deadline,
                "write queued during the drain was stranded"
            );
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    #[tokio::test]
    async fn acked_entry_removal_is_retried_on_storage_failure() {
        let monitor = Arc::new(NetInfoMonitor::new());
        let store = Arc::new(FlakyStore::new());
        let gateway = Arc::new(ScriptedGateway::default());
        let engine = SyncEngine::new(monitor.clone(), store.clone(), gateway);

        engine
            .write(draft("acked", 1.0), &CancellationToken::new())
            .await
            .unwrap();
        *store.replace_failures.lock().await = 1;

        monitor.sensor_handle().report(ConnectivityState::online());
        let report = engine.on_reconnect().await.unwrap();

        assert_eq!(report.synced_count, 1);
        assert!(store.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn persistent_removal_failure_surfaces_with_entry_retained() {
        let monitor = Arc::new(NetInfoMonitor::new());
        let store = Arc::new(FlakyStore::new());
        let gateway = Arc::new(ScriptedGateway::default());
        let engine = SyncEngine::new(monitor.clone(), store.clone(), gateway);

        engine
            .write(draft("acked", 1.0), &CancellationToken::new())
            .await
            .unwrap();
        *store.replace_failures.lock().await = 2;

        monitor.sensor_handle().report(ConnectivityState::online());
        let result = engine.on_reconnect().await;

        assert!(matches!(result, Err(AppError::Storage(_))));
        // The acked entry is still queued; the next pass re-submits it
        // rather than losing it.
        assert_eq!(store.load_all().await.unwrap().len(), 1);
        assert_eq!(engine.status().await.sync_errors, 1);
    }

    #[tokio::test]
    async fn identical_payloads_queue_independently() {
        let h = setup(ConnectivityState::offline());
        let token = CancellationToken::new();
        h.engine.write(draft("same", 10.0), &token).await.unwrap();
        h.engine.write(draft("same", 10.0), &token).await.unwrap();

        let queue = h.store.load_all().await.unwrap();
        assert_eq!(queue.len(), 2);
        assert_ne!(queue[0].local_id(), queue[1].local_id());
    }

    #[tokio::test]
    async fn pending_helpers_reflect_queue() {
        let h = setup(ConnectivityState::offline());
        let token = CancellationToken::new();
        h.engine.write(draft("a", 1.0), &token).await.unwrap();

        assert_eq!(h.engine.pending_count().await.unwrap(), 1);
        let writes = h.engine.pending_writes().await.unwrap();
        assert_eq!(writes[0].draft().customer_info.name, "a");

        // The cache keys are untouched by queue traffic.
        assert!(h
            .store
            .get_cached(OFFLINE_QUEUE_KEY)
            .await
            .unwrap()
            .is_none());
    }
}
