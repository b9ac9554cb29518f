use crate::data_sync::resource_request::{LockAttempt, ResourceRequestStore};
use crate::data_sync::upstream::{UpstreamApi, UpstreamParams};
use crate::error::SyncError;
use chrono::{DateTime, Utc};
use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::Value;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

pub type PageFuture = BoxFuture<'static, Result<(), SyncError>>;

/// Callback receiving the JSON body of every fetched page.
pub type PageHandler = Arc<dyn Fn(Value) -> PageFuture + Send + Sync>;

pub fn page_handler<F, Fut>(handler: F) -> PageHandler
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), SyncError>> + Send + 'static,
{
    Arc::new(move |body| handler(body).boxed())
}

/// Callback run once per fetch cycle, after the first page arrived and before
/// it is handled.
pub type CycleHook = Arc<dyn Fn() -> PageFuture + Send + Sync>;

pub fn cycle_hook<F, Fut>(hook: F) -> CycleHook
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), SyncError>> + Send + 'static,
{
    Arc::new(move || hook().boxed())
}

/// One upstream resource and the handler that persists its pages.
#[derive(Clone)]
pub struct SyncTarget {
    pub path: String,
    pub params: UpstreamParams,
    /// Separates the freshness record of resources fetched from the same
    /// path by different resync flows.
    pub namespace: Option<String>,
    pub update: PageHandler,
    /// Clears what the cycle is about to replace, e.g. one side of a region's book.
    pub on_cycle_start: Option<CycleHook>,
}

impl SyncTarget {
    pub fn new(path: impl Into<String>, update: PageHandler) -> Self {
        Self { path: path.into(), params: UpstreamParams::default(), namespace: None, update, on_cycle_start: None }
    }

    pub fn with_params(mut self, params: UpstreamParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn with_cycle_start(mut self, hook: CycleHook) -> Self {
        self.on_cycle_start = Some(hook);
        self
    }

    /// Key of the [`ResourceRequestRecord`](crate::data_sync::ResourceRequestRecord) tracking this resource.
    pub fn key(&self) -> String {
        let resource = self.params.resource_key(&self.path);
        match &self.namespace {
            Some(namespace) => format!("{namespace}:{resource}"),
            None => resource,
        }
    }
}

/// A cached read paired with the upstream resource that backs it.
pub struct SyncRequest<R> {
    pub target: SyncTarget,
    /// Evaluated after the refresh is scheduled; never waits on the upstream.
    pub read: R,
}

impl<R> SyncRequest<R> {
    pub fn new(target: SyncTarget, read: R) -> Self {
        Self { target, read }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RefreshOutcome {
    Fresh,
    /// Dropped because another refresh of the same path was in flight.
    Busy,
    Refreshed { pages: u32 },
}

#[derive(Debug, Default)]
pub struct SyncStats {
    pub refreshed: AtomicU64,
    pub skipped_fresh: AtomicU64,
    pub skipped_busy: AtomicU64,
    pub failed: AtomicU64,
}

impl SyncStats {
    pub fn snapshot(&self) -> SyncStatsSnapshot {
        SyncStatsSnapshot {
            refreshed: self.refreshed.load(Ordering::Relaxed),
            skipped_fresh: self.skipped_fresh.load(Ordering::Relaxed),
            skipped_busy: self.skipped_busy.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncStatsSnapshot {
    pub refreshed: u64,
    pub skipped_fresh: u64,
    pub skipped_busy: u64,
    pub failed: u64,
}

struct FetchCycle {
    pages: u32,
    expires: Option<DateTime<Utc>>,
}

/// Stale-while-revalidate coordinator.
///
/// [`SyncCoordinator::request`] answers from the cache immediately and
/// refreshes the backing upstream resource in a detached task. Per path, at
/// most one refresh runs at a time; attempts that find the resource fresh or
/// locked are dropped, not queued. There is no retry and no schedule: a stale
/// resource is only refreshed when a later request happens to find it expired
/// and unlocked.
#[derive(Clone)]
pub struct SyncCoordinator {
    upstream: Arc<dyn UpstreamApi>,
    records: Arc<dyn ResourceRequestStore>,
    stats: Arc<SyncStats>,
}

impl SyncCoordinator {
    pub fn new(upstream: Arc<dyn UpstreamApi>, records: Arc<dyn ResourceRequestStore>) -> Self {
        Self { upstream, records, stats: Arc::new(SyncStats::default()) }
    }

    pub fn stats(&self) -> SyncStatsSnapshot {
        self.stats.snapshot()
    }

    pub fn records(&self) -> &Arc<dyn ResourceRequestStore> {
        &self.records
    }

    /// Schedule a background refresh of the request's target and return the cached read.
    pub async fn request<R: Future>(&self, request: SyncRequest<R>) -> R::Output {
        let SyncRequest { target, read } = request;
        // Detached: the handle is dropped, the read path never joins it.
        self.spawn_refresh(target);
        read.await
    }

    /// Run [`SyncCoordinator::refresh`] on its own task. Failures are logged
    /// there and never propagate.
    pub fn spawn_refresh(&self, target: SyncTarget) -> JoinHandle<()> {
        let coordinator = self.clone();
        tokio::spawn(async move {
            let key = target.key();
            match coordinator.refresh(&target).await {
                Ok(RefreshOutcome::Refreshed { pages }) => info!(%key, pages, "Resource refreshed"),
                Ok(outcome) => debug!(%key, ?outcome, "Refresh skipped"),
                Err(e) => error!(%key, "Refresh failed, cached data stays stale: {}", e),
            }
        })
    }

    /// Refresh one resource if it is expired and not locked by another refresh.
    ///
    /// The lock is released on every exit path. `expires` only advances when
    /// every page was fetched and handled.
    pub async fn refresh(&self, target: &SyncTarget) -> Result<RefreshOutcome, SyncError> {
        let key = target.key();
        match self.records.try_lock(&key, Utc::now()).await? {
            LockAttempt::Fresh => {
                self.stats.skipped_fresh.fetch_add(1, Ordering::Relaxed);
                return Ok(RefreshOutcome::Fresh);
            }
            LockAttempt::Busy => {
                self.stats.skipped_busy.fetch_add(1, Ordering::Relaxed);
                return Ok(RefreshOutcome::Busy);
            }
            LockAttempt::Acquired => {}
        }

        let cycle = AssertUnwindSafe(self.fetch_pages(target))
            .catch_unwind()
            .await
            .unwrap_or_else(|_| Err(eyre::eyre!("page handler panicked while refreshing {}", key).into()));

        let expires = cycle.as_ref().ok().and_then(|cycle| cycle.expires);
        let unlocked = self.records.unlock(&key, expires).await;

        match cycle {
            Ok(cycle) => {
                unlocked?;
                self.stats.refreshed.fetch_add(1, Ordering::Relaxed);
                Ok(RefreshOutcome::Refreshed { pages: cycle.pages })
            }
            Err(e) => {
                self.stats.failed.fetch_add(1, Ordering::Relaxed);
                if let Err(unlock_error) = unlocked {
                    warn!(%key, "Failed to release lock after failed refresh: {}", unlock_error);
                }
                Err(e)
            }
        }
    }

    async fn fetch_pages(&self, target: &SyncTarget) -> Result<FetchCycle, SyncError> {
        let path = target.path.as_str();
        let mut page: u32 = 1;
        let mut expires = None;

        loop {
            let response = self.upstream.fetch(path, &target.params, page).await?;
            if page == 1 {
                expires = response.expires;
                if expires.is_none() {
                    warn!(%path, "Upstream response carried no expiry; resource stays stale");
                }
                if let Some(on_cycle_start) = &target.on_cycle_start {
                    on_cycle_start().await?;
                }
            }
            let total_pages = response.pages.unwrap_or(1);
            debug!(%path, page, total_pages, "Fetched page");

            (target.update)(response.body).await?;

            page += 1;
            if page > total_pages {
                return Ok(FetchCycle { pages: page - 1, expires });
            }
        }
    }
}
