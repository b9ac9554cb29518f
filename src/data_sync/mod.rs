/// Data Synchronization Layer
///
/// Keeps the local document cache in step with the rate-limited upstream API:
///
/// - Stale-while-revalidate requests: cached reads return immediately, refreshes
///   run as detached tasks
/// - Per-resource freshness and lock records, acquired with a conditional update
/// - Transparent walking of paginated upstream listings
///
/// Refresh failures are logged and leave the cached data stale; nothing is retried
/// until a later request finds the resource expired and unlocked.

pub mod config;
pub mod coordinator;
pub mod resource_request;
pub mod upstream;


pub use config::{AppConfig, DealsConfig, SyncConfig};
pub use coordinator::{
    CycleHook, PageFuture, PageHandler, RefreshOutcome, SyncCoordinator, SyncRequest, SyncStats, SyncStatsSnapshot, SyncTarget,
    cycle_hook, page_handler,
};
pub use resource_request::{LockAttempt, MemoryResourceRequests, ResourceRequestRecord, ResourceRequestStore};
pub use upstream::{HttpUpstream, UpstreamApi, UpstreamPage, UpstreamParams, parse_http_date};
