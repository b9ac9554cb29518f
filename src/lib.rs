// Layers
pub mod data_sync; // Sync Layer: stale-while-revalidate refresh of upstream resources
pub mod facade; // Query Layer: scoped lookups, deal queries and bulk resyncs
pub mod logic; // Logic Layer: deal finding strategies

// Shared building blocks
pub mod error;
pub mod models;
pub mod store;
pub mod utils;

// Re-export key components from each layer
pub use data_sync::{
    AppConfig, DealsConfig, HttpUpstream, MemoryResourceRequests, RefreshOutcome, ResourceRequestRecord,
    ResourceRequestStore, SyncConfig, SyncCoordinator, SyncRequest, SyncTarget, UpstreamApi, UpstreamParams,
};
pub use error::{StoreError, SyncError};
pub use facade::{Collections, DataAccess, Scope};
pub use logic::{Deal, DealFinder, DealStrategy, InventoryTimesMargin, UnitMargin};
pub use models::{
    Constellation, MarketGroup, MarketOrder, MarketType, OrderSide, Region, SolarSystem, Station, Structure,
};
pub use store::{CollectionStore, Document, Filter, MemoryCollection};
