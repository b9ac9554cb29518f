/// Query and resync surface consumed by route handlers.
///
/// Queries read the cached collections and return immediately, however stale.
/// Resync operations return the cached collection as well and hand the
/// upstream side to the [`SyncCoordinator`].

pub mod queries;
pub mod resync;

use crate::data_sync::{DealsConfig, SyncCoordinator};
use crate::logic::DealFinder;
use crate::models::{
    Constellation, MarketGroup, MarketOrder, MarketType, Region, SolarSystem, Station, Structure,
};
use crate::store::{CollectionStore, MemoryCollection};
use std::sync::Arc;

/// The cached collections, one per document type.
#[derive(Clone)]
pub struct Collections {
    pub regions: Arc<dyn CollectionStore<Region>>,
    pub constellations: Arc<dyn CollectionStore<Constellation>>,
    pub systems: Arc<dyn CollectionStore<SolarSystem>>,
    pub stations: Arc<dyn CollectionStore<Station>>,
    pub structures: Arc<dyn CollectionStore<Structure>>,
    pub types: Arc<dyn CollectionStore<MarketType>>,
    pub market_groups: Arc<dyn CollectionStore<MarketGroup>>,
    pub market_orders: Arc<dyn CollectionStore<MarketOrder>>,
}

impl Collections {
    pub fn in_memory() -> Self {
        Self {
            regions: Arc::new(MemoryCollection::new()),
            constellations: Arc::new(MemoryCollection::new()),
            systems: Arc::new(MemoryCollection::new()),
            stations: Arc::new(MemoryCollection::new()),
            structures: Arc::new(MemoryCollection::new()),
            types: Arc::new(MemoryCollection::new()),
            market_groups: Arc::new(MemoryCollection::new()),
            market_orders: Arc::new(MemoryCollection::new()),
        }
    }
}

/// Narrows a universe lookup. Exactly one level is chosen, or none with `All`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Scope {
    #[default]
    All,
    Region(i64),
    Constellation(i64),
    System(i64),
    Station(i64),
    Structure(i64),
}

#[derive(Clone)]
pub struct DataAccess {
    coordinator: SyncCoordinator,
    collections: Collections,
    deal_finder: DealFinder,
}

impl DataAccess {
    pub fn new(coordinator: SyncCoordinator, collections: Collections, deal_finder: DealFinder) -> Self {
        Self { coordinator, collections, deal_finder }
    }

    pub fn with_deals_config(coordinator: SyncCoordinator, collections: Collections, config: &DealsConfig) -> Self {
        Self::new(coordinator, collections, DealFinder::from_config(config))
    }

    pub fn collections(&self) -> &Collections {
        &self.collections
    }

    pub fn coordinator(&self) -> &SyncCoordinator {
        &self.coordinator
    }

    pub fn deal_finder(&self) -> &DealFinder {
        &self.deal_finder
    }
}
