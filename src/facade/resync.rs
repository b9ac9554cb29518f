use super::DataAccess;
use crate::data_sync::{
    CycleHook, PageHandler, SyncCoordinator, SyncRequest, SyncTarget, UpstreamParams, cycle_hook, page_handler,
};
use crate::error::SyncError;
use crate::models::{
    Constellation, MarketGroup, MarketOrder, MarketType, OrderSide, Region, SolarSystem, Station, Structure,
    UpstreamOrder, UpstreamStructure,
};
use crate::store::{CollectionStore, Document, Filter};
use crate::utils::constants::paths;
use eyre::Result;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use strum::IntoEnumIterator;
use tracing::debug;

const STATIONS_NAMESPACE: &str = "stations";
const ORDERS_NAMESPACE: &str = "orders";

/// Decode every page as `T`, convert it and upsert the result into `store`.
fn persist<T, D, F>(store: Arc<dyn CollectionStore<D>>, path: String, convert: F) -> PageHandler
where
    T: DeserializeOwned + Send + 'static,
    D: Document,
    F: Fn(T) -> Vec<D> + Send + Sync + 'static,
{
    let convert = Arc::new(convert);
    page_handler(move |body| {
        let store = store.clone();
        let path = path.clone();
        let convert = convert.clone();
        async move {
            let decoded: T = serde_json::from_value(body).map_err(|e| SyncError::decode(&path, e))?;
            let documents = convert(decoded);
            debug!(%path, collection = D::COLLECTION, count = documents.len(), "Persisting documents");
            store.put_many(documents).await?;
            Ok(())
        }
    })
}

fn persist_document<D: Document>(store: Arc<dyn CollectionStore<D>>, path: String) -> PageHandler {
    persist(store, path, |document: D| vec![document])
}

/// Decode every page as an id listing and issue one coordinator request per
/// target built from each id.
fn fan_out<F>(coordinator: SyncCoordinator, path: &str, targets_for: F) -> PageHandler
where
    F: Fn(i64) -> Vec<SyncTarget> + Send + Sync + 'static,
{
    let targets_for = Arc::new(targets_for);
    let path = path.to_string();
    page_handler(move |body| {
        let coordinator = coordinator.clone();
        let targets_for = targets_for.clone();
        let path = path.clone();
        async move {
            let ids: Vec<i64> = serde_json::from_value(body).map_err(|e| SyncError::decode(&path, e))?;
            debug!(%path, ids = ids.len(), "Fanning out id listing");
            for id in ids {
                for target in targets_for(id) {
                    coordinator.request(SyncRequest::new(target, async {})).await;
                }
            }
            Ok(())
        }
    })
}

impl DataAccess {
    /// Schedule `target` and answer with the whole cached collection.
    async fn resync<D: Document>(&self, target: SyncTarget, store: &Arc<dyn CollectionStore<D>>) -> Result<Vec<D>> {
        let filter = Filter::all();
        Ok(self.coordinator.request(SyncRequest::new(target, store.find(&filter))).await?)
    }

    /// Resync every listed document of one kind, fetched from `detail(id)`.
    async fn resync_listing<D: Document>(
        &self,
        listing: &str,
        detail: fn(i64) -> String,
        store: &Arc<dyn CollectionStore<D>>,
    ) -> Result<Vec<D>> {
        let documents = store.clone();
        let handler = fan_out(self.coordinator.clone(), listing, move |id| {
            let path = detail(id);
            vec![SyncTarget::new(path.clone(), persist_document(documents.clone(), path))]
        });
        self.resync(SyncTarget::new(listing, handler), store).await
    }

    pub async fn update_regions(&self) -> Result<Vec<Region>> {
        self.resync_listing(paths::REGIONS, paths::region, &self.collections.regions).await
    }

    pub async fn update_constellations(&self) -> Result<Vec<Constellation>> {
        self.resync_listing(paths::CONSTELLATIONS, paths::constellation, &self.collections.constellations).await
    }

    pub async fn update_systems(&self) -> Result<Vec<SolarSystem>> {
        self.resync_listing(paths::SYSTEMS, paths::system, &self.collections.systems).await
    }

    /// The type listing is paginated; each page fans out on its own.
    pub async fn update_types(&self) -> Result<Vec<MarketType>> {
        self.resync_listing(paths::TYPES, paths::market_type, &self.collections.types).await
    }

    pub async fn update_market_groups(&self) -> Result<Vec<MarketGroup>> {
        self.resync_listing(paths::MARKET_GROUPS, paths::market_group, &self.collections.market_groups).await
    }

    /// Structures need a bearer token. The upstream body has no id, so it is
    /// stamped from the listing.
    pub async fn update_structures(&self, token: Option<String>) -> Result<Vec<Structure>> {
        let params = UpstreamParams::new().with_token(token);
        let structures = self.collections.structures.clone();
        let detail_params = params.clone();
        let handler = fan_out(self.coordinator.clone(), paths::STRUCTURES, move |structure_id| {
            let path = paths::structure(structure_id);
            let update = persist(structures.clone(), path.clone(), move |body: UpstreamStructure| {
                vec![Structure::from_upstream(structure_id, body)]
            });
            vec![SyncTarget::new(path, update).with_params(detail_params.clone())]
        });
        let target = SyncTarget::new(paths::STRUCTURES, handler).with_params(params);
        self.resync(target, &self.collections.structures).await
    }

    /// Walks systems listing → each system → its stations.
    pub async fn update_stations(&self) -> Result<Vec<Station>> {
        let coordinator = self.coordinator.clone();
        let stations = self.collections.stations.clone();
        let handler = fan_out(self.coordinator.clone(), paths::SYSTEMS, move |system_id| {
            let stations = stations.clone();
            let system_path = paths::system(system_id);
            let discover = persist_system_stations(coordinator.clone(), stations, system_path.clone());
            vec![SyncTarget::new(system_path, discover).with_namespace(STATIONS_NAMESPACE)]
        });
        let target = SyncTarget::new(paths::SYSTEMS, handler).with_namespace(STATIONS_NAMESPACE);
        self.resync(target, &self.collections.stations).await
    }

    /// Resyncs the buy and sell listings of every region. Each listing
    /// replaces that region's side of the book.
    pub async fn update_market_orders(&self) -> Result<Vec<MarketOrder>> {
        let orders = self.collections.market_orders.clone();
        let handler = fan_out(self.coordinator.clone(), paths::REGIONS, move |region_id| {
            OrderSide::iter()
                .map(|side| {
                    let path = paths::region_orders(region_id);
                    let update = persist(orders.clone(), path.clone(), move |listed: Vec<UpstreamOrder>| {
                        listed.into_iter().map(|order| MarketOrder::from_upstream(order, region_id)).collect()
                    });
                    let params = UpstreamParams::new().with_query("order_type", side);
                    SyncTarget::new(path, update)
                        .with_params(params)
                        .with_namespace(ORDERS_NAMESPACE)
                        .with_cycle_start(clear_book_side(orders.clone(), region_id, side))
                })
                .collect()
        });
        let target = SyncTarget::new(paths::REGIONS, handler).with_namespace(ORDERS_NAMESPACE);
        self.resync(target, &self.collections.market_orders).await
    }
}

fn clear_book_side(orders: Arc<dyn CollectionStore<MarketOrder>>, region_id: i64, side: OrderSide) -> CycleHook {
    cycle_hook(move || {
        let orders = orders.clone();
        async move {
            let filter = Filter::all().eq("region_id", region_id).eq("is_buy_order", side.is_buy());
            let removed = orders.delete_many(&filter).await?;
            debug!(region_id, %side, removed, "Cleared order book side");
            Ok(())
        }
    })
}

/// Read a system body and fan out over the stations it lists.
fn persist_system_stations(
    coordinator: SyncCoordinator,
    stations: Arc<dyn CollectionStore<Station>>,
    path: String,
) -> PageHandler {
    page_handler(move |body| {
        let coordinator = coordinator.clone();
        let stations = stations.clone();
        let path = path.clone();
        async move {
            let system: SolarSystem = serde_json::from_value(body).map_err(|e| SyncError::decode(&path, e))?;
            for station_id in system.stations {
                let station_path = paths::station(station_id);
                let update = persist_document(stations.clone(), station_path.clone());
                coordinator.request(SyncRequest::new(SyncTarget::new(station_path, update), async {})).await;
            }
            Ok(())
        }
    })
}
