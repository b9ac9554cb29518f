use super::{DataAccess, Scope};
use crate::logic::{Deal, DealStrategy};
use crate::models::{
    Constellation, MarketGroup, MarketOrder, MarketType, Region, SolarSystem, Station, Structure,
};
use crate::store::{Filter, Pipeline, Stage};
use crate::utils::constants::EXCLUDED_MARKET_GROUPS;
use eyre::Result;
use std::collections::BTreeSet;
use tracing::debug;

impl DataAccess {
    pub async fn get_regions(&self) -> Result<Vec<Region>> {
        Ok(self.collections.regions.find(&Filter::all()).await?)
    }

    pub async fn get_constellations(&self, scope: Scope) -> Result<Vec<Constellation>> {
        let filter = match scope {
            Scope::All => Filter::all(),
            Scope::Region(region_id) => Filter::all().eq("region_id", region_id),
            Scope::Constellation(constellation_id) => Filter::all().eq("constellation_id", constellation_id),
            _ => {
                let system_ids = self.resolve_system_ids(scope).await?.unwrap_or_default();
                let systems = self.collections.systems.find(&Filter::all().is_in("system_id", system_ids)).await?;
                let ids: BTreeSet<i64> = systems.iter().map(|system| system.constellation_id).collect();
                Filter::all().is_in("constellation_id", ids)
            }
        };
        Ok(self.collections.constellations.find(&filter).await?)
    }

    pub async fn get_systems(&self, scope: Scope) -> Result<Vec<SolarSystem>> {
        let filter = match self.resolve_system_ids(scope).await? {
            None => Filter::all(),
            Some(system_ids) => Filter::all().is_in("system_id", system_ids),
        };
        Ok(self.collections.systems.find(&filter).await?)
    }

    pub async fn get_stations(&self, scope: Scope) -> Result<Vec<Station>> {
        let filter = match scope {
            Scope::Station(station_id) => Filter::all().eq("station_id", station_id),
            _ => match self.resolve_system_ids(scope).await? {
                None => Filter::all(),
                Some(system_ids) => Filter::all().is_in("system_id", system_ids),
            },
        };
        Ok(self.collections.stations.find(&filter).await?)
    }

    pub async fn get_structures(&self, scope: Scope) -> Result<Vec<Structure>> {
        let filter = match scope {
            Scope::Structure(structure_id) => Filter::all().eq("structure_id", structure_id),
            _ => match self.resolve_system_ids(scope).await? {
                None => Filter::all(),
                Some(system_ids) => Filter::all().is_in("solar_system_id", system_ids),
            },
        };
        Ok(self.collections.structures.find(&filter).await?)
    }

    pub async fn get_types(&self) -> Result<Vec<MarketType>> {
        Ok(self.collections.types.find(&Filter::all()).await?)
    }

    pub async fn get_market_groups(&self) -> Result<Vec<MarketGroup>> {
        Ok(self.collections.market_groups.find(&Filter::all()).await?)
    }

    pub async fn get_market_orders(&self, region_id: i64, type_id: Option<i64>) -> Result<Vec<MarketOrder>> {
        let mut filter = Filter::all().eq("region_id", region_id);
        if let Some(type_id) = type_id {
            filter = filter.eq("type_id", type_id);
        }
        Ok(self.collections.market_orders.find(&filter).await?)
    }

    /// Rank the deals available in a region with the configured strategy.
    pub async fn get_deals(&self, region_id: i64) -> Result<Vec<Deal>> {
        let (types, orders) = self.deal_inputs(region_id).await?;
        Ok(self.deal_finder.find(&types, &orders))
    }

    pub async fn get_deals_with(&self, region_id: i64, strategy: &dyn DealStrategy) -> Result<Vec<Deal>> {
        let (types, orders) = self.deal_inputs(region_id).await?;
        Ok(self.deal_finder.find_with(strategy, &types, &orders))
    }

    async fn deal_inputs(&self, region_id: i64) -> Result<(Vec<MarketType>, Vec<MarketOrder>)> {
        let type_ids = self.eligible_type_ids().await?;
        let orders = self.get_market_orders(region_id, None).await?;
        let types = self.collections.types.find(&Filter::all().is_in("type_id", type_ids)).await?;
        debug!(region_id, types = types.len(), orders = orders.len(), "Loaded deal inputs");
        Ok((types, orders))
    }

    /// Type ids listed by any market group that is neither a blueprint nor a
    /// skill-book group, by its own id or its parent's.
    async fn eligible_type_ids(&self) -> Result<BTreeSet<i64>> {
        let pipeline = Pipeline::new()
            .stage(Stage::Match(
                Filter::all()
                    .not_in("market_group_id", EXCLUDED_MARKET_GROUPS)
                    .not_in("parent_group_id", EXCLUDED_MARKET_GROUPS),
            ))
            .stage(Stage::Unwind("types".to_string()))
            .stage(Stage::Project("types".to_string()));

        let ids = self.collections.market_groups.aggregate(&pipeline).await?;
        Ok(ids.iter().filter_map(|id| id.as_i64()).collect())
    }

    /// Systems covered by `scope`, deduplicated. `None` means every system.
    async fn resolve_system_ids(&self, scope: Scope) -> Result<Option<BTreeSet<i64>>> {
        let ids = match scope {
            Scope::All => return Ok(None),
            Scope::Region(region_id) => {
                let constellations =
                    self.collections.constellations.find(&Filter::all().eq("region_id", region_id)).await?;
                constellations.into_iter().flat_map(|constellation| constellation.systems).collect()
            }
            Scope::Constellation(constellation_id) => {
                let constellations = self
                    .collections
                    .constellations
                    .find(&Filter::all().eq("constellation_id", constellation_id))
                    .await?;
                constellations.into_iter().flat_map(|constellation| constellation.systems).collect()
            }
            Scope::System(system_id) => BTreeSet::from([system_id]),
            Scope::Station(station_id) => {
                let stations = self.collections.stations.find(&Filter::all().eq("station_id", station_id)).await?;
                stations.into_iter().map(|station| station.system_id).collect()
            }
            Scope::Structure(structure_id) => {
                let structures =
                    self.collections.structures.find(&Filter::all().eq("structure_id", structure_id)).await?;
                structures.into_iter().map(|structure| structure.solar_system_id).collect()
            }
        };
        Ok(Some(ids))
    }
}
