use super::strategies::InventoryTimesMargin;
use super::types::Deal;
use crate::data_sync::config::DealsConfig;
use crate::models::{MarketOrder, MarketType};
use crate::utils::constants::BLUEPRINT_NAME_MARKER;
use ahash::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// Turns cached types and orders into ranked deals.
pub trait DealStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn find_deals(&self, types: &[MarketType], orders: &[MarketOrder]) -> Vec<Deal>;
}

/// Fold every order book into an unranked [`Deal`] per type.
///
/// Types named like blueprints are skipped. Types are visited in input order;
/// a repeated type id is folded once. For each type the best buy is the highest buy price (0 without buy
/// orders), the best sell is the lowest sell price, and `volume` sums
/// `capture_ratio * volume_remain` over sell orders. Types without sell orders
/// are dropped.
pub fn fold_order_books(types: &[MarketType], orders: &[MarketOrder], capture_ratio: f64) -> Vec<Deal> {
    let mut seen: HashSet<i64> = HashSet::default();
    let names: Vec<(i64, &str)> = types
        .iter()
        .filter(|market_type| !market_type.name.contains(BLUEPRINT_NAME_MARKER))
        .filter(|market_type| seen.insert(market_type.type_id))
        .map(|market_type| (market_type.type_id, market_type.name.as_str()))
        .collect();

    let mut books: HashMap<i64, Vec<&MarketOrder>> = HashMap::default();
    for order in orders {
        books.entry(order.type_id).or_default().push(order);
    }

    names
        .into_iter()
        .filter_map(|(type_id, name)| {
            let book = books.get(&type_id).map(Vec::as_slice).unwrap_or_default();
            let (buy_price, sell_price, volume) =
                book.iter().fold((0.0_f64, f64::INFINITY, 0.0_f64), |(buy, sell, volume), order| {
                    if order.is_buy_order {
                        (buy.max(order.price), sell, volume)
                    } else {
                        (buy, sell.min(order.price), volume + capture_ratio * order.volume_remain as f64)
                    }
                });
            sell_price.is_finite().then(|| Deal::new(name, buy_price, sell_price, volume))
        })
        .collect()
}

/// Runs the configured [`DealStrategy`].
#[derive(Clone)]
pub struct DealFinder {
    strategy: Arc<dyn DealStrategy>,
    max_results: Option<usize>,
}

impl DealFinder {
    pub fn new(strategy: Arc<dyn DealStrategy>) -> Self {
        Self { strategy, max_results: None }
    }

    pub fn from_config(config: &DealsConfig) -> Self {
        Self {
            strategy: Arc::new(InventoryTimesMargin::new(config.capture_ratio)),
            max_results: config.max_results,
        }
    }

    pub fn with_max_results(mut self, max_results: Option<usize>) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    pub fn find(&self, types: &[MarketType], orders: &[MarketOrder]) -> Vec<Deal> {
        self.find_with(self.strategy.as_ref(), types, orders)
    }

    /// Same as [`DealFinder::find`] with a caller-selected strategy.
    pub fn find_with(&self, strategy: &dyn DealStrategy, types: &[MarketType], orders: &[MarketOrder]) -> Vec<Deal> {
        let mut deals = strategy.find_deals(types, orders);
        if let Some(max_results) = self.max_results {
            deals.truncate(max_results);
        }
        debug!(strategy = strategy.name(), types = types.len(), orders = orders.len(), deals = deals.len(), "Computed deals");
        deals
    }
}

impl Default for DealFinder {
    fn default() -> Self {
        Self::new(Arc::new(InventoryTimesMargin::default()))
    }
}
