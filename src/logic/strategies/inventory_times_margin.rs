use crate::logic::deal_finder::{DealStrategy, fold_order_books};
use crate::logic::types::Deal;
use crate::models::{MarketOrder, MarketType};
use crate::utils::constants::DEFAULT_CAPTURE_RATIO;

/// Ranks deals by `capturable volume * (sell - buy)`, highest first.
///
/// Ties keep input order. Unprofitable and crossed books are kept and sort
/// to the end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InventoryTimesMargin {
    pub capture_ratio: f64,
}

impl InventoryTimesMargin {
    pub fn new(capture_ratio: f64) -> Self {
        Self { capture_ratio }
    }
}

impl Default for InventoryTimesMargin {
    fn default() -> Self {
        Self::new(DEFAULT_CAPTURE_RATIO)
    }
}

impl DealStrategy for InventoryTimesMargin {
    fn name(&self) -> &'static str {
        "inventory_times_margin"
    }

    fn find_deals(&self, types: &[MarketType], orders: &[MarketOrder]) -> Vec<Deal> {
        let mut deals = fold_order_books(types, orders, self.capture_ratio);
        // sort_by is stable
        deals.sort_by(|a, b| b.profit().total_cmp(&a.profit()));
        deals
    }
}
