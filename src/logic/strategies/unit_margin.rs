use crate::logic::deal_finder::{DealStrategy, fold_order_books};
use crate::logic::types::Deal;
use crate::models::{MarketOrder, MarketType};
use crate::utils::constants::DEFAULT_CAPTURE_RATIO;

/// Ranks deals by per-unit spread, ignoring depth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitMargin {
    pub capture_ratio: f64,
}

impl Default for UnitMargin {
    fn default() -> Self {
        Self { capture_ratio: DEFAULT_CAPTURE_RATIO }
    }
}

impl DealStrategy for UnitMargin {
    fn name(&self) -> &'static str {
        "unit_margin"
    }

    fn find_deals(&self, types: &[MarketType], orders: &[MarketOrder]) -> Vec<Deal> {
        let mut deals = fold_order_books(types, orders, self.capture_ratio);
        deals.sort_by(|a, b| b.margin().total_cmp(&a.margin()));
        deals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OrderSide;

    #[test]
    fn test_ranks_by_spread() {
        let types = vec![MarketType::new(1, "Thin", None), MarketType::new(2, "Thick", None)];
        let orders = vec![
            MarketOrder::new(1, 1, 1, OrderSide::Buy, 1.0, 1),
            MarketOrder::new(2, 1, 1, OrderSide::Sell, 3.0, 1),
            MarketOrder::new(3, 2, 1, OrderSide::Buy, 1.0, 1),
            MarketOrder::new(4, 2, 1, OrderSide::Sell, 9.0, 1),
        ];

        let deals = UnitMargin::default().find_deals(&types, &orders);
        assert_eq!(deals[0].type_name, "Thick");
        assert_eq!(deals[1].margin(), 2.0);
    }
}
