use serde::{Deserialize, Serialize};

/// A ranked trading candidate derived from one type's order book. Computed per
/// request from the cache, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
    pub type_name: String,
    /// Best (highest) buy order, or 0 without buy orders
    pub buy_price: f64,
    /// Best (lowest) sell order
    pub sell_price: f64,
    /// Capturable sell-side volume
    pub volume: f64,
}

impl Deal {
    pub fn new(type_name: impl Into<String>, buy_price: f64, sell_price: f64, volume: f64) -> Self {
        Self { type_name: type_name.into(), buy_price, sell_price, volume }
    }

    /// Per-unit spread. Negative when the book is crossed.
    pub fn margin(&self) -> f64 {
        self.sell_price - self.buy_price
    }

    pub fn profit(&self) -> f64 {
        self.volume * self.margin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profit() {
        let deal = Deal::new("Widget", 10.0, 15.0, 5.0);
        assert_eq!(deal.margin(), 5.0);
        assert_eq!(deal.profit(), 25.0);
    }

    #[test]
    fn test_serializes_camel_case() {
        let value = serde_json::to_value(Deal::new("Widget", 10.0, 15.0, 5.0)).unwrap();
        assert_eq!(value, serde_json::json!({ "typeName": "Widget", "buyPrice": 10.0, "sellPrice": 15.0, "volume": 5.0 }));
    }
}
