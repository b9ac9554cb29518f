use crate::store::Document;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// A tradeable item type as cached from the upstream type listing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarketType {
    pub type_id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_group_id: Option<i64>,
}

impl MarketType {
    pub fn new(type_id: i64, name: impl Into<String>, market_group_id: Option<i64>) -> Self {
        Self { type_id, name: name.into(), market_group_id }
    }
}

impl Document for MarketType {
    const COLLECTION: &'static str = "types";

    fn key(&self) -> i64 {
        self.type_id
    }
}

/// Which side of the book an order sits on. Also used as the `order_type`
/// query value when listing a region's orders upstream.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Hash, EnumString, EnumIter, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn is_buy(&self) -> bool {
        matches!(self, OrderSide::Buy)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarketOrder {
    pub order_id: i64,
    pub type_id: i64,
    pub region_id: i64,
    pub is_buy_order: bool,
    pub price: f64,
    pub volume_remain: i64,
}

impl MarketOrder {
    pub fn new(order_id: i64, type_id: i64, region_id: i64, side: OrderSide, price: f64, volume_remain: i64) -> Self {
        Self { order_id, type_id, region_id, is_buy_order: side.is_buy(), price, volume_remain }
    }

    pub fn side(&self) -> OrderSide {
        if self.is_buy_order { OrderSide::Buy } else { OrderSide::Sell }
    }

    /// Orders listed upstream carry no region; it is taken from the listing scope.
    pub fn from_upstream(order: UpstreamOrder, region_id: i64) -> Self {
        Self {
            order_id: order.order_id,
            type_id: order.type_id,
            region_id,
            is_buy_order: order.is_buy_order,
            price: order.price,
            volume_remain: order.volume_remain,
        }
    }
}

impl Document for MarketOrder {
    const COLLECTION: &'static str = "market_orders";

    fn key(&self) -> i64 {
        self.order_id
    }
}

/// Order as it appears in a regional order listing.
#[derive(Clone, Debug, Deserialize)]
pub struct UpstreamOrder {
    pub order_id: i64,
    pub type_id: i64,
    pub is_buy_order: bool,
    pub price: f64,
    pub volume_remain: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarketGroup {
    pub market_group_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_group_id: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub types: Vec<i64>,
}

impl MarketGroup {
    pub fn new(market_group_id: i64, parent_group_id: Option<i64>, name: impl Into<String>, types: Vec<i64>) -> Self {
        Self { market_group_id, parent_group_id, name: name.into(), types }
    }
}

impl Document for MarketGroup {
    const COLLECTION: &'static str = "market_groups";

    fn key(&self) -> i64 {
        self.market_group_id
    }
}
