/// Cached upstream documents: market data and the universe hierarchy
/// (region > constellation > system > station/structure).

pub mod market;
pub mod universe;

pub use market::{MarketGroup, MarketOrder, MarketType, OrderSide, UpstreamOrder};
pub use universe::{Constellation, Region, SolarSystem, Station, Structure, UpstreamStructure};
