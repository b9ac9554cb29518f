/// Logic Layer - Deal Finding
///
/// This layer is responsible for:
/// - Folding each type's cached order book into a candidate deal
/// - Ranking candidates with a pluggable strategy
///
/// Pure computation over a snapshot of types and orders; no I/O.

pub mod deal_finder;
pub mod strategies;
pub mod types;

// Re-export key components from the logic layer
pub use deal_finder::{DealFinder, DealStrategy, fold_order_books};
pub use strategies::{InventoryTimesMargin, UnitMargin};
pub use types::Deal;
